/*
    state.rs - Sharing state machine

    A list is either Private (living in its owner's personal realm) or
    Sharable (living in its tied realm). Both transitions exist, and one
    of them fires implicitly: dropping to at most the owner as member
    privatizes the list, because a realm nobody else can reach carries no
    sharing value. Keeping the transitions in one table makes that
    implicit edge as visible as the explicit ones.
*/

use super::tied::is_sharable;
use crate::core_store::model::TodoList;

/// Sharing status of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingState {
    /// The list lives in its owner's personal realm
    Private,
    /// The list lives in its tied realm and can carry members
    Sharable,
}

/// Events that can move a list between sharing states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingEvent {
    /// Explicit promotion, either direct or as the first step of a share
    MakeSharable,
    /// Explicit demotion back to the personal realm
    MakePrivate,
    /// After an unshare, at most the owner remains on the realm
    MemberCountAtOrBelowOwner,
}

impl SharingState {
    /// Derive the state from the list's current realm
    pub fn of(list: &TodoList) -> Self {
        if is_sharable(list) {
            SharingState::Sharable
        } else {
            SharingState::Private
        }
    }

    /// The full transition table. Events that do not apply to the current
    /// state leave it unchanged, so every operation is idempotent at the
    /// state level.
    pub fn on(self, event: SharingEvent) -> SharingState {
        match (self, event) {
            (SharingState::Private, SharingEvent::MakeSharable) => SharingState::Sharable,
            (SharingState::Sharable, SharingEvent::MakePrivate) => SharingState::Private,
            (SharingState::Sharable, SharingEvent::MemberCountAtOrBelowOwner) => {
                SharingState::Private
            }
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_store::model::UserId;

    #[test]
    fn test_state_derived_from_realm() {
        let mut list = TodoList::new_private("Errands", UserId::new("user-lin"));
        assert_eq!(SharingState::of(&list), SharingState::Private);

        list.realm_id = super::super::tied::tied_realm_id(&list.id);
        assert_eq!(SharingState::of(&list), SharingState::Sharable);
    }

    #[test]
    fn test_transition_table_is_total() {
        use SharingEvent::*;
        use SharingState::*;

        assert_eq!(Private.on(MakeSharable), Sharable);
        assert_eq!(Private.on(MakePrivate), Private);
        assert_eq!(Private.on(MemberCountAtOrBelowOwner), Private);

        assert_eq!(Sharable.on(MakeSharable), Sharable);
        assert_eq!(Sharable.on(MakePrivate), Private);
        assert_eq!(Sharable.on(MemberCountAtOrBelowOwner), Private);
    }
}
