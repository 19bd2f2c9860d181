/*
    session.rs - Caller context

    Which user is acting, from which device. Passed into the managers
    explicitly; entities never carry a store or session handle themselves.
*/

use crate::core_store::model::{DeviceId, RealmId, UserId};

/// Ambient context of the calling user on one device
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The calling principal
    pub user_id: UserId,

    /// The device operations are stamped with
    pub device: DeviceId,
}

impl Session {
    pub fn new(user_id: UserId, device: DeviceId) -> Self {
        Session { user_id, device }
    }

    /// The caller's private realm, the destination when privatizing
    pub fn personal_realm_id(&self) -> RealmId {
        RealmId::personal(&self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_realm_follows_user() {
        let session = Session::new(UserId::new("user-ada"), DeviceId::new("laptop"));
        assert_eq!(session.personal_realm_id(), RealmId::new("user-ada"));
    }
}
