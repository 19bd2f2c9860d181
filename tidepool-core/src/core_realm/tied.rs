/*
    tied.rs - Tied realm ids

    A tied realm is the realm deterministically derived from one list's
    id. Derivation is a pure function: two devices that convert the same
    list offline arrive at the same realm id with no coordination, which
    is what lets their conversions merge into a single realm record.
*/

use crate::core_store::model::{ListId, RealmId, TodoList};

/// Prefix marking realm ids derived from a list id
pub const TIED_REALM_PREFIX: &str = "rlm~";

/// The realm id tied to a list. Pure and deterministic: no I/O, no
/// randomness, the same list id always maps to the same realm id.
pub fn tied_realm_id(list_id: &ListId) -> RealmId {
    RealmId::new(format!("{}{}", TIED_REALM_PREFIX, list_id))
}

/// A list is sharable exactly when it lives in its own tied realm
pub fn is_sharable(list: &TodoList) -> bool {
    list.realm_id == tied_realm_id(&list.id)
}
