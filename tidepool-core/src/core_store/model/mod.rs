/*
    model - Record types for the store

    Each record type carries its key plus serializable predicate and
    mutation enums, so bulk operations on it can live in the operation
    log and be replayed during merge.
*/

pub mod item;
pub mod list;
pub mod member;
pub mod realm;
pub mod types;

pub use item::{ItemMutation, ItemPredicate, TodoItem};
pub use list::{ListMutation, ListPredicate, TodoList};
pub use member::{Member, MemberMutation, MemberPredicate, Permissions};
pub use realm::{Realm, RealmMutation, RealmPredicate};
pub use types::{DeviceId, ItemId, ListId, MemberId, RealmId, Timestamp, UserId};
