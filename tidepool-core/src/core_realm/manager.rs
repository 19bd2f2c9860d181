//! Manager traits for list and sharing operations

use crate::core_store::model::{ItemId, ListId, MemberId, RealmId, TodoItem, TodoList};
use crate::core_store::store::StoreResult;
use async_trait::async_trait;

/// Manager for plain list and item operations
#[async_trait]
pub trait ListManager: Send + Sync {
    /// Create a list in the caller's personal realm
    async fn create_list(&self, title: &str) -> StoreResult<TodoList>;

    /// Add an item to a list, scoped to the list's current realm
    async fn add_item(&self, list_id: &ListId, title: &str) -> StoreResult<TodoItem>;

    /// Set an item's completion flag
    async fn set_item_done(&self, item_id: &ItemId, done: bool) -> StoreResult<()>;

    /// Get a list by id
    async fn get_list(&self, list_id: &ListId) -> StoreResult<Option<TodoList>>;
}

/// Manager for the sharing lifecycle of a list
#[async_trait]
pub trait SharingManager: Send + Sync {
    /// Whether the list currently lives in its tied realm
    fn is_sharable(&self, list: &TodoList) -> bool;

    /// Move a private list into its tied realm so members can be added.
    /// Returns the realm id; already-sharable lists are left untouched.
    async fn make_sharable(&self, list_id: &ListId) -> StoreResult<RealmId>;

    /// Move a list and its items back into the caller's personal realm,
    /// revoking every membership of the old realm
    async fn make_private(&self, list_id: &ListId) -> StoreResult<()>;

    /// Grant an invitee access, promoting the list to sharable first when
    /// needed. `send_invite` controls whether an external invitation is
    /// triggered for the new member.
    async fn share_with(
        &self,
        list_id: &ListId,
        name: &str,
        email: &str,
        send_invite: bool,
    ) -> StoreResult<MemberId>;

    /// Revoke an invitee's access. When at most the owner remains on the
    /// realm afterwards, the list reverts to private automatically.
    async fn unshare_with(&self, list_id: &ListId, email: &str) -> StoreResult<()>;

    /// Delete the list, its items, the memberships of its tied realm and
    /// the tied realm record itself, shared or not
    async fn delete_list(&self, list_id: &ListId) -> StoreResult<()>;
}
