/*
    item.rs - Todo item record

    Items carry both their list id and a copy of the list's realm_id.
    The copy keeps per-realm access checks a single-record affair, at the
    price of an invariant: item.realm_id must follow the list's realm_id
    whenever the list changes realm. The sharing operations maintain it
    with a predicate-based bulk move inside the same transaction.
*/

use super::list::TodoList;
use super::types::{ItemId, ListId, RealmId, Timestamp};
use crate::core_store::store::table::{Record, RecordMutation, RecordPredicate, TableRef};
use serde::{Deserialize, Serialize};

/// A single entry of a todo list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique item ID
    pub id: ItemId,

    /// Owning list
    pub list_id: ListId,

    /// Realm the item is visible in; mirrors the owning list's realm
    pub realm_id: RealmId,

    /// Item text
    pub title: String,

    /// Completion flag
    pub done: bool,

    /// Creation timestamp (immutable)
    pub created_at: Timestamp,
}

impl TodoItem {
    /// Create an item scoped to the list's current realm
    pub fn new(list: &TodoList, title: impl Into<String>) -> Self {
        TodoItem {
            id: ItemId::generate(),
            list_id: list.id.clone(),
            realm_id: list.realm_id.clone(),
            title: title.into(),
            done: false,
            created_at: Timestamp::now(),
        }
    }
}

/// Predicates over the items table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemPredicate {
    /// All items of a list, in whatever realm
    ByList { list_id: ListId },
    /// Items of a list that are still scoped to a given realm
    ByListInRealm { list_id: ListId, realm_id: RealmId },
}

impl RecordPredicate<TodoItem> for ItemPredicate {
    fn matches(&self, record: &TodoItem) -> bool {
        match self {
            ItemPredicate::ByList { list_id } => record.list_id == *list_id,
            ItemPredicate::ByListInRealm { list_id, realm_id } => {
                record.list_id == *list_id && record.realm_id == *realm_id
            }
        }
    }
}

/// Field mutations on an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemMutation {
    /// Move the item into another realm
    SetRealm { realm_id: RealmId },
    /// Set the completion flag
    SetDone { done: bool },
    /// Edit the item text
    SetTitle { title: String },
}

impl RecordMutation<TodoItem> for ItemMutation {
    fn apply_to(&self, record: &mut TodoItem) {
        match self {
            ItemMutation::SetRealm { realm_id } => record.realm_id = realm_id.clone(),
            ItemMutation::SetDone { done } => record.done = *done,
            ItemMutation::SetTitle { title } => record.title = title.clone(),
        }
    }
}

impl Record for TodoItem {
    type Key = ItemId;
    type Predicate = ItemPredicate;
    type Mutation = ItemMutation;

    const TABLE: TableRef = TableRef::TodoItems;

    fn key(&self) -> ItemId {
        self.id.clone()
    }
}
