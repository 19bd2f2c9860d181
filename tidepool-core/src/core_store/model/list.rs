/*
    list.rs - Todo list record

    A list is the unit the sharing operations act on. Its realm_id decides
    who can see it: the owner's private realm, or a tied realm shared with
    other members.
*/

use super::types::{ListId, RealmId, Timestamp, UserId};
use crate::core_store::store::table::{Record, RecordMutation, RecordPredicate, TableRef};
use serde::{Deserialize, Serialize};

/// A todo list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    /// Unique list ID
    pub id: ListId,

    /// Realm scoping access to this list and its items
    pub realm_id: RealmId,

    /// Creating principal (immutable)
    pub owner: UserId,

    /// Display title
    pub title: String,

    /// Creation timestamp (immutable)
    pub created_at: Timestamp,
}

impl TodoList {
    /// Create a list in the owner's private realm
    pub fn new_private(title: impl Into<String>, owner: UserId) -> Self {
        TodoList {
            id: ListId::generate(),
            realm_id: RealmId::personal(&owner),
            owner,
            title: title.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// Predicates over the lists table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListPredicate {
    /// All lists created by a user
    ByOwner { owner: UserId },
    /// All lists scoped to a realm
    ByRealm { realm_id: RealmId },
}

impl RecordPredicate<TodoList> for ListPredicate {
    fn matches(&self, record: &TodoList) -> bool {
        match self {
            ListPredicate::ByOwner { owner } => record.owner == *owner,
            ListPredicate::ByRealm { realm_id } => record.realm_id == *realm_id,
        }
    }
}

/// Field mutations on a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListMutation {
    /// Move the list into another realm
    SetRealm { realm_id: RealmId },
    /// Rename the list
    SetTitle { title: String },
}

impl RecordMutation<TodoList> for ListMutation {
    fn apply_to(&self, record: &mut TodoList) {
        match self {
            ListMutation::SetRealm { realm_id } => record.realm_id = realm_id.clone(),
            ListMutation::SetTitle { title } => record.title = title.clone(),
        }
    }
}

impl Record for TodoList {
    type Key = ListId;
    type Predicate = ListPredicate;
    type Mutation = ListMutation;

    const TABLE: TableRef = TableRef::TodoLists;

    fn key(&self) -> ListId {
        self.id.clone()
    }
}
