/*
    store_op.rs - The store's operation vocabulary

    One enum covers every mutation of every table. Put/Update/Delete act on
    a single key; ModifyWhere/DeleteWhere carry a predicate and are the
    merge-safe alternative to read-then-write: replayed on another replica
    they re-evaluate the predicate against that replica's merged state, so
    records the origin device never saw are still covered.
*/

use crate::core_store::model::{Member, Realm, TodoItem, TodoList};
use crate::core_store::store::table::{Record, Table, TableRef};
use serde::{Deserialize, Serialize};

/// A mutation of one table, expressed as replayable data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "R: Record")]
pub enum TableOp<R: Record> {
    /// Insert or replace one record
    Put { record: R },
    /// Mutate one record by key; absent key is a no-op on replay
    Update { key: R::Key, mutation: R::Mutation },
    /// Delete one record by key; absent key is a no-op
    Delete { key: R::Key },
    /// Mutate every record matching the predicate at apply time
    ModifyWhere { predicate: R::Predicate, mutation: R::Mutation },
    /// Delete every record matching the predicate at apply time
    DeleteWhere { predicate: R::Predicate },
}

impl<R: Record> TableOp<R> {
    /// Apply this operation to a table
    pub fn apply(&self, table: &mut Table<R>) {
        match self {
            TableOp::Put { record } => table.put(record.clone()),
            TableOp::Update { key, mutation } => {
                table.update(key, mutation);
            }
            TableOp::Delete { key } => {
                table.delete(key);
            }
            TableOp::ModifyWhere { predicate, mutation } => {
                table.modify_where(predicate, mutation);
            }
            TableOp::DeleteWhere { predicate } => {
                table.delete_where(predicate);
            }
        }
    }

    /// Short operation kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            TableOp::Put { .. } => "put",
            TableOp::Update { .. } => "update",
            TableOp::Delete { .. } => "delete",
            TableOp::ModifyWhere { .. } => "modify_where",
            TableOp::DeleteWhere { .. } => "delete_where",
        }
    }
}

/// A mutation of the store: a table operation routed to its table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOp {
    TodoLists(TableOp<TodoList>),
    TodoItems(TableOp<TodoItem>),
    Realms(TableOp<Realm>),
    Members(TableOp<Member>),
}

impl StoreOp {
    /// The table this operation touches
    pub fn table(&self) -> TableRef {
        match self {
            StoreOp::TodoLists(_) => TodoList::TABLE,
            StoreOp::TodoItems(_) => TodoItem::TABLE,
            StoreOp::Realms(_) => Realm::TABLE,
            StoreOp::Members(_) => Member::TABLE,
        }
    }

    /// Short operation kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            StoreOp::TodoLists(op) => op.kind(),
            StoreOp::TodoItems(op) => op.kind(),
            StoreOp::Realms(op) => op.kind(),
            StoreOp::Members(op) => op.kind(),
        }
    }
}
