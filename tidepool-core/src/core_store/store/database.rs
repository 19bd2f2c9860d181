/*
    database.rs - The four record tables of a replica

    Holds no sync or durability machinery of its own: a Database is the
    fold of an operation log, and rebuilding it from scratch must yield
    byte-identical state on every replica that holds the same log.
*/

use super::table::Table;
use crate::core_store::model::{Member, Realm, TodoItem, TodoList};
use crate::core_store::op::{OpLogEntry, StoreOp};

/// In-memory table state of a replica
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    pub lists: Table<TodoList>,
    pub todo_items: Table<TodoItem>,
    pub realms: Table<Realm>,
    pub members: Table<Member>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    /// Apply one operation to the owning table
    pub fn apply(&mut self, op: &StoreOp) {
        tracing::trace!(table = %op.table(), kind = op.kind(), "applying store op");
        match op {
            StoreOp::TodoLists(op) => op.apply(&mut self.lists),
            StoreOp::TodoItems(op) => op.apply(&mut self.todo_items),
            StoreOp::Realms(op) => op.apply(&mut self.realms),
            StoreOp::Members(op) => op.apply(&mut self.members),
        }
        metrics::counter!("tidepool_store_ops_applied").increment(1);
    }

    /// Fold a log into fresh state
    pub fn replay(entries: &[OpLogEntry]) -> Database {
        let mut db = Database::new();
        for entry in entries {
            db.apply(&entry.op);
        }
        db
    }
}
