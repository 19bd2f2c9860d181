/*
    transaction.rs - Transaction scope, working state and table locks

    A transaction body runs against a working copy of the database and
    records every mutation as a StoreOp. Nothing reaches the live state
    until the body returns Ok; the replica then stamps and commits the
    buffered ops as one unit. A body error simply drops the buffer.

    Per-table async mutexes serialize the bodies of transactions that
    declare overlapping tables on the same device. Locks are always taken
    in canonical table order, so two transactions can never deadlock on
    each other.
*/

use super::database::Database;
use super::errors::{StoreResult, TransactionError};
use super::table::{Table, TableRef};
use crate::core_store::model::{Member, Realm, TodoItem, TodoList};
use crate::core_store::op::StoreOp;
use std::collections::BTreeSet;
use tokio::sync::{Mutex, MutexGuard};

/// Transaction mode; all sharing operations need write access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    ReadWrite,
}

/// Working state handed to a transaction body
#[derive(Debug)]
pub struct Transaction {
    scope: BTreeSet<TableRef>,
    work: Database,
    pending: Vec<StoreOp>,
}

impl Transaction {
    pub(crate) fn new(scope: BTreeSet<TableRef>, work: Database) -> Self {
        Transaction { scope, work, pending: Vec::new() }
    }

    fn ensure(&self, table: TableRef) -> StoreResult<()> {
        if self.scope.contains(&table) {
            Ok(())
        } else {
            Err(TransactionError::TableNotDeclared { table }.into())
        }
    }

    /// Read access to the lists table
    pub fn lists(&self) -> StoreResult<&Table<TodoList>> {
        self.ensure(TableRef::TodoLists)?;
        Ok(&self.work.lists)
    }

    /// Read access to the items table
    pub fn todo_items(&self) -> StoreResult<&Table<TodoItem>> {
        self.ensure(TableRef::TodoItems)?;
        Ok(&self.work.todo_items)
    }

    /// Read access to the realms table
    pub fn realms(&self) -> StoreResult<&Table<Realm>> {
        self.ensure(TableRef::Realms)?;
        Ok(&self.work.realms)
    }

    /// Read access to the members table
    pub fn members(&self) -> StoreResult<&Table<Member>> {
        self.ensure(TableRef::Members)?;
        Ok(&self.work.members)
    }

    /// Record a mutation and apply it to the working state, so later
    /// reads within the same body observe it
    pub fn apply(&mut self, op: StoreOp) -> StoreResult<()> {
        self.ensure(op.table())?;
        self.work.apply(&op);
        self.pending.push(op);
        Ok(())
    }

    /// Number of mutations buffered so far
    pub fn pending_ops(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn into_pending(self) -> Vec<StoreOp> {
        self.pending
    }
}

/// One async mutex per table
#[derive(Debug, Default)]
pub struct TableLocks {
    locks: [Mutex<()>; 4],
}

impl TableLocks {
    pub fn new() -> Self {
        TableLocks::default()
    }

    /// Lock the given tables in canonical order and hold all guards
    pub async fn acquire(&self, scope: &BTreeSet<TableRef>) -> Vec<MutexGuard<'_, ()>> {
        let mut guards = Vec::with_capacity(scope.len());
        // BTreeSet iterates in TableRef order, which is the canonical one
        for table in scope {
            guards.push(self.locks[table.index()].lock().await);
        }
        guards
    }
}
