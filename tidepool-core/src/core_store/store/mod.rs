/*
    Store subsystem - Tables, database, transactions, durability

    Typed record tables with predicate-based bulk operations, grouped into
    a database that is only ever mutated by folding operation-log entries.
*/

pub mod commit_log;
pub mod database;
pub mod errors;
pub mod table;
pub mod transaction;

pub use commit_log::CommitLog;
pub use database::Database;
pub use errors::{StoreError, StoreResult, TransactionError};
pub use table::{Record, RecordMutation, RecordPredicate, Table, TableRef, WhereClause};
pub use transaction::{TableLocks, Transaction, TransactionMode};
