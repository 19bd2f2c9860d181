/*
    core_store - Local-first record store

    The authoritative state layer for realm-scoped entities.
    Handles:
    - Data models (lists, items, realms, members)
    - Typed record tables with predicate-based bulk operations
    - The operation log that makes bulk mutations merge-safe
    - Transactional commits and durable persistence
    - Replica merge and delta exchange
*/

pub mod model;
pub mod op;
pub mod store;
pub mod sync;

#[cfg(test)]
pub mod tests;

// Re-export commonly used types
pub use model::{DeviceId, ItemId, ListId, MemberId, RealmId, Timestamp, UserId};
pub use op::{OpLog, OpLogEntry, OperationMetadata, StoreOp, VectorClock};
pub use store::{Database, StoreError, StoreResult, TableRef, Transaction, TransactionMode};
pub use sync::Replica;
