/*
    op - Operations and the operation log

    Every state change is a serializable operation stamped with device,
    sequence number, timestamp and vector clock. The log of stamped
    operations is the source of truth; table state is its fold.
*/

pub mod metadata;
pub mod oplog;
pub mod store_op;
pub mod vector_clock;

pub use metadata::OperationMetadata;
pub use oplog::{OpLog, OpLogEntry};
pub use store_op::{StoreOp, TableOp};
pub use vector_clock::VectorClock;
