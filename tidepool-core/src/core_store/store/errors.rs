/*
    errors.rs - Error types for the store subsystem

    Defines all error types that can occur in:
    - Table and database operations
    - Transactions
    - Durable log storage
*/

use super::table::TableRef;
use thiserror::Error;

/// Errors that can occur in the store subsystem
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage I/O error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Corrupted data detected in the durable log
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transaction-level failure
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Transaction-specific errors
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A table was touched without being named in the transaction scope
    #[error("table {table} was not declared in the transaction scope")]
    TableNotDeclared { table: TableRef },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
