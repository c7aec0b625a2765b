//! Error types for the local store.

use thiserror::Error;
use vestry_model::{RecordId, RecordTable};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the local store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded.
    #[error("snapshot encode failed: {0}")]
    Encode(String),

    /// The persisted snapshot could not be decoded.
    #[error("snapshot decode failed: {0}")]
    Decode(String),

    /// A referenced record does not exist.
    #[error("no {table} record with id {id}")]
    MissingRecord {
        /// Collection that was queried.
        table: RecordTable,
        /// ID that was not found.
        id: RecordId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_display() {
        let err = StoreError::MissingRecord {
            table: RecordTable::Accounts,
            id: RecordId::from_bytes([1u8; 16]),
        };
        assert!(err.to_string().contains("accounts"));
    }
}
