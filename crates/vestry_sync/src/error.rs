//! Error types for sync operations.

use thiserror::Error;
use vestry_model::RecordTable;
use vestry_store::StoreError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// The two remote sentinel conditions the engine special-cases are
/// [`SyncError::PermissionDenied`] (drop the mutation, it can never
/// succeed) and [`SyncError::RelationMissing`] (backend not
/// provisioned, degrade gracefully).
#[derive(Error, Debug)]
pub enum SyncError {
    /// No authenticated principal; the cycle cannot run.
    #[error("no authenticated principal")]
    Unauthenticated,

    /// The remote rejected the call on ownership/policy grounds.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The remote table does not exist (backend not provisioned).
    #[error("remote relation {0} is missing")]
    RelationMissing(RecordTable),

    /// Network or backend failure.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the call may succeed on a later cycle.
        retryable: bool,
    },

    /// Local store failure during sync.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying on a later cycle can succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            // Provisioning may complete later; retried by recurrence.
            SyncError::RelationMissing(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(SyncError::transport_retryable("connection reset").is_retryable());
        assert!(!SyncError::transport_fatal("bad certificate").is_retryable());
        assert!(SyncError::RelationMissing(RecordTable::Categories).is_retryable());
        assert!(!SyncError::Unauthenticated.is_retryable());
        assert!(!SyncError::PermissionDenied("row policy".into()).is_retryable());
    }

    #[test]
    fn display_names_the_relation() {
        let err = SyncError::RelationMissing(RecordTable::Accounts);
        assert!(err.to_string().contains("accounts"));
    }
}
