//! Storage backend trait definition.

use crate::error::StoreResult;

/// Snapshot persistence for the local store.
///
/// Backends are **opaque byte stores**: the store owns the snapshot
/// format (CBOR), backends only load and save the encoded bytes.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `save`,
///   or `None` if nothing was ever saved
/// - `save` is atomic: a crash mid-save never leaves a torn snapshot
///   observable by a later `load`
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - for tests and ephemeral books
/// - [`super::FileBackend`] - durable single-file persistence
pub trait StoreBackend: Send + Sync {
    /// Loads the last persisted snapshot bytes.
    ///
    /// Returns `None` when no snapshot has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn load(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Persists a snapshot, replacing any previous one.
    ///
    /// After this returns successfully the snapshot survives process
    /// termination (for durable backends).
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written durably.
    fn save(&mut self, bytes: &[u8]) -> StoreResult<()>;
}
