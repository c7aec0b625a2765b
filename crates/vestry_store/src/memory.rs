//! In-memory storage backend for testing.

use crate::backend::StoreBackend;
use crate::error::StoreResult;
use parking_lot::RwLock;

/// An in-memory snapshot backend.
///
/// Holds the encoded snapshot in memory. Suitable for unit tests,
/// integration tests, and ephemeral books that don't need persistence.
///
/// # Example
///
/// ```rust
/// use vestry_store::{InMemoryBackend, StoreBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(backend.load().unwrap().is_none());
/// backend.save(b"snapshot").unwrap();
/// assert_eq!(backend.load().unwrap().unwrap(), b"snapshot");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    bytes: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with snapshot bytes.
    ///
    /// Useful for testing reopen scenarios.
    #[must_use]
    pub fn with_data(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RwLock::new(Some(bytes)),
        }
    }

    /// Returns a copy of the current snapshot bytes, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.bytes.read().clone()
    }
}

impl StoreBackend for InMemoryBackend {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.bytes.read().clone())
    }

    fn save(&mut self, bytes: &[u8]) -> StoreResult<()> {
        *self.bytes.write() = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert!(backend.data().is_none());
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let mut backend = InMemoryBackend::new();
        backend.save(b"first").unwrap();
        backend.save(b"second").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"second");
    }

    #[test]
    fn with_data_preseeds() {
        let backend = InMemoryBackend::with_data(b"seed".to_vec());
        assert_eq!(backend.load().unwrap().unwrap(), b"seed");
    }
}
