//! Per-record sync metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a local record matches its remote counterpart.
///
/// A `Pending` or `Conflict` record is the authoritative local copy
/// awaiting upload; the sync engine's pull phase never overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Confirmed equal to the remote row.
    Synced,
    /// Locally created or modified, not yet confirmed remotely.
    #[default]
    Pending,
    /// A push was rejected; the local copy still wins over pulls.
    Conflict,
}

impl SyncState {
    /// Returns true if the local copy has unconfirmed edits.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        !matches!(self, SyncState::Synced)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Synced => write!(f, "synced"),
            SyncState::Pending => write!(f, "pending"),
            SyncState::Conflict => write!(f, "conflict"),
        }
    }
}
