//! Time source abstraction.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Injected into [`crate::Books`] so record timestamps are
/// deterministic under test.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
