//! # Vestry Sync
//!
//! Pull-then-push reconciliation between the local store and the
//! remote backend.
//!
//! This crate provides:
//! - Remote backend abstraction ([`RemoteClient`]) with a scriptable
//!   [`MockRemote`] and an unauthenticated [`NullRemote`]
//! - The sync engine ([`SyncEngine`]): one pull-then-push cycle with a
//!   re-entrancy guard, last-writer-wins merging, and ownership
//!   validation of queued mutations
//! - The background scheduler ([`SyncScheduler`]): a worker-thread
//!   actor that coalesces sync triggers, runs the periodic timer, and
//!   owns the online/offline flag
//! - Explicit retry policy ([`RetryConfig`], fixed delay by default)
//!
//! ## Key Invariants
//!
//! - Pull always completes fully before push begins
//! - At most one cycle runs at a time; an overlapping trigger is a
//!   skipped outcome, not an error
//! - Pull never overwrites a record whose local state is pending
//! - Queue entries drain FIFO; a failed entry stays queued, a
//!   mutation that can never succeed (foreign owner, permission
//!   denied) is discarded without retry
//! - An unauthenticated principal short-circuits the whole cycle

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod remote;
mod scheduler;

pub use config::{RetryConfig, SyncConfig};
pub use engine::{SyncEngine, SyncOutcome, SyncPhase, SyncStats};
pub use error::{SyncError, SyncResult};
pub use remote::{MockRemote, NullRemote, RemoteClient};
pub use scheduler::SyncScheduler;
