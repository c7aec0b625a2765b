//! # Vestry Store
//!
//! The local durable store: every write in the system lands here
//! first, before any remote call.
//!
//! This crate provides:
//! - [`StoreBackend`] - snapshot persistence trait
//! - [`InMemoryBackend`] - for tests and ephemeral books
//! - [`FileBackend`] - durable single-file persistence
//! - [`LocalStore`] - typed record collections with secondary indexes
//!   and the mutation queue
//! - [`StoreBatch`] - a group of writes applied all-or-nothing
//!
//! ## Key Invariants
//!
//! - Writes are visible to subsequent reads as soon as the mutating
//!   call returns
//! - Every mutating call persists the snapshot before returning
//! - A batch either lands completely or leaves the store untouched;
//!   multi-account balance updates always travel in one batch
//! - Queue entries drain in FIFO insertion order

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod store;

pub use backend::StoreBackend;
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use store::{LocalStore, StoreBatch};
