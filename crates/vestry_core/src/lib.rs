//! # Vestry Core
//!
//! The state facade over the local store and the sync engine.
//!
//! [`Books`] is the single entry point an application (or the CLI)
//! talks to: it validates drafts, computes balance effects through
//! `vestry_ledger`, commits each operation as one atomic store batch,
//! keeps an in-memory view of the three collections, and nudges the
//! background scheduler after every local change.
//!
//! All collaborators are injected at construction: the store backend,
//! the remote client, the sync configuration, and a [`Clock`]. There
//! are no global singletons, which keeps every test hermetic.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod books;
mod clock;
mod error;

pub use books::{AccountDraft, Books, CategoryDraft, TransactionDraft};
pub use clock::{Clock, SystemClock};
pub use error::{BooksError, BooksResult};
