//! # Vestry Ledger
//!
//! Pure balance-effect computation.
//!
//! A transaction's *ledger effect* is the set of signed minor-unit
//! deltas it applies to one or two accounts:
//!
//! - income: `+amount` on the source account
//! - expense: `-amount` on the source account
//! - transfer: `-amount` on the source, `+amount` on the target
//!
//! The same computation is used on create (apply), delete (revert),
//! and edit (revert the old entry, then apply the new one). Everything
//! here is side-effect free; applying deltas to stored accounts is the
//! caller's job.
//!
//! ## Key Invariants
//!
//! - Sign is derived from the transaction kind in exactly one place,
//!   [`BalanceEffect::of`]
//! - A transfer effect always sums to zero (conservation)
//! - `of(t).inverted()` composed with `of(t)` is the empty effect

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod effect;
mod error;

pub use effect::{validate, BalanceEffect};
pub use error::{LedgerError, LedgerResult};
