//! # Vestry Testkit
//!
//! Shared fixtures and proptest generators for exercising the
//! bookkeeping core end to end without touching disk or network.
//!
//! [`TestBooks`] wires a [`vestry_core::Books`] facade to an in-memory
//! store, a scriptable [`vestry_sync::MockRemote`], and a settable
//! [`FixedClock`], authenticated and online by default.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;
mod generators;

pub use fixtures::{FixedClock, TestBooks};
pub use generators::{
    account_draft_strategy, account_kind_strategy, amount_strategy, category_draft_strategy,
    category_kind_strategy, name_strategy, transaction_kind_strategy,
};
