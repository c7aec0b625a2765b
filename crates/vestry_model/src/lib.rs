//! # Vestry Model
//!
//! Shared record types for the Vestry bookkeeping core.
//!
//! This crate defines:
//! - Identifier newtypes ([`RecordId`], [`PrincipalId`])
//! - Money amounts in integer minor units ([`Amount`])
//! - The three record collections ([`Account`], [`Transaction`], [`Category`])
//! - Per-record sync metadata ([`SyncState`])
//! - Mutation-queue entries ([`Mutation`])
//!
//! ## Key Invariants
//!
//! - Transaction amounts are unsigned magnitudes; sign is derived from
//!   the transaction kind by the ledger, never re-derived elsewhere
//! - `target_account_id` is present exactly when the kind is `Transfer`
//! - `current_balance == initial_balance + Σ applied effects` at every
//!   quiescent point
//! - All balance arithmetic is integer minor units; no floats

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod amount;
mod category;
mod ids;
mod mutation;
mod sync_state;
mod transaction;

pub use account::{Account, AccountKind};
pub use amount::{Amount, AmountParseError};
pub use category::{Category, CategoryKind};
pub use ids::{PrincipalId, RecordId};
pub use mutation::{Mutation, MutationAction, MutationPayload, RecordTable};
pub use sync_state::SyncState;
pub use transaction::{Transaction, TransactionKind};
