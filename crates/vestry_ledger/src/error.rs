//! Error types for ledger validation.

use thiserror::Error;
use vestry_model::Amount;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors produced when a transaction's shape is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The amount magnitude is negative.
    #[error("transaction amount {0} is negative; amounts are unsigned magnitudes")]
    NegativeAmount(Amount),

    /// A transfer has no target account.
    #[error("transfer is missing a target account")]
    MissingTransferTarget,

    /// A non-transfer carries a target account.
    #[error("only transfers may carry a target account")]
    UnexpectedTransferTarget,
}
