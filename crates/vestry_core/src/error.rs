//! Error types for facade operations.

use thiserror::Error;
use vestry_ledger::LedgerError;
use vestry_model::{Amount, RecordId};
use vestry_store::StoreError;

/// Result type for facade operations.
pub type BooksResult<T> = Result<T, BooksError>;

/// Errors surfaced by [`crate::Books`] operations.
///
/// Validation failures are detected before any store batch is built,
/// so a failed operation commits nothing.
#[derive(Error, Debug)]
pub enum BooksError {
    /// A referenced account does not exist.
    #[error("account {0} not found")]
    MissingAccount(RecordId),

    /// A referenced transaction does not exist.
    #[error("transaction {0} not found")]
    MissingTransaction(RecordId),

    /// A referenced category does not exist.
    #[error("category {0} not found")]
    MissingCategory(RecordId),

    /// A transfer is missing its target account.
    #[error("transfer requires a target account")]
    MissingTransferTarget,

    /// A non-transfer carries a target account.
    #[error("only transfers may carry a target account")]
    UnexpectedTransferTarget,

    /// A transaction amount is negative.
    #[error("transaction amount {0} is negative")]
    NegativeAmount(Amount),

    /// Applying a balance delta would overflow the account balance.
    #[error("balance overflow on account {0}")]
    BalanceOverflow(RecordId),

    /// The local store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LedgerError> for BooksError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NegativeAmount(amount) => BooksError::NegativeAmount(amount),
            LedgerError::MissingTransferTarget => BooksError::MissingTransferTarget,
            LedgerError::UnexpectedTransferTarget => BooksError::UnexpectedTransferTarget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_onto_facade_errors() {
        let err: BooksError = LedgerError::MissingTransferTarget.into();
        assert!(matches!(err, BooksError::MissingTransferTarget));

        let err: BooksError = LedgerError::NegativeAmount(Amount::from_minor(-5)).into();
        assert!(matches!(err, BooksError::NegativeAmount(_)));
    }
}
