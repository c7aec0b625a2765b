//! Transaction records.

use crate::{Amount, RecordId, SyncState};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a transaction's balance effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money into the source account.
    Income,
    /// Money out of the source account.
    Expense,
    /// Money moved from the source account to the target account.
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
            TransactionKind::Transfer => write!(f, "transfer"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(format!("unknown transaction kind: {other:?}")),
        }
    }
}

/// A single bookkeeping entry.
///
/// `amount` is always a non-negative magnitude; the sign of its
/// balance effect is derived from `kind` by the ledger.
/// `target_account_id` is present exactly when `kind` is `Transfer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Client-generated unique ID.
    pub id: RecordId,
    /// Source account.
    pub account_id: RecordId,
    /// Transfer destination account (transfers only).
    pub target_account_id: Option<RecordId>,
    /// Optional category.
    pub category_id: Option<RecordId>,
    /// Non-negative magnitude in minor units.
    pub amount: Amount,
    /// Free-form description.
    pub description: String,
    /// Bookkeeping date (not the wall-clock creation instant).
    pub date: NaiveDate,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp; drives last-writer-wins merges.
    pub updated_at: DateTime<Utc>,
    /// Local/remote reconciliation state.
    pub sync_state: SyncState,
}

impl Transaction {
    /// Creates a new transaction pending upload.
    #[must_use]
    pub fn new(
        account_id: RecordId,
        kind: TransactionKind,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            account_id,
            target_account_id: None,
            category_id: None,
            amount,
            description: String::new(),
            date: now.date_naive(),
            kind,
            created_at: now,
            updated_at: now,
            sync_state: SyncState::Pending,
        }
    }

    /// Sets the transfer target account.
    #[must_use]
    pub fn with_target(mut self, target: RecordId) -> Self {
        self.target_account_id = Some(target);
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: RecordId) -> Self {
        self.category_id = Some(category);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the bookkeeping date.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Returns true for transfer entries.
    #[must_use]
    pub const fn is_transfer(&self) -> bool {
        matches!(self.kind, TransactionKind::Transfer)
    }

    /// Returns true if the given account is referenced as source or
    /// transfer target.
    #[must_use]
    pub fn references(&self, account_id: RecordId) -> bool {
        self.account_id == account_id || self.target_account_id == Some(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let account = RecordId::new();
        let target = RecordId::new();
        let txn = Transaction::new(
            account,
            TransactionKind::Transfer,
            Amount::from_minor(500),
            Utc::now(),
        )
        .with_target(target)
        .with_description("to savings");

        assert!(txn.is_transfer());
        assert_eq!(txn.target_account_id, Some(target));
        assert!(txn.references(account));
        assert!(txn.references(target));
        assert!(!txn.references(RecordId::new()));
    }

    #[test]
    fn kind_roundtrips() {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Transfer,
        ] {
            let parsed: TransactionKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
