//! Account records.

use crate::{Amount, PrincipalId, RecordId, SyncState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a bookkeeping account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Everyday operating account.
    Checking,
    /// Reserve / savings account.
    Savings,
    /// Credit line (balance usually negative).
    Credit,
    /// Physical cash on hand.
    Cash,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Checking => write!(f, "checking"),
            AccountKind::Savings => write!(f, "savings"),
            AccountKind::Credit => write!(f, "credit"),
            AccountKind::Cash => write!(f, "cash"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "credit" => Ok(AccountKind::Credit),
            "cash" => Ok(AccountKind::Cash),
            other => Err(format!("unknown account kind: {other:?}")),
        }
    }
}

/// A bookkeeping account with a derived running balance.
///
/// `current_balance` is mutable derived state: it always equals
/// `initial_balance` plus the sum of the ledger effects of every
/// transaction currently attributed to this account, as source or as
/// transfer target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Client-generated unique ID.
    pub id: RecordId,
    /// Owning user.
    pub owner_id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Opening balance when the account was created.
    pub initial_balance: Amount,
    /// Running balance including all applied transaction effects.
    pub current_balance: Amount,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp; drives last-writer-wins merges.
    pub updated_at: DateTime<Utc>,
    /// Local/remote reconciliation state.
    pub sync_state: SyncState,
}

impl Account {
    /// Creates a new account pending upload, with the running balance
    /// seeded from the opening balance.
    #[must_use]
    pub fn new(
        owner_id: PrincipalId,
        name: impl Into<String>,
        kind: AccountKind,
        initial_balance: Amount,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            owner_id,
            name: name.into(),
            kind,
            initial_balance,
            current_balance: initial_balance,
            created_at: now,
            updated_at: now,
            sync_state: SyncState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_at_initial_balance() {
        let account = Account::new(
            PrincipalId::new(),
            "Main",
            AccountKind::Checking,
            Amount::from_minor(100_000),
            Utc::now(),
        );
        assert_eq!(account.current_balance, account.initial_balance);
        assert_eq!(account.sync_state, SyncState::Pending);
    }

    #[test]
    fn kind_roundtrips() {
        for kind in [
            AccountKind::Checking,
            AccountKind::Savings,
            AccountKind::Credit,
            AccountKind::Cash,
        ] {
            let parsed: AccountKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
