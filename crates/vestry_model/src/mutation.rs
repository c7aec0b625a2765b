//! Mutation-queue entry types.

use crate::{Account, Category, PrincipalId, RecordId, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The record collection a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordTable {
    /// Account records.
    Accounts,
    /// Transaction records.
    Transactions,
    /// Category records.
    Categories,
}

impl fmt::Display for RecordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTable::Accounts => write!(f, "accounts"),
            RecordTable::Transactions => write!(f, "transactions"),
            RecordTable::Categories => write!(f, "categories"),
        }
    }
}

/// The intent recorded by a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    /// Insert the payload remotely.
    Create,
    /// Update the payload remotely.
    Update,
    /// Delete the payload's record remotely.
    ///
    /// Deletes normally bypass the queue; this variant exists so the
    /// push phase can drain legacy or hand-enqueued entries.
    Delete,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationAction::Create => write!(f, "create"),
            MutationAction::Update => write!(f, "update"),
            MutationAction::Delete => write!(f, "delete"),
        }
    }
}

/// The record snapshot carried by a queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "table", content = "record")]
pub enum MutationPayload {
    /// An account snapshot.
    Account(Account),
    /// A transaction snapshot.
    Transaction(Transaction),
    /// A category snapshot.
    Category(Category),
}

impl MutationPayload {
    /// The collection this payload belongs to.
    #[must_use]
    pub const fn table(&self) -> RecordTable {
        match self {
            MutationPayload::Account(_) => RecordTable::Accounts,
            MutationPayload::Transaction(_) => RecordTable::Transactions,
            MutationPayload::Category(_) => RecordTable::Categories,
        }
    }

    /// The ID of the snapshotted record.
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        match self {
            MutationPayload::Account(account) => account.id,
            MutationPayload::Transaction(txn) => txn.id,
            MutationPayload::Category(category) => category.id,
        }
    }

    /// The owner recorded on the payload, where the payload itself
    /// carries one. Transactions are owned via their source account,
    /// which the push phase resolves against the local store.
    #[must_use]
    pub const fn direct_owner(&self) -> Option<PrincipalId> {
        match self {
            MutationPayload::Account(account) => Some(account.owner_id),
            MutationPayload::Category(category) => category.owner_id,
            MutationPayload::Transaction(_) => None,
        }
    }
}

/// A not-yet-confirmed local write awaiting remote confirmation.
///
/// Entries are appended in mutation order and drained FIFO by the
/// push phase; an entry is removed once the remote call succeeds or
/// the entry is judged invalid (ownership mismatch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Queue entry ID (distinct from the payload record ID).
    pub id: RecordId,
    /// The recorded intent.
    pub action: MutationAction,
    /// Snapshot of the record at enqueue time.
    pub payload: MutationPayload,
    /// Enqueue timestamp.
    pub queued_at: DateTime<Utc>,
}

impl Mutation {
    /// Creates a queue entry recording a local create.
    #[must_use]
    pub fn create(payload: MutationPayload, now: DateTime<Utc>) -> Self {
        Self::new(MutationAction::Create, payload, now)
    }

    /// Creates a queue entry recording a local update.
    #[must_use]
    pub fn update(payload: MutationPayload, now: DateTime<Utc>) -> Self {
        Self::new(MutationAction::Update, payload, now)
    }

    fn new(action: MutationAction, payload: MutationPayload, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            action,
            payload,
            queued_at: now,
        }
    }

    /// The collection this entry targets.
    #[must_use]
    pub const fn table(&self) -> RecordTable {
        self.payload.table()
    }

    /// The ID of the record this entry is about.
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        self.payload.record_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountKind, Amount, CategoryKind};

    #[test]
    fn payload_table_mapping() {
        let now = Utc::now();
        let owner = PrincipalId::new();
        let account = Account::new(owner, "Main", AccountKind::Checking, Amount::ZERO, now);
        let category = Category::new(owner, "Missions", CategoryKind::Expense, "#fff", now);

        assert_eq!(
            MutationPayload::Account(account.clone()).table(),
            RecordTable::Accounts
        );
        assert_eq!(
            MutationPayload::Category(category).table(),
            RecordTable::Categories
        );
        assert_eq!(
            MutationPayload::Account(account.clone()).record_id(),
            account.id
        );
    }

    #[test]
    fn transactions_have_no_direct_owner() {
        let now = Utc::now();
        let txn = Transaction::new(
            RecordId::new(),
            crate::TransactionKind::Expense,
            Amount::from_minor(100),
            now,
        );
        assert_eq!(MutationPayload::Transaction(txn).direct_owner(), None);
    }

    #[test]
    fn entry_ids_are_fresh() {
        let now = Utc::now();
        let owner = PrincipalId::new();
        let account = Account::new(owner, "Main", AccountKind::Cash, Amount::ZERO, now);
        let entry = Mutation::create(MutationPayload::Account(account.clone()), now);
        assert_ne!(entry.id, account.id);
        assert_eq!(entry.record_id(), account.id);
        assert_eq!(entry.action, MutationAction::Create);
    }
}
