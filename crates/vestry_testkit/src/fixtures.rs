//! Ready-made fixtures for integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;
use vestry_core::{AccountDraft, Books, CategoryDraft, Clock, TransactionDraft};
use vestry_model::{
    Account, AccountKind, Amount, Category, CategoryKind, PrincipalId, RecordId, Transaction,
    TransactionKind,
};
use vestry_store::{InMemoryBackend, LocalStore};
use vestry_sync::{MockRemote, RemoteClient, SyncConfig};

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned to the given instant.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// A clock pinned to an arbitrary fixed date.
    #[must_use]
    pub fn default_start() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap())
    }

    /// Pins the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A fully wired in-memory [`Books`] with deterministic time and a
/// scriptable remote.
///
/// Dereferences to [`Books`], so tests call facade operations
/// directly and reach for [`TestBooks::remote`] or
/// [`TestBooks::clock`] only when scripting failures or time.
pub struct TestBooks {
    books: Books,
    store: Arc<LocalStore>,
    remote: Arc<MockRemote>,
    clock: Arc<FixedClock>,
    owner: PrincipalId,
}

impl TestBooks {
    /// Authenticated and online.
    #[must_use]
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Authenticated but offline; work accumulates in the queue until
    /// `set_online(true)`.
    #[must_use]
    pub fn offline() -> Self {
        Self::build(false)
    }

    fn build(online: bool) -> Self {
        let owner = PrincipalId::new();
        let remote = Arc::new(MockRemote::authenticated(owner));
        let clock = Arc::new(FixedClock::default_start());
        let store = Arc::new(
            LocalStore::open(Box::new(InMemoryBackend::new()))
                .unwrap_or_else(|err| panic!("in-memory store open failed: {err}")),
        );
        let books = Books::open(
            Arc::clone(&store),
            Arc::clone(&remote) as Arc<dyn RemoteClient>,
            // Long interval: tests drive cycles explicitly.
            SyncConfig::new().with_auto_interval(std::time::Duration::from_secs(3600)),
            Arc::clone(&clock) as Arc<dyn Clock>,
            owner,
            online,
        );
        Self {
            books,
            store,
            remote,
            clock,
            owner,
        }
    }

    /// The scriptable remote.
    #[must_use]
    pub fn remote(&self) -> &MockRemote {
        &self.remote
    }

    /// The settable clock.
    #[must_use]
    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    /// The underlying local store.
    #[must_use]
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// The authenticated principal.
    #[must_use]
    pub fn principal(&self) -> PrincipalId {
        self.owner
    }

    /// Creates a checking account with the given opening balance.
    pub fn checking(&self, name: &str, opening_minor: i64) -> Account {
        self.books
            .create_account(AccountDraft {
                name: name.into(),
                kind: AccountKind::Checking,
                initial_balance: Amount::from_minor(opening_minor),
            })
            .unwrap_or_else(|err| panic!("account fixture failed: {err}"))
    }

    /// Records an income entry on the account.
    pub fn income(&self, account: RecordId, minor: i64) -> Transaction {
        self.books
            .create_transaction(TransactionDraft::new(
                account,
                TransactionKind::Income,
                Amount::from_minor(minor),
            ))
            .unwrap_or_else(|err| panic!("income fixture failed: {err}"))
    }

    /// Records an expense entry on the account.
    pub fn expense(&self, account: RecordId, minor: i64) -> Transaction {
        self.books
            .create_transaction(TransactionDraft::new(
                account,
                TransactionKind::Expense,
                Amount::from_minor(minor),
            ))
            .unwrap_or_else(|err| panic!("expense fixture failed: {err}"))
    }

    /// Records a transfer between two accounts.
    pub fn transfer(&self, from: RecordId, to: RecordId, minor: i64) -> Transaction {
        self.books
            .create_transaction(
                TransactionDraft::new(from, TransactionKind::Transfer, Amount::from_minor(minor))
                    .with_target(to),
            )
            .unwrap_or_else(|err| panic!("transfer fixture failed: {err}"))
    }

    /// Creates an expense category.
    pub fn expense_category(&self, name: &str) -> Category {
        self.books
            .create_category(CategoryDraft {
                name: name.into(),
                kind: CategoryKind::Expense,
                color: "#546e7a".into(),
            })
            .unwrap_or_else(|err| panic!("category fixture failed: {err}"))
    }
}

impl Default for TestBooks {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestBooks {
    type Target = Books;

    fn deref(&self) -> &Books {
        &self.books
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestry_model::SyncState;

    #[test]
    fn fixture_is_authenticated_and_deterministic() {
        let books = TestBooks::new();
        let account = books.checking("General fund", 10_000);
        assert_eq!(account.created_at, books.clock().now());

        books.clock().advance(Duration::minutes(5));
        let txn = books.income(account.id, 500);
        assert_eq!(txn.created_at - account.created_at, Duration::minutes(5));
    }

    #[test]
    fn offline_fixture_queues_work() {
        let books = TestBooks::offline();
        assert!(!books.is_online());

        let account = books.checking("Cash box", 0);
        books.expense_category("Candles");
        assert!(books.pending_count() >= 2);
        assert_eq!(
            books.account(account.id).unwrap().sync_state,
            SyncState::Pending
        );
    }
}
