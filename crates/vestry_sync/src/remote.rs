//! Remote backend abstraction.

use crate::error::{SyncError, SyncResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use vestry_model::{Account, Category, PrincipalId, RecordId, RecordTable, Transaction};

/// The remote relational backend, seen through the sync engine's eyes.
///
/// The backend enforces row-level ownership server-side; fetches are
/// scoped to the authenticated principal (transactions via their
/// account's owner). Implementations translate the backend's two
/// sentinel error conditions into [`SyncError::PermissionDenied`] and
/// [`SyncError::RelationMissing`].
pub trait RemoteClient: Send + Sync {
    /// Returns the authenticated principal, or `None` when signed out.
    fn current_principal(&self) -> SyncResult<Option<PrincipalId>>;

    /// Fetches all categories visible to the principal, including
    /// shared defaults.
    fn fetch_categories(&self) -> SyncResult<Vec<Category>>;

    /// Fetches the accounts owned by `owner`.
    fn fetch_accounts(&self, owner: PrincipalId) -> SyncResult<Vec<Account>>;

    /// Fetches the transactions whose account is owned by `owner`.
    fn fetch_transactions(&self, owner: PrincipalId) -> SyncResult<Vec<Transaction>>;

    /// Inserts an account row.
    fn insert_account(&self, account: &Account) -> SyncResult<()>;

    /// Updates an account row.
    fn update_account(&self, account: &Account) -> SyncResult<()>;

    /// Deletes an account row (the backend cascades its transactions).
    fn delete_account(&self, id: RecordId) -> SyncResult<()>;

    /// Inserts a transaction row.
    fn insert_transaction(&self, txn: &Transaction) -> SyncResult<()>;

    /// Updates a transaction row.
    fn update_transaction(&self, txn: &Transaction) -> SyncResult<()>;

    /// Deletes a transaction row.
    fn delete_transaction(&self, id: RecordId) -> SyncResult<()>;

    /// Inserts a category row.
    fn insert_category(&self, category: &Category) -> SyncResult<()>;

    /// Updates a category row.
    fn update_category(&self, category: &Category) -> SyncResult<()>;

    /// Deletes a category row.
    fn delete_category(&self, id: RecordId) -> SyncResult<()>;
}

/// An unauthenticated stub remote for purely local books.
///
/// `current_principal` reports signed-out, which short-circuits every
/// sync cycle; the data calls are never reached by the engine.
#[derive(Debug, Default)]
pub struct NullRemote;

impl NullRemote {
    /// Creates the stub.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RemoteClient for NullRemote {
    fn current_principal(&self) -> SyncResult<Option<PrincipalId>> {
        Ok(None)
    }

    fn fetch_categories(&self) -> SyncResult<Vec<Category>> {
        Err(SyncError::Unauthenticated)
    }

    fn fetch_accounts(&self, _owner: PrincipalId) -> SyncResult<Vec<Account>> {
        Err(SyncError::Unauthenticated)
    }

    fn fetch_transactions(&self, _owner: PrincipalId) -> SyncResult<Vec<Transaction>> {
        Err(SyncError::Unauthenticated)
    }

    fn insert_account(&self, _account: &Account) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn update_account(&self, _account: &Account) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn delete_account(&self, _id: RecordId) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn insert_transaction(&self, _txn: &Transaction) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn update_transaction(&self, _txn: &Transaction) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn delete_transaction(&self, _id: RecordId) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn insert_category(&self, _category: &Category) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn update_category(&self, _category: &Category) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }

    fn delete_category(&self, _id: RecordId) -> SyncResult<()> {
        Err(SyncError::Unauthenticated)
    }
}

/// A scriptable in-memory remote for tests.
///
/// Holds the three entity tables in memory, lets tests control the
/// authenticated principal, and can inject the failure modes the
/// engine must handle: missing relations, permission denials,
/// transient write failures, and slow fetches.
#[derive(Default)]
pub struct MockRemote {
    principal: RwLock<Option<PrincipalId>>,
    accounts: RwLock<BTreeMap<RecordId, Account>>,
    transactions: RwLock<BTreeMap<RecordId, Transaction>>,
    categories: RwLock<BTreeMap<RecordId, Category>>,
    missing_tables: RwLock<HashSet<RecordTable>>,
    denied_tables: RwLock<HashSet<RecordTable>>,
    fail_writes: AtomicBool,
    fetch_delay: RwLock<Option<Duration>>,
    write_calls: AtomicU64,
    delete_calls: AtomicU64,
}

impl MockRemote {
    /// Creates a signed-out mock remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock remote authenticated as `principal`.
    #[must_use]
    pub fn authenticated(principal: PrincipalId) -> Self {
        let remote = Self::new();
        *remote.principal.write() = Some(principal);
        remote
    }

    /// Sets or clears the authenticated principal.
    pub fn set_principal(&self, principal: Option<PrincipalId>) {
        *self.principal.write() = principal;
    }

    /// Marks a table as missing (not provisioned).
    pub fn set_table_missing(&self, table: RecordTable, missing: bool) {
        let mut tables = self.missing_tables.write();
        if missing {
            tables.insert(table);
        } else {
            tables.remove(&table);
        }
    }

    /// Makes writes to a table fail with permission denied.
    pub fn set_table_denied(&self, table: RecordTable, denied: bool) {
        let mut tables = self.denied_tables.write();
        if denied {
            tables.insert(table);
        } else {
            tables.remove(&table);
        }
    }

    /// Makes every write fail with a retryable transport error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delays every fetch, for exercising the re-entrancy guard.
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.write() = delay;
    }

    /// Number of insert/update calls received.
    #[must_use]
    pub fn write_calls(&self) -> u64 {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Number of delete calls received.
    #[must_use]
    pub fn delete_calls(&self) -> u64 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Seeds an account row.
    pub fn seed_account(&self, account: Account) {
        self.accounts.write().insert(account.id, account);
    }

    /// Seeds a transaction row.
    pub fn seed_transaction(&self, txn: Transaction) {
        self.transactions.write().insert(txn.id, txn);
    }

    /// Seeds a category row.
    pub fn seed_category(&self, category: Category) {
        self.categories.write().insert(category.id, category);
    }

    /// Returns a stored account row.
    #[must_use]
    pub fn remote_account(&self, id: RecordId) -> Option<Account> {
        self.accounts.read().get(&id).cloned()
    }

    /// Returns a stored transaction row.
    #[must_use]
    pub fn remote_transaction(&self, id: RecordId) -> Option<Transaction> {
        self.transactions.read().get(&id).cloned()
    }

    /// Returns a stored category row.
    #[must_use]
    pub fn remote_category(&self, id: RecordId) -> Option<Category> {
        self.categories.read().get(&id).cloned()
    }

    fn check_fetch(&self, table: RecordTable) -> SyncResult<()> {
        if let Some(delay) = *self.fetch_delay.read() {
            std::thread::sleep(delay);
        }
        if self.missing_tables.read().contains(&table) {
            return Err(SyncError::RelationMissing(table));
        }
        Ok(())
    }

    fn check_write(&self, table: RecordTable) -> SyncResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_mutation(table)
    }

    fn check_delete(&self, table: RecordTable) -> SyncResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_mutation(table)
    }

    fn check_mutation(&self, table: RecordTable) -> SyncResult<()> {
        if self.missing_tables.read().contains(&table) {
            return Err(SyncError::RelationMissing(table));
        }
        if self.denied_tables.read().contains(&table) {
            return Err(SyncError::PermissionDenied(format!(
                "row-level policy rejected write to {table}"
            )));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::transport_retryable("injected transport failure"));
        }
        Ok(())
    }
}

impl RemoteClient for MockRemote {
    fn current_principal(&self) -> SyncResult<Option<PrincipalId>> {
        Ok(*self.principal.read())
    }

    fn fetch_categories(&self) -> SyncResult<Vec<Category>> {
        self.check_fetch(RecordTable::Categories)?;
        Ok(self.categories.read().values().cloned().collect())
    }

    fn fetch_accounts(&self, owner: PrincipalId) -> SyncResult<Vec<Account>> {
        self.check_fetch(RecordTable::Accounts)?;
        Ok(self
            .accounts
            .read()
            .values()
            .filter(|a| a.owner_id == owner)
            .cloned()
            .collect())
    }

    fn fetch_transactions(&self, owner: PrincipalId) -> SyncResult<Vec<Transaction>> {
        self.check_fetch(RecordTable::Transactions)?;
        let accounts = self.accounts.read();
        Ok(self
            .transactions
            .read()
            .values()
            .filter(|t| {
                accounts
                    .get(&t.account_id)
                    .is_some_and(|a| a.owner_id == owner)
            })
            .cloned()
            .collect())
    }

    fn insert_account(&self, account: &Account) -> SyncResult<()> {
        self.check_write(RecordTable::Accounts)?;
        self.accounts.write().insert(account.id, account.clone());
        Ok(())
    }

    fn update_account(&self, account: &Account) -> SyncResult<()> {
        self.check_write(RecordTable::Accounts)?;
        self.accounts.write().insert(account.id, account.clone());
        Ok(())
    }

    fn delete_account(&self, id: RecordId) -> SyncResult<()> {
        self.check_delete(RecordTable::Accounts)?;
        self.accounts.write().remove(&id);
        // The relational backend cascades dependent transactions.
        self.transactions.write().retain(|_, t| t.account_id != id);
        Ok(())
    }

    fn insert_transaction(&self, txn: &Transaction) -> SyncResult<()> {
        self.check_write(RecordTable::Transactions)?;
        self.transactions.write().insert(txn.id, txn.clone());
        Ok(())
    }

    fn update_transaction(&self, txn: &Transaction) -> SyncResult<()> {
        self.check_write(RecordTable::Transactions)?;
        self.transactions.write().insert(txn.id, txn.clone());
        Ok(())
    }

    fn delete_transaction(&self, id: RecordId) -> SyncResult<()> {
        self.check_delete(RecordTable::Transactions)?;
        self.transactions.write().remove(&id);
        Ok(())
    }

    fn insert_category(&self, category: &Category) -> SyncResult<()> {
        self.check_write(RecordTable::Categories)?;
        self.categories.write().insert(category.id, category.clone());
        Ok(())
    }

    fn update_category(&self, category: &Category) -> SyncResult<()> {
        self.check_write(RecordTable::Categories)?;
        self.categories.write().insert(category.id, category.clone());
        Ok(())
    }

    fn delete_category(&self, id: RecordId) -> SyncResult<()> {
        self.check_delete(RecordTable::Categories)?;
        self.categories.write().remove(&id);
        Ok(())
    }
}
