//! The typed local store: record collections, secondary indexes, and
//! the mutation queue.

use crate::backend::StoreBackend;
use crate::error::{StoreError, StoreResult};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;
use vestry_model::{
    Account, Category, Mutation, PrincipalId, RecordId, RecordTable, SyncState, Transaction,
};

/// Persisted shape of the whole store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    queue: Vec<Mutation>,
}

/// In-memory collections plus the secondary indexes required by the
/// store contract: accounts-by-owner and transactions-by-account.
#[derive(Debug, Default, Clone)]
struct Collections {
    accounts: BTreeMap<RecordId, Account>,
    transactions: BTreeMap<RecordId, Transaction>,
    categories: BTreeMap<RecordId, Category>,
    queue: Vec<Mutation>,
    accounts_by_owner: HashMap<PrincipalId, BTreeSet<RecordId>>,
    transactions_by_account: HashMap<RecordId, BTreeSet<RecordId>>,
}

impl Collections {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut cols = Self::default();
        for account in snapshot.accounts {
            cols.put_account(account);
        }
        for txn in snapshot.transactions {
            cols.put_transaction(txn);
        }
        for category in snapshot.categories {
            cols.categories.insert(category.id, category);
        }
        cols.queue = snapshot.queue;
        cols
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            accounts: self.accounts.values().cloned().collect(),
            transactions: self.transactions.values().cloned().collect(),
            categories: self.categories.values().cloned().collect(),
            queue: self.queue.clone(),
        }
    }

    fn put_account(&mut self, account: Account) {
        if let Some(previous) = self.accounts.insert(account.id, account.clone()) {
            if previous.owner_id != account.owner_id {
                if let Some(ids) = self.accounts_by_owner.get_mut(&previous.owner_id) {
                    ids.remove(&previous.id);
                }
            }
        }
        self.accounts_by_owner
            .entry(account.owner_id)
            .or_default()
            .insert(account.id);
    }

    fn delete_account(&mut self, id: RecordId) {
        if let Some(account) = self.accounts.remove(&id) {
            if let Some(ids) = self.accounts_by_owner.get_mut(&account.owner_id) {
                ids.remove(&id);
            }
        }
    }

    fn put_transaction(&mut self, txn: Transaction) {
        if let Some(previous) = self.transactions.insert(txn.id, txn.clone()) {
            if previous.account_id != txn.account_id {
                if let Some(ids) = self.transactions_by_account.get_mut(&previous.account_id) {
                    ids.remove(&previous.id);
                }
            }
        }
        self.transactions_by_account
            .entry(txn.account_id)
            .or_default()
            .insert(txn.id);
    }

    fn delete_transaction(&mut self, id: RecordId) {
        if let Some(txn) = self.transactions.remove(&id) {
            if let Some(ids) = self.transactions_by_account.get_mut(&txn.account_id) {
                ids.remove(&id);
            }
        }
    }

    fn remove_mutation(&mut self, entry_id: RecordId) {
        self.queue.retain(|m| m.id != entry_id);
    }

    fn remove_mutations_for(&mut self, record_id: RecordId) {
        self.queue.retain(|m| m.record_id() != record_id);
    }

    fn mark_synced(&mut self, table: RecordTable, id: RecordId) {
        match table {
            RecordTable::Accounts => {
                if let Some(account) = self.accounts.get_mut(&id) {
                    account.sync_state = SyncState::Synced;
                }
            }
            RecordTable::Transactions => {
                if let Some(txn) = self.transactions.get_mut(&id) {
                    txn.sync_state = SyncState::Synced;
                }
            }
            RecordTable::Categories => {
                if let Some(category) = self.categories.get_mut(&id) {
                    category.sync_state = SyncState::Synced;
                }
            }
        }
    }
}

/// One write against the store, grouped into a [`StoreBatch`].
#[derive(Debug, Clone)]
enum BatchOp {
    PutAccount(Account),
    DeleteAccount(RecordId),
    PutTransaction(Transaction),
    DeleteTransaction(RecordId),
    PutCategory(Category),
    DeleteCategory(RecordId),
    Enqueue(Mutation),
    RemoveMutation(RecordId),
    RemoveMutationsFor(RecordId),
    MarkSynced(RecordTable, RecordId),
}

/// A group of writes applied all-or-nothing.
///
/// Facade operations that touch several records (a transfer edit can
/// touch four accounts, a transaction, and multiple queue entries)
/// build one batch so either every write lands and is persisted, or
/// the store is left untouched.
#[derive(Debug, Clone, Default)]
pub struct StoreBatch {
    ops: Vec<BatchOp>,
}

impl StoreBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account upsert.
    #[must_use]
    pub fn put_account(mut self, account: Account) -> Self {
        self.ops.push(BatchOp::PutAccount(account));
        self
    }

    /// Adds an account delete. Deleting an absent record is a no-op.
    #[must_use]
    pub fn delete_account(mut self, id: RecordId) -> Self {
        self.ops.push(BatchOp::DeleteAccount(id));
        self
    }

    /// Adds a transaction upsert.
    #[must_use]
    pub fn put_transaction(mut self, txn: Transaction) -> Self {
        self.ops.push(BatchOp::PutTransaction(txn));
        self
    }

    /// Adds a transaction delete. Deleting an absent record is a no-op.
    #[must_use]
    pub fn delete_transaction(mut self, id: RecordId) -> Self {
        self.ops.push(BatchOp::DeleteTransaction(id));
        self
    }

    /// Adds a category upsert.
    #[must_use]
    pub fn put_category(mut self, category: Category) -> Self {
        self.ops.push(BatchOp::PutCategory(category));
        self
    }

    /// Adds a category delete. Deleting an absent record is a no-op.
    #[must_use]
    pub fn delete_category(mut self, id: RecordId) -> Self {
        self.ops.push(BatchOp::DeleteCategory(id));
        self
    }

    /// Appends a mutation-queue entry.
    #[must_use]
    pub fn enqueue(mut self, mutation: Mutation) -> Self {
        self.ops.push(BatchOp::Enqueue(mutation));
        self
    }

    /// Removes one queue entry by entry ID.
    #[must_use]
    pub fn remove_mutation(mut self, entry_id: RecordId) -> Self {
        self.ops.push(BatchOp::RemoveMutation(entry_id));
        self
    }

    /// Removes every queue entry whose payload is about `record_id`.
    ///
    /// Used by delete paths so a still-queued create cannot resurrect
    /// a deleted record remotely.
    #[must_use]
    pub fn remove_mutations_for(mut self, record_id: RecordId) -> Self {
        self.ops.push(BatchOp::RemoveMutationsFor(record_id));
        self
    }

    /// Flips the record's `sync_state` to `Synced`, leaving every
    /// other field as it is **when the batch is applied**.
    ///
    /// Unlike a `put_*` of a record fetched earlier, the mark is
    /// resolved against the store's current contents under the store
    /// lock, so it cannot write back a stale snapshot over a write
    /// that landed after the batch was built. No-op when the record
    /// no longer exists.
    #[must_use]
    pub fn mark_synced(mut self, table: RecordTable, id: RecordId) -> Self {
        self.ops.push(BatchOp::MarkSynced(table, id));
        self
    }

    /// Returns true if the batch carries no writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of writes in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// The keyed, indexed on-device store.
///
/// Holds the four record collections (accounts, transactions,
/// categories, mutation queue). Every mutating call re-encodes the
/// snapshot and persists it through the backend before the in-memory
/// state is swapped, so a failed persist leaves the store unchanged
/// and successful writes are immediately visible to readers.
pub struct LocalStore {
    backend: Mutex<Box<dyn StoreBackend>>,
    inner: RwLock<Collections>,
}

impl LocalStore {
    /// Opens a store over the given backend, decoding any existing
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the snapshot cannot
    /// be decoded.
    pub fn open(backend: Box<dyn StoreBackend>) -> StoreResult<Self> {
        let snapshot = match backend.load()? {
            Some(bytes) => ciborium::from_reader(bytes.as_slice())
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            None => Snapshot::default(),
        };
        let cols = Collections::from_snapshot(snapshot);
        debug!(
            accounts = cols.accounts.len(),
            transactions = cols.transactions.len(),
            categories = cols.categories.len(),
            queued = cols.queue.len(),
            "opened local store"
        );
        Ok(Self {
            backend: Mutex::new(backend),
            inner: RwLock::new(cols),
        })
    }

    /// Applies a batch of writes all-or-nothing.
    ///
    /// The batch is applied to a working copy, persisted, and only
    /// then swapped in; a persist failure leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend save fails.
    pub fn apply(&self, batch: StoreBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut backend = self.backend.lock();
        let mut working = self.inner.read().clone();

        for op in batch.ops {
            match op {
                BatchOp::PutAccount(account) => working.put_account(account),
                BatchOp::DeleteAccount(id) => working.delete_account(id),
                BatchOp::PutTransaction(txn) => working.put_transaction(txn),
                BatchOp::DeleteTransaction(id) => working.delete_transaction(id),
                BatchOp::PutCategory(category) => {
                    working.categories.insert(category.id, category);
                }
                BatchOp::DeleteCategory(id) => {
                    working.categories.remove(&id);
                }
                BatchOp::Enqueue(mutation) => working.queue.push(mutation),
                BatchOp::RemoveMutation(entry_id) => working.remove_mutation(entry_id),
                BatchOp::RemoveMutationsFor(record_id) => {
                    working.remove_mutations_for(record_id);
                }
                BatchOp::MarkSynced(table, id) => working.mark_synced(table, id),
            }
        }

        let mut bytes = Vec::new();
        ciborium::into_writer(&working.to_snapshot(), &mut bytes)
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        backend.save(&bytes)?;

        *self.inner.write() = working;
        Ok(())
    }

    // --- accounts ---

    /// Looks up one account.
    #[must_use]
    pub fn get_account(&self, id: RecordId) -> Option<Account> {
        self.inner.read().accounts.get(&id).cloned()
    }

    /// Returns all accounts.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.inner.read().accounts.values().cloned().collect()
    }

    /// Indexed lookup: all accounts owned by `owner`.
    #[must_use]
    pub fn accounts_by_owner(&self, owner: PrincipalId) -> Vec<Account> {
        let inner = self.inner.read();
        inner
            .accounts_by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.accounts.get(id).cloned())
            .collect()
    }

    /// Upserts one account.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn put_account(&self, account: Account) -> StoreResult<()> {
        self.apply(StoreBatch::new().put_account(account))
    }

    /// Deletes one account (no-op when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn delete_account(&self, id: RecordId) -> StoreResult<()> {
        self.apply(StoreBatch::new().delete_account(id))
    }

    // --- transactions ---

    /// Looks up one transaction.
    #[must_use]
    pub fn get_transaction(&self, id: RecordId) -> Option<Transaction> {
        self.inner.read().transactions.get(&id).cloned()
    }

    /// Returns all transactions.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.read().transactions.values().cloned().collect()
    }

    /// Indexed lookup: all transactions whose source is `account_id`.
    #[must_use]
    pub fn transactions_by_account(&self, account_id: RecordId) -> Vec<Transaction> {
        let inner = self.inner.read();
        inner
            .transactions_by_account
            .get(&account_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.transactions.get(id).cloned())
            .collect()
    }

    /// Upserts one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn put_transaction(&self, txn: Transaction) -> StoreResult<()> {
        self.apply(StoreBatch::new().put_transaction(txn))
    }

    /// Deletes one transaction (no-op when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn delete_transaction(&self, id: RecordId) -> StoreResult<()> {
        self.apply(StoreBatch::new().delete_transaction(id))
    }

    // --- categories ---

    /// Looks up one category.
    #[must_use]
    pub fn get_category(&self, id: RecordId) -> Option<Category> {
        self.inner.read().categories.get(&id).cloned()
    }

    /// Returns all categories.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.inner.read().categories.values().cloned().collect()
    }

    /// Upserts one category.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn put_category(&self, category: Category) -> StoreResult<()> {
        self.apply(StoreBatch::new().put_category(category))
    }

    /// Deletes one category (no-op when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn delete_category(&self, id: RecordId) -> StoreResult<()> {
        self.apply(StoreBatch::new().delete_category(id))
    }

    // --- mutation queue ---

    /// Appends a mutation-queue entry.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn enqueue_mutation(&self, mutation: Mutation) -> StoreResult<()> {
        self.apply(StoreBatch::new().enqueue(mutation))
    }

    /// Returns all pending queue entries in FIFO insertion order.
    #[must_use]
    pub fn pending_mutations(&self) -> Vec<Mutation> {
        self.inner.read().queue.clone()
    }

    /// Number of pending queue entries.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.read().queue.len()
    }

    /// Removes one queue entry (no-op when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the snapshot fails.
    pub fn remove_mutation(&self, entry_id: RecordId) -> StoreResult<()> {
        self.apply(StoreBatch::new().remove_mutation(entry_id))
    }
}
