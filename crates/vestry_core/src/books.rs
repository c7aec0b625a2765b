//! The `Books` facade: validated mutations over the local store.

use crate::clock::Clock;
use crate::error::{BooksError, BooksResult};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};
use vestry_ledger::BalanceEffect;
use vestry_model::{
    Account, AccountKind, Amount, Category, CategoryKind, Mutation, MutationPayload, PrincipalId,
    RecordId, RecordTable, SyncState, Transaction, TransactionKind,
};
use vestry_store::{LocalStore, StoreBatch};
use vestry_sync::{RemoteClient, SyncConfig, SyncEngine, SyncOutcome, SyncResult, SyncScheduler};

/// Input for [`Books::create_account`].
#[derive(Debug, Clone)]
pub struct AccountDraft {
    /// Display name.
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Opening balance.
    pub initial_balance: Amount,
}

/// Input for [`Books::create_transaction`].
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Source account.
    pub account_id: RecordId,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Unsigned magnitude in minor units.
    pub amount: Amount,
    /// Destination account, transfers only.
    pub target_account_id: Option<RecordId>,
    /// Optional category.
    pub category_id: Option<RecordId>,
    /// Free-form description.
    pub description: String,
    /// Book date of the entry.
    pub date: NaiveDate,
}

impl TransactionDraft {
    /// Creates a minimal draft; the remaining fields use their
    /// defaults (today's date, no category, empty description).
    #[must_use]
    pub fn new(account_id: RecordId, kind: TransactionKind, amount: Amount) -> Self {
        Self {
            account_id,
            kind,
            amount,
            target_account_id: None,
            category_id: None,
            description: String::new(),
            date: Utc::now().date_naive(),
        }
    }

    /// Sets the transfer target.
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

    /// Sets the book date.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// Input for [`Books::create_category`].
#[derive(Debug, Clone)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,
    /// Category kind.
    pub kind: CategoryKind,
    /// Display color (hex string).
    pub color: String,
}

#[derive(Default)]
struct ViewState {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
}

/// The application-facing service object.
///
/// Every mutating operation follows the same shape: validate the
/// input against the current store, compute the balance effect,
/// commit records, balance adjustments, and queue entries as one
/// atomic batch, refresh the in-memory view, and request a background
/// sync cycle when online. Deletes additionally fire a best-effort
/// remote delete, since deletes bypass the mutation queue.
pub struct Books {
    store: Arc<LocalStore>,
    engine: Arc<SyncEngine>,
    scheduler: SyncScheduler,
    clock: Arc<dyn Clock>,
    owner: PrincipalId,
    view: RwLock<ViewState>,
}

impl Books {
    /// Opens the books over injected collaborators.
    ///
    /// Spawns the background sync scheduler; dropping the `Books`
    /// shuts it down.
    #[must_use]
    pub fn open(
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteClient>,
        config: SyncConfig,
        clock: Arc<dyn Clock>,
        owner: PrincipalId,
        initially_online: bool,
    ) -> Self {
        let engine = Arc::new(SyncEngine::new(Arc::clone(&store), remote, config));
        let scheduler = SyncScheduler::start(Arc::clone(&engine), initially_online);
        let books = Self {
            store,
            engine,
            scheduler,
            clock,
            owner,
            view: RwLock::new(ViewState::default()),
        };
        books.refresh();
        books
    }

    /// The principal all locally created records are owned by.
    #[must_use]
    pub fn owner(&self) -> PrincipalId {
        self.owner
    }

    /// Whether the scheduler currently considers itself online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.scheduler.is_online()
    }

    /// Flips the connectivity flag; going online drains queued work.
    pub fn set_online(&self, online: bool) {
        self.scheduler.set_online(online);
    }

    /// Whether a sync cycle is running right now.
    #[must_use]
    pub fn sync_in_progress(&self) -> bool {
        self.engine.in_progress()
    }

    /// Number of queued, unpushed mutations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    /// Queued, unpushed mutations in FIFO order.
    #[must_use]
    pub fn pending_mutations(&self) -> Vec<Mutation> {
        self.store.pending_mutations()
    }

    /// Requests a background sync cycle.
    pub fn request_sync(&self) {
        self.scheduler.request_sync();
    }

    /// Runs one blocking sync cycle and refreshes the view.
    ///
    /// # Errors
    ///
    /// Propagates the cycle-level error from the engine; per-record
    /// failures inside the cycle are logged and retried by recurrence.
    pub fn sync_now(&self) -> SyncResult<SyncOutcome> {
        let result = self.engine.sync();
        self.refresh();
        result
    }

    /// Refreshes the view from the local store, then runs one blocking
    /// sync cycle when online and refreshes again.
    ///
    /// Local data is always served first; a failed initial sync leaves
    /// the books usable offline.
    pub fn load_data(&self) {
        self.refresh();
        if self.scheduler.is_online() {
            match self.engine.sync() {
                Ok(outcome) if !outcome.skipped => {
                    debug!(pulled = outcome.pulled, pushed = outcome.pushed, "initial sync done");
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "initial sync failed; serving local data"),
            }
            self.refresh();
        }
    }

    // --- view accessors ---

    /// Accounts, sorted by name.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.view.read().accounts.clone()
    }

    /// Transactions, newest book date first.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.view.read().transactions.clone()
    }

    /// Categories, sorted by name.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.view.read().categories.clone()
    }

    /// One account by id.
    #[must_use]
    pub fn account(&self, id: RecordId) -> Option<Account> {
        self.store.get_account(id)
    }

    /// One transaction by id.
    #[must_use]
    pub fn transaction(&self, id: RecordId) -> Option<Transaction> {
        self.store.get_transaction(id)
    }

    /// One category by id.
    #[must_use]
    pub fn category(&self, id: RecordId) -> Option<Category> {
        self.store.get_category(id)
    }

    /// Transactions whose source account is `account_id`.
    #[must_use]
    pub fn transactions_for_account(&self, account_id: RecordId) -> Vec<Transaction> {
        self.store.transactions_by_account(account_id)
    }

    /// Sum of all current balances, saturating at the i64 range.
    #[must_use]
    pub fn total_balance(&self) -> Amount {
        let sum = self
            .view
            .read()
            .accounts
            .iter()
            .fold(0i64, |acc, account| {
                acc.saturating_add(account.current_balance.minor())
            });
        Amount::from_minor(sum)
    }

    // --- account operations ---

    /// Creates an account and queues it for push.
    ///
    /// # Errors
    ///
    /// Returns a store error when persisting fails.
    pub fn create_account(&self, draft: AccountDraft) -> BooksResult<Account> {
        let now = self.clock.now();
        let account = Account::new(self.owner, draft.name, draft.kind, draft.initial_balance, now);

        self.store.apply(
            StoreBatch::new()
                .put_account(account.clone())
                .enqueue(Mutation::create(
                    MutationPayload::Account(account.clone()),
                    now,
                )),
        )?;

        self.after_mutation();
        Ok(account)
    }

    /// Updates an account, recomputing `current_balance` from the
    /// opening balance and the ledger so the balance invariant holds
    /// even when `initial_balance` changed.
    ///
    /// # Errors
    ///
    /// [`BooksError::MissingAccount`] when the account does not exist,
    /// [`BooksError::BalanceOverflow`] when recomputation overflows.
    pub fn update_account(&self, mut account: Account) -> BooksResult<Account> {
        if self.store.get_account(account.id).is_none() {
            return Err(BooksError::MissingAccount(account.id));
        }
        let now = self.clock.now();

        let mut effect = BalanceEffect::empty();
        for txn in self.store.transactions() {
            if txn.references(account.id) {
                effect = effect.combined(BalanceEffect::of(&txn));
            }
        }
        account.current_balance = account
            .initial_balance
            .checked_add_minor(effect.delta_for(account.id))
            .ok_or(BooksError::BalanceOverflow(account.id))?;
        account.updated_at = now;
        account.sync_state = SyncState::Pending;

        self.store.apply(
            StoreBatch::new()
                .put_account(account.clone())
                .enqueue(Mutation::update(
                    MutationPayload::Account(account.clone()),
                    now,
                )),
        )?;

        self.after_mutation();
        Ok(account)
    }

    /// Deletes an account with its transactions.
    ///
    /// Every transaction referencing the account (as source or
    /// transfer target) is removed and its effect reverted on the
    /// surviving accounts. Queued mutations for the deleted records
    /// are dropped in the same batch, so a pending create cannot
    /// resurrect them remotely; the remote delete itself is
    /// best-effort.
    ///
    /// # Errors
    ///
    /// [`BooksError::MissingAccount`] when the account does not exist.
    pub fn delete_account(&self, id: RecordId) -> BooksResult<()> {
        if self.store.get_account(id).is_none() {
            return Err(BooksError::MissingAccount(id));
        }
        let now = self.clock.now();

        let cascaded: Vec<Transaction> = self
            .store
            .transactions()
            .into_iter()
            .filter(|txn| txn.references(id))
            .collect();

        let mut revert = BalanceEffect::empty();
        for txn in &cascaded {
            revert = revert.combined(BalanceEffect::revert_of(txn));
        }

        let mut batch = StoreBatch::new();
        for txn in &cascaded {
            batch = batch.delete_transaction(txn.id).remove_mutations_for(txn.id);
        }
        batch = batch.delete_account(id).remove_mutations_for(id);
        for (account_id, delta) in revert.iter() {
            if account_id == id {
                continue;
            }
            batch = self.adjust_account(batch, account_id, delta, now)?;
        }

        self.store.apply(batch)?;
        debug!(%id, cascaded = cascaded.len(), "account deleted");

        self.after_mutation();
        if self.scheduler.is_online() {
            // The remote schema cascades the account's transactions.
            self.engine.push_delete(RecordTable::Accounts, id);
        }
        Ok(())
    }

    // --- transaction operations ---

    /// Records a transaction and applies its balance effect.
    ///
    /// # Errors
    ///
    /// Validation errors per the ledger rules, missing-record errors
    /// for the account, target, or category, and store errors.
    pub fn create_transaction(&self, draft: TransactionDraft) -> BooksResult<Transaction> {
        let now = self.clock.now();
        let mut txn = Transaction::new(draft.account_id, draft.kind, draft.amount, now)
            .with_description(draft.description)
            .with_date(draft.date);
        if let Some(target) = draft.target_account_id {
            txn = txn.with_target(target);
        }
        if let Some(category) = draft.category_id {
            txn = txn.with_category(category);
        }

        self.validate_transaction(&txn)?;
        let effect = BalanceEffect::of(&txn);

        let mut batch = StoreBatch::new()
            .put_transaction(txn.clone())
            .enqueue(Mutation::create(
                MutationPayload::Transaction(txn.clone()),
                now,
            ));
        batch = self.apply_effect(batch, &effect, now)?;

        self.store.apply(batch)?;
        self.after_mutation();
        Ok(txn)
    }

    /// Edits a transaction: the old effect is reverted and the new one
    /// applied in a single batch, touching up to four accounts when the
    /// edit moves the entry between accounts.
    ///
    /// # Errors
    ///
    /// [`BooksError::MissingTransaction`] when the id is unknown, plus
    /// the same validation errors as [`Books::create_transaction`].
    pub fn update_transaction(&self, mut txn: Transaction) -> BooksResult<Transaction> {
        let old = self
            .store
            .get_transaction(txn.id)
            .ok_or(BooksError::MissingTransaction(txn.id))?;
        self.validate_transaction(&txn)?;

        let now = self.clock.now();
        txn.updated_at = now;
        txn.sync_state = SyncState::Pending;

        let effect = BalanceEffect::edit(&old, &txn);
        let mut batch = StoreBatch::new()
            .put_transaction(txn.clone())
            .enqueue(Mutation::update(
                MutationPayload::Transaction(txn.clone()),
                now,
            ));
        batch = self.apply_effect(batch, &effect, now)?;

        self.store.apply(batch)?;
        self.after_mutation();
        Ok(txn)
    }

    /// Deletes a transaction, reverting its balance effect exactly.
    ///
    /// # Errors
    ///
    /// [`BooksError::MissingTransaction`] when the id is unknown.
    pub fn delete_transaction(&self, id: RecordId) -> BooksResult<()> {
        let old = self
            .store
            .get_transaction(id)
            .ok_or(BooksError::MissingTransaction(id))?;
        let now = self.clock.now();

        let effect = BalanceEffect::revert_of(&old);
        let mut batch = StoreBatch::new()
            .delete_transaction(id)
            .remove_mutations_for(id);
        batch = self.apply_effect(batch, &effect, now)?;

        self.store.apply(batch)?;
        self.after_mutation();
        if self.scheduler.is_online() {
            self.engine.push_delete(RecordTable::Transactions, id);
        }
        Ok(())
    }

    // --- category operations ---

    /// Creates a category and queues it for push.
    ///
    /// # Errors
    ///
    /// Returns a store error when persisting fails.
    pub fn create_category(&self, draft: CategoryDraft) -> BooksResult<Category> {
        let now = self.clock.now();
        let category = Category::new(self.owner, draft.name, draft.kind, draft.color, now);

        self.store.apply(
            StoreBatch::new()
                .put_category(category.clone())
                .enqueue(Mutation::create(
                    MutationPayload::Category(category.clone()),
                    now,
                )),
        )?;

        self.after_mutation();
        Ok(category)
    }

    /// Updates a category.
    ///
    /// # Errors
    ///
    /// [`BooksError::MissingCategory`] when the id is unknown.
    pub fn update_category(&self, mut category: Category) -> BooksResult<Category> {
        if self.store.get_category(category.id).is_none() {
            return Err(BooksError::MissingCategory(category.id));
        }
        let now = self.clock.now();
        category.updated_at = now;
        category.sync_state = SyncState::Pending;

        self.store.apply(
            StoreBatch::new()
                .put_category(category.clone())
                .enqueue(Mutation::update(
                    MutationPayload::Category(category.clone()),
                    now,
                )),
        )?;

        self.after_mutation();
        Ok(category)
    }

    /// Deletes a category. Transactions that referenced it keep their
    /// amounts but lose the categorization, mirroring a set-null
    /// foreign key.
    ///
    /// # Errors
    ///
    /// [`BooksError::MissingCategory`] when the id is unknown.
    pub fn delete_category(&self, id: RecordId) -> BooksResult<()> {
        if self.store.get_category(id).is_none() {
            return Err(BooksError::MissingCategory(id));
        }
        let now = self.clock.now();

        let mut batch = StoreBatch::new().delete_category(id).remove_mutations_for(id);
        for mut txn in self.store.transactions() {
            if txn.category_id == Some(id) {
                txn.category_id = None;
                txn.updated_at = now;
                txn.sync_state = SyncState::Pending;
                batch = batch
                    .enqueue(Mutation::update(
                        MutationPayload::Transaction(txn.clone()),
                        now,
                    ))
                    .put_transaction(txn);
            }
        }

        self.store.apply(batch)?;
        self.after_mutation();
        if self.scheduler.is_online() {
            self.engine.push_delete(RecordTable::Categories, id);
        }
        Ok(())
    }

    // --- internals ---

    fn validate_transaction(&self, txn: &Transaction) -> BooksResult<()> {
        vestry_ledger::validate(txn)?;
        if self.store.get_account(txn.account_id).is_none() {
            return Err(BooksError::MissingAccount(txn.account_id));
        }
        if let Some(target) = txn.target_account_id {
            if self.store.get_account(target).is_none() {
                return Err(BooksError::MissingAccount(target));
            }
        }
        if let Some(category) = txn.category_id {
            if self.store.get_category(category).is_none() {
                return Err(BooksError::MissingCategory(category));
            }
        }
        Ok(())
    }

    /// Folds a balance effect into the batch: every touched account is
    /// rewritten with its new balance, marked pending, and enqueued as
    /// an account update.
    fn apply_effect(
        &self,
        mut batch: StoreBatch,
        effect: &BalanceEffect,
        now: DateTime<Utc>,
    ) -> BooksResult<StoreBatch> {
        for (account_id, delta) in effect.iter() {
            batch = self.adjust_account(batch, account_id, delta, now)?;
        }
        Ok(batch)
    }

    fn adjust_account(
        &self,
        batch: StoreBatch,
        account_id: RecordId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> BooksResult<StoreBatch> {
        let mut account = self
            .store
            .get_account(account_id)
            .ok_or(BooksError::MissingAccount(account_id))?;
        account.current_balance = account
            .current_balance
            .checked_add_minor(delta)
            .ok_or(BooksError::BalanceOverflow(account_id))?;
        account.updated_at = now;
        account.sync_state = SyncState::Pending;
        Ok(batch
            .enqueue(Mutation::update(
                MutationPayload::Account(account.clone()),
                now,
            ))
            .put_account(account))
    }

    fn after_mutation(&self) {
        self.refresh();
        if self.scheduler.is_online() {
            self.scheduler.request_sync();
        }
    }

    fn refresh(&self) {
        let mut accounts = self.store.accounts();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        let mut transactions = self.store.transactions();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        let mut categories = self.store.categories();
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        let mut view = self.view.write();
        view.accounts = accounts;
        view.transactions = transactions;
        view.categories = categories;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;
    use vestry_model::MutationAction;
    use vestry_store::InMemoryBackend;
    use vestry_sync::MockRemote;

    struct TestClock(DateTime<Utc>);

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn offline_books() -> Books {
        let store = Arc::new(LocalStore::open(Box::new(InMemoryBackend::new())).unwrap());
        let owner = PrincipalId::new();
        let clock = Arc::new(TestClock(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()));
        Books::open(
            store,
            Arc::new(MockRemote::authenticated(owner)),
            SyncConfig::new().with_auto_interval(Duration::from_secs(3600)),
            clock,
            owner,
            false,
        )
    }

    fn checking(books: &Books, name: &str, opening: i64) -> Account {
        books
            .create_account(AccountDraft {
                name: name.into(),
                kind: AccountKind::Checking,
                initial_balance: Amount::from_minor(opening),
            })
            .unwrap()
    }

    #[test]
    fn create_account_queues_one_entry() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);

        assert_eq!(account.current_balance, Amount::from_minor(100_000));
        assert_eq!(account.sync_state, SyncState::Pending);
        assert_eq!(books.pending_count(), 1);
        assert_eq!(books.accounts().len(), 1);
    }

    #[test]
    fn expense_moves_balance_and_queues_create() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);

        let txn = books
            .create_transaction(TransactionDraft::new(
                account.id,
                TransactionKind::Expense,
                Amount::from_minor(20_000),
            ))
            .unwrap();

        let account = books.account(account.id).unwrap();
        assert_eq!(account.current_balance, Amount::from_minor(80_000));
        assert_eq!(txn.sync_state, SyncState::Pending);
        assert!(books
            .store
            .pending_mutations()
            .iter()
            .any(|m| m.table() == RecordTable::Transactions
                && m.action == MutationAction::Create
                && m.record_id() == txn.id));
    }

    #[test]
    fn transfer_conserves_total_balance() {
        let books = offline_books();
        let a = checking(&books, "A", 50_000);
        let b = checking(&books, "B", 10_000);

        books
            .create_transaction(
                TransactionDraft::new(a.id, TransactionKind::Transfer, Amount::from_minor(30_000))
                    .with_target(b.id),
            )
            .unwrap();

        assert_eq!(
            books.account(a.id).unwrap().current_balance,
            Amount::from_minor(20_000)
        );
        assert_eq!(
            books.account(b.id).unwrap().current_balance,
            Amount::from_minor(40_000)
        );
        assert_eq!(books.total_balance(), Amount::from_minor(60_000));
    }

    #[test]
    fn transfer_edit_reverts_then_applies() {
        let books = offline_books();
        let a = checking(&books, "A", 50_000);
        let b = checking(&books, "B", 10_000);

        let mut txn = books
            .create_transaction(
                TransactionDraft::new(a.id, TransactionKind::Transfer, Amount::from_minor(30_000))
                    .with_target(b.id),
            )
            .unwrap();

        txn.amount = Amount::from_minor(10_000);
        books.update_transaction(txn).unwrap();

        assert_eq!(
            books.account(a.id).unwrap().current_balance,
            Amount::from_minor(40_000)
        );
        assert_eq!(
            books.account(b.id).unwrap().current_balance,
            Amount::from_minor(20_000)
        );
    }

    #[test]
    fn delete_transaction_is_exact_inverse_of_create() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);

        let txn = books
            .create_transaction(TransactionDraft::new(
                account.id,
                TransactionKind::Income,
                Amount::from_minor(7_500),
            ))
            .unwrap();
        assert_eq!(
            books.account(account.id).unwrap().current_balance,
            Amount::from_minor(107_500)
        );

        books.delete_transaction(txn.id).unwrap();
        assert_eq!(
            books.account(account.id).unwrap().current_balance,
            Amount::from_minor(100_000)
        );
        assert!(books.transaction(txn.id).is_none());
        // The queued create was dropped with the record.
        assert!(books
            .store
            .pending_mutations()
            .iter()
            .all(|m| m.record_id() != txn.id));
    }

    #[test]
    fn edit_round_trip_restores_balances() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);

        let original = books
            .create_transaction(TransactionDraft::new(
                account.id,
                TransactionKind::Expense,
                Amount::from_minor(5_000),
            ))
            .unwrap();
        let before = books.account(account.id).unwrap().current_balance;

        let mut edited = original.clone();
        edited.amount = Amount::from_minor(9_999);
        books.update_transaction(edited).unwrap();

        books.update_transaction(original).unwrap();
        assert_eq!(books.account(account.id).unwrap().current_balance, before);
    }

    #[test]
    fn edit_moving_between_accounts_touches_all_four() {
        let books = offline_books();
        let a = checking(&books, "A", 10_000);
        let b = checking(&books, "B", 10_000);
        let c = checking(&books, "C", 10_000);
        let d = checking(&books, "D", 10_000);

        let mut txn = books
            .create_transaction(
                TransactionDraft::new(a.id, TransactionKind::Transfer, Amount::from_minor(1_000))
                    .with_target(b.id),
            )
            .unwrap();

        txn.account_id = c.id;
        txn.target_account_id = Some(d.id);
        books.update_transaction(txn).unwrap();

        let balance = |id| books.account(id).unwrap().current_balance.minor();
        assert_eq!(balance(a.id), 10_000);
        assert_eq!(balance(b.id), 10_000);
        assert_eq!(balance(c.id), 9_000);
        assert_eq!(balance(d.id), 11_000);
    }

    #[test]
    fn validation_failure_commits_nothing() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);
        let queued_before = books.pending_count();

        let result = books.create_transaction(
            TransactionDraft::new(
                account.id,
                TransactionKind::Transfer,
                Amount::from_minor(1_000),
            ), // no target
        );
        assert!(matches!(result, Err(BooksError::MissingTransferTarget)));

        let result = books.create_transaction(TransactionDraft::new(
            RecordId::new(),
            TransactionKind::Income,
            Amount::from_minor(1_000),
        ));
        assert!(matches!(result, Err(BooksError::MissingAccount(_))));

        assert_eq!(books.pending_count(), queued_before);
        assert!(books.transactions().is_empty());
        assert_eq!(
            books.account(account.id).unwrap().current_balance,
            Amount::from_minor(100_000)
        );
    }

    #[test]
    fn update_account_recomputes_current_balance() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);
        books
            .create_transaction(TransactionDraft::new(
                account.id,
                TransactionKind::Expense,
                Amount::from_minor(30_000),
            ))
            .unwrap();

        let mut edited = books.account(account.id).unwrap();
        edited.initial_balance = Amount::from_minor(200_000);
        let saved = books.update_account(edited).unwrap();

        assert_eq!(saved.current_balance, Amount::from_minor(170_000));
    }

    #[test]
    fn delete_account_cascades_and_reverts_on_survivors() {
        let books = offline_books();
        let a = checking(&books, "A", 50_000);
        let b = checking(&books, "B", 10_000);

        // Transfer out of A and an incoming transfer from B.
        books
            .create_transaction(
                TransactionDraft::new(a.id, TransactionKind::Transfer, Amount::from_minor(20_000))
                    .with_target(b.id),
            )
            .unwrap();
        books
            .create_transaction(
                TransactionDraft::new(b.id, TransactionKind::Transfer, Amount::from_minor(5_000))
                    .with_target(a.id),
            )
            .unwrap();
        assert_eq!(books.account(b.id).unwrap().current_balance.minor(), 25_000);

        books.delete_account(a.id).unwrap();

        assert!(books.account(a.id).is_none());
        assert!(books.transactions().is_empty());
        // B is back to its opening balance once both transfers revert.
        assert_eq!(books.account(b.id).unwrap().current_balance.minor(), 10_000);
        // No queue entry survives for the deleted records.
        assert!(books
            .store
            .pending_mutations()
            .iter()
            .all(|m| m.record_id() != a.id));
    }

    #[test]
    fn delete_category_clears_references() {
        let books = offline_books();
        let account = checking(&books, "General fund", 100_000);
        let category = books
            .create_category(CategoryDraft {
                name: "Flowers".into(),
                kind: CategoryKind::Expense,
                color: "#ff8800".into(),
            })
            .unwrap();

        let txn = books
            .create_transaction(
                TransactionDraft::new(
                    account.id,
                    TransactionKind::Expense,
                    Amount::from_minor(2_500),
                )
                .with_category(category.id),
            )
            .unwrap();

        books.delete_category(category.id).unwrap();

        assert!(books.category(category.id).is_none());
        let txn = books.transaction(txn.id).unwrap();
        assert_eq!(txn.category_id, None);
        assert!(txn.sync_state.is_pending());
    }

    #[test]
    fn missing_record_errors() {
        let books = offline_books();
        assert!(matches!(
            books.delete_account(RecordId::new()),
            Err(BooksError::MissingAccount(_))
        ));
        assert!(matches!(
            books.delete_transaction(RecordId::new()),
            Err(BooksError::MissingTransaction(_))
        ));
        assert!(matches!(
            books.delete_category(RecordId::new()),
            Err(BooksError::MissingCategory(_))
        ));
    }
}
