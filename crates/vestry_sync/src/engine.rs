//! The pull-then-push sync engine.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteClient;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vestry_model::{
    Account, Category, Mutation, MutationAction, MutationPayload, PrincipalId, RecordId,
    RecordTable, SyncState, Transaction,
};
use vestry_store::{LocalStore, StoreBatch, StoreResult};

/// The phase a sync cycle is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No cycle running.
    Idle,
    /// Reconciling remote records into the local store.
    Pulling,
    /// Draining the mutation queue to the remote.
    Pushing,
}

impl SyncPhase {
    /// Returns true while a cycle is running.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, SyncPhase::Idle)
    }
}

/// Counters accumulated across sync cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed cycles.
    pub cycles_completed: u64,
    /// Remote records applied locally by pull.
    pub records_pulled: u64,
    /// Queue entries confirmed by push.
    pub mutations_pushed: u64,
    /// Queue entries discarded as invalid (ownership/policy).
    pub mutations_discarded: u64,
    /// When the last successful cycle finished.
    pub last_synced_at: Option<Instant>,
    /// Message of the last cycle-level failure.
    pub last_error: Option<String>,
}

/// Result of one sync cycle.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// True when the trigger found a cycle already running.
    pub skipped: bool,
    /// Remote records applied locally.
    pub pulled: u64,
    /// Queue entries confirmed remotely.
    pub pushed: u64,
    /// Queue entries discarded as invalid.
    pub discarded: u64,
    /// Whether default categories were seeded this cycle.
    pub seeded_defaults: bool,
    /// Wall time of the cycle.
    pub duration: Duration,
}

impl SyncOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            pulled: 0,
            pushed: 0,
            discarded: 0,
            seeded_defaults: false,
            duration: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct PullSummary {
    pulled: u64,
    seeded: bool,
}

#[derive(Default)]
struct PushSummary {
    pushed: u64,
    discarded: u64,
}

/// Record behavior the pull merge needs, implemented by the three
/// synced collections.
trait PullRecord: Clone {
    fn id(&self) -> RecordId;
    fn updated_at(&self) -> DateTime<Utc>;
    fn sync_state(&self) -> SyncState;
    fn mark_synced(&mut self);
}

macro_rules! impl_pull_record {
    ($ty:ty) => {
        impl PullRecord for $ty {
            fn id(&self) -> RecordId {
                self.id
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }

            fn sync_state(&self) -> SyncState {
                self.sync_state
            }

            fn mark_synced(&mut self) {
                self.sync_state = SyncState::Synced;
            }
        }
    };
}

impl_pull_record!(Account);
impl_pull_record!(Transaction);
impl_pull_record!(Category);

/// Orchestrates reconciliation between the local store and the remote.
///
/// One cycle runs pull fully, then push. A re-entrancy guard ensures
/// at most one cycle at a time; a trigger that finds a cycle running
/// returns a skipped [`SyncOutcome`]. Per-entity pull errors and
/// per-entry push errors are logged and never abort the rest of the
/// cycle; only a missing principal fails the cycle as a whole.
pub struct SyncEngine {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteClient>,
    config: SyncConfig,
    in_progress: AtomicBool,
    phase: RwLock<SyncPhase>,
    stats: RwLock<SyncStats>,
}

impl SyncEngine {
    /// Creates a new engine over the given store and remote.
    pub fn new(store: Arc<LocalStore>, remote: Arc<dyn RemoteClient>, config: SyncConfig) -> Self {
        Self {
            store,
            remote,
            config,
            in_progress: AtomicBool::new(false),
            phase: RwLock::new(SyncPhase::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        *self.phase.read()
    }

    /// Returns true while a cycle is running.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Accumulated counters.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Runs one pull-then-push cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Unauthenticated`] when no principal is
    /// signed in, or the transport error from resolving the principal.
    pub fn sync(&self) -> SyncResult<SyncOutcome> {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            debug!("sync cycle already running; trigger skipped");
            return Ok(SyncOutcome::skipped());
        }

        let started = Instant::now();
        let result = self.run_cycle(started);
        *self.phase.write() = SyncPhase::Idle;

        match &result {
            Ok(outcome) => {
                let mut stats = self.stats.write();
                stats.cycles_completed += 1;
                stats.records_pulled += outcome.pulled;
                stats.mutations_pushed += outcome.pushed;
                stats.mutations_discarded += outcome.discarded;
                stats.last_synced_at = Some(Instant::now());
                stats.last_error = None;
            }
            Err(err) => {
                self.stats.write().last_error = Some(err.to_string());
            }
        }

        self.in_progress.store(false, Ordering::SeqCst);
        result
    }

    /// Runs [`SyncEngine::sync`] with the configured retry policy.
    ///
    /// # Errors
    ///
    /// Returns the last error once attempts are exhausted, or
    /// immediately for non-retryable errors.
    pub fn sync_with_retry(&self) -> SyncResult<SyncOutcome> {
        let retry = self.config.retry.clone();
        let mut last_error = None;

        for attempt in 0..retry.max_attempts {
            if attempt > 0 {
                std::thread::sleep(retry.delay_for_attempt(attempt));
            }
            match self.sync() {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable() && attempt + 1 < retry.max_attempts => {
                    debug!(error = %err, attempt, "sync attempt failed; retrying");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| SyncError::transport_fatal("no sync attempts made")))
    }

    /// Best-effort remote delete for the facade's delete paths.
    ///
    /// Deletes bypass the mutation queue: the local delete has already
    /// happened, and a remote failure is logged but not requeued, so
    /// local and remote may diverge until the row changes again.
    pub fn push_delete(&self, table: RecordTable, id: RecordId) {
        let result = match table {
            RecordTable::Accounts => self.remote.delete_account(id),
            RecordTable::Transactions => self.remote.delete_transaction(id),
            RecordTable::Categories => self.remote.delete_category(id),
        };
        match result {
            Ok(()) => debug!(%table, %id, "remote delete applied"),
            Err(err) => warn!(%table, %id, error = %err, "best-effort remote delete failed"),
        }
    }

    fn run_cycle(&self, started: Instant) -> SyncResult<SyncOutcome> {
        let principal = self
            .remote
            .current_principal()?
            .ok_or(SyncError::Unauthenticated)?;

        *self.phase.write() = SyncPhase::Pulling;
        let pull = self.pull(principal);

        *self.phase.write() = SyncPhase::Pushing;
        let push = self.push(principal);

        debug!(
            pulled = pull.pulled,
            pushed = push.pushed,
            discarded = push.discarded,
            "sync cycle complete"
        );

        Ok(SyncOutcome {
            skipped: false,
            pulled: pull.pulled,
            pushed: push.pushed,
            discarded: push.discarded,
            seeded_defaults: pull.seeded,
            duration: started.elapsed(),
        })
    }

    // --- pull phase ---

    fn pull(&self, principal: PrincipalId) -> PullSummary {
        let mut summary = PullSummary::default();

        match self.remote.fetch_categories() {
            Ok(rows) if rows.is_empty() => {
                summary.seeded = self.seed_default_categories();
            }
            Ok(rows) => {
                summary.pulled +=
                    self.merge_pulled(rows, LocalStore::get_category, LocalStore::put_category);
            }
            Err(SyncError::RelationMissing(table)) => {
                warn!(%table, "remote relation missing; falling back to default categories");
                summary.seeded = self.seed_default_categories();
            }
            Err(err) => warn!(error = %err, "category pull failed; continuing cycle"),
        }

        match self.remote.fetch_accounts(principal) {
            Ok(rows) => {
                summary.pulled +=
                    self.merge_pulled(rows, LocalStore::get_account, LocalStore::put_account);
            }
            Err(err) => warn!(error = %err, "account pull failed; continuing cycle"),
        }

        match self.remote.fetch_transactions(principal) {
            Ok(rows) => {
                summary.pulled += self.merge_pulled(
                    rows,
                    LocalStore::get_transaction,
                    LocalStore::put_transaction,
                );
            }
            Err(err) => warn!(error = %err, "transaction pull failed; continuing cycle"),
        }

        summary
    }

    /// Applies the last-writer-wins merge rule to one pulled batch.
    ///
    /// A record absent locally is inserted; a record present and
    /// `Synced` locally is overwritten only when the remote copy is
    /// strictly newer; a locally pending record always wins until its
    /// own push succeeds.
    fn merge_pulled<R: PullRecord>(
        &self,
        rows: Vec<R>,
        get: impl Fn(&LocalStore, RecordId) -> Option<R>,
        put: impl Fn(&LocalStore, R) -> StoreResult<()>,
    ) -> u64 {
        let mut applied = 0;
        for mut row in rows {
            let overwrite = match get(&self.store, row.id()) {
                None => true,
                Some(local) if local.sync_state().is_pending() => false,
                Some(local) => row.updated_at() > local.updated_at(),
            };
            if !overwrite {
                continue;
            }
            row.mark_synced();
            match put(&self.store, row) {
                Ok(()) => applied += 1,
                Err(err) => warn!(error = %err, "failed to store pulled record"),
            }
        }
        applied
    }

    fn seed_default_categories(&self) -> bool {
        if !self.store.categories().is_empty() {
            return false;
        }
        let mut batch = StoreBatch::new();
        for category in Category::defaults(Utc::now()) {
            batch = batch.put_category(category);
        }
        match self.store.apply(batch) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to seed default categories");
                false
            }
        }
    }

    // --- push phase ---

    fn push(&self, principal: PrincipalId) -> PushSummary {
        let mut summary = PushSummary::default();

        for entry in self.store.pending_mutations() {
            if !self.entry_owned_by(&entry, principal) {
                debug!(
                    entry = %entry.id,
                    table = %entry.table(),
                    "discarding foreign mutation without remote call"
                );
                self.drop_entry(entry.id);
                summary.discarded += 1;
                continue;
            }

            match self.dispatch(&entry) {
                Ok(()) => {
                    self.confirm(&entry);
                    summary.pushed += 1;
                }
                Err(SyncError::PermissionDenied(reason)) => {
                    debug!(entry = %entry.id, %reason, "remote rejected mutation; discarding");
                    self.drop_entry(entry.id);
                    summary.discarded += 1;
                }
                Err(err) => {
                    warn!(
                        entry = %entry.id,
                        table = %entry.table(),
                        error = %err,
                        "push failed; entry stays queued for the next cycle"
                    );
                }
            }
        }

        summary
    }

    /// Accounts and categories carry their owner directly; a
    /// transaction is owned through its source account, resolved in
    /// the local store. The account may itself still be unsynced; that
    /// is fine, validation only checks ownership, not remote existence.
    fn entry_owned_by(&self, entry: &Mutation, principal: PrincipalId) -> bool {
        match entry.payload.direct_owner() {
            Some(owner) => owner == principal,
            None => match &entry.payload {
                MutationPayload::Transaction(txn) => self
                    .store
                    .get_account(txn.account_id)
                    .is_some_and(|account| account.owner_id == principal),
                _ => false,
            },
        }
    }

    fn dispatch(&self, entry: &Mutation) -> SyncResult<()> {
        match (&entry.action, &entry.payload) {
            (MutationAction::Create, MutationPayload::Account(account)) => {
                self.remote.insert_account(account)
            }
            (MutationAction::Update, MutationPayload::Account(account)) => {
                self.remote.update_account(account)
            }
            (MutationAction::Delete, MutationPayload::Account(account)) => {
                self.remote.delete_account(account.id)
            }
            (MutationAction::Create, MutationPayload::Transaction(txn)) => {
                self.remote.insert_transaction(txn)
            }
            (MutationAction::Update, MutationPayload::Transaction(txn)) => {
                self.remote.update_transaction(txn)
            }
            (MutationAction::Delete, MutationPayload::Transaction(txn)) => {
                self.remote.delete_transaction(txn.id)
            }
            (MutationAction::Create, MutationPayload::Category(category)) => {
                self.remote.insert_category(category)
            }
            (MutationAction::Update, MutationPayload::Category(category)) => {
                self.remote.update_category(category)
            }
            (MutationAction::Delete, MutationPayload::Category(category)) => {
                self.remote.delete_category(category.id)
            }
        }
    }

    /// Removes the confirmed entry and marks the current local record
    /// `Synced` in one batch.
    ///
    /// The mark resolves against the store's contents at apply time,
    /// under the store lock. Reading the record here and putting it
    /// back would race the facade: a mutation committing between the
    /// read and the apply would be overwritten by the stale snapshot.
    fn confirm(&self, entry: &Mutation) {
        let mut batch = StoreBatch::new().remove_mutation(entry.id);

        if entry.action != MutationAction::Delete {
            batch = batch.mark_synced(entry.table(), entry.record_id());
        }

        if let Err(err) = self.store.apply(batch) {
            warn!(entry = %entry.id, error = %err, "failed to confirm pushed mutation locally");
        }
    }

    fn drop_entry(&self, entry_id: RecordId) {
        if let Err(err) = self.store.remove_mutation(entry_id) {
            warn!(entry = %entry_id, error = %err, "failed to drop invalid queue entry");
        }
    }
}
