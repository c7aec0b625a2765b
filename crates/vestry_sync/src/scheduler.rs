//! Background scheduler driving periodic and on-demand sync cycles.

use crate::engine::SyncEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

enum Command {
    SyncNow,
    Shutdown,
}

/// Owns the background sync loop.
///
/// A single worker thread waits on a command channel with the periodic
/// interval as its timeout, so timer ticks and explicit triggers feed
/// through the same path. Pending triggers are drained before each
/// cycle, so a burst of requests produces one cycle instead of a
/// queue of redundant ones. Cycles are suppressed while offline; going
/// back online requests a cycle immediately.
///
/// Dropping the scheduler shuts the worker down and joins it.
pub struct SyncScheduler {
    tx: Sender<Command>,
    online: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Starts the background loop over the given engine.
    ///
    /// The periodic interval comes from the engine's configuration.
    #[must_use]
    pub fn start(engine: Arc<SyncEngine>, initially_online: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        let online = Arc::new(AtomicBool::new(initially_online));
        let interval = engine.config().auto_interval;

        let worker_online = Arc::clone(&online);
        let worker = std::thread::Builder::new()
            .name("vestry-sync".into())
            .spawn(move || run_loop(engine, rx, worker_online, interval))
            .ok();
        if worker.is_none() {
            warn!("failed to spawn sync worker thread; background sync disabled");
        }

        Self { tx, online, worker }
    }

    /// Whether the scheduler currently considers itself online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Flips the online flag.
    ///
    /// The flag takes effect immediately for any cycle about to start.
    /// Coming back online also requests a cycle so queued offline work
    /// drains without waiting for the next timer tick.
    pub fn set_online(&self, online: bool) {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            info!("connectivity restored; requesting sync");
            self.request_sync();
        } else if !online && was_online {
            info!("connectivity lost; sync cycles suspended");
        }
    }

    /// Requests a sync cycle as soon as the worker is free.
    pub fn request_sync(&self) {
        if self.tx.send(Command::SyncNow).is_err() {
            warn!("sync worker is gone; trigger dropped");
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_loop(
    engine: Arc<SyncEngine>,
    rx: Receiver<Command>,
    online: Arc<AtomicBool>,
    interval: Duration,
) {
    debug!(?interval, "sync worker started");
    loop {
        match rx.recv_timeout(interval) {
            Ok(Command::Shutdown) => break,
            Ok(Command::SyncNow) | Err(RecvTimeoutError::Timeout) => {
                // Coalesce any triggers that piled up while waiting.
                loop {
                    match rx.try_recv() {
                        Ok(Command::Shutdown) => {
                            debug!("sync worker stopped");
                            return;
                        }
                        Ok(Command::SyncNow) => continue,
                        Err(_) => break,
                    }
                }
                if !online.load(Ordering::SeqCst) {
                    debug!("offline; skipping sync cycle");
                    continue;
                }
                match engine.sync() {
                    Ok(outcome) if outcome.skipped => {}
                    Ok(outcome) => debug!(
                        pulled = outcome.pulled,
                        pushed = outcome.pushed,
                        discarded = outcome.discarded,
                        "background sync cycle complete"
                    ),
                    Err(err) => warn!(error = %err, "background sync cycle failed"),
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("sync worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::remote::{MockRemote, RemoteClient};
    use chrono::Utc;
    use vestry_model::{Account, AccountKind, Amount, PrincipalId, SyncState};
    use vestry_store::{InMemoryBackend, LocalStore};

    fn engine_with_remote(interval: Duration) -> (Arc<SyncEngine>, Arc<MockRemote>, Arc<LocalStore>) {
        let owner = PrincipalId::new();
        let remote = Arc::new(MockRemote::authenticated(owner));
        let store = Arc::new(LocalStore::open(Box::new(InMemoryBackend::new())).unwrap());
        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&store),
            Arc::clone(&remote) as Arc<dyn crate::RemoteClient>,
            SyncConfig::new().with_auto_interval(interval),
        ));
        (engine, remote, store)
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached within 2s");
    }

    #[test]
    fn requested_sync_runs_a_cycle() {
        let (engine, _remote, _store) = engine_with_remote(Duration::from_secs(3600));
        let scheduler = SyncScheduler::start(Arc::clone(&engine), true);

        scheduler.request_sync();
        wait_for(|| engine.stats().cycles_completed >= 1);
    }

    #[test]
    fn periodic_tick_runs_cycles() {
        let (engine, _remote, _store) = engine_with_remote(Duration::from_millis(20));
        let _scheduler = SyncScheduler::start(Arc::clone(&engine), true);

        wait_for(|| engine.stats().cycles_completed >= 2);
    }

    #[test]
    fn offline_suppresses_cycles_until_reconnect() {
        let (engine, _remote, _store) = engine_with_remote(Duration::from_millis(20));
        let scheduler = SyncScheduler::start(Arc::clone(&engine), false);
        assert!(!scheduler.is_online());

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(engine.stats().cycles_completed, 0);

        scheduler.set_online(true);
        wait_for(|| engine.stats().cycles_completed >= 1);
    }

    #[test]
    fn reconnect_drains_offline_work() {
        let (engine, remote, store) = engine_with_remote(Duration::from_secs(3600));
        let scheduler = SyncScheduler::start(Arc::clone(&engine), false);

        let owner = remote.current_principal().unwrap().unwrap();
        let account = Account::new(
            owner,
            "Offline account",
            AccountKind::Checking,
            Amount::ZERO,
            Utc::now(),
        );
        store
            .apply(
                vestry_store::StoreBatch::new()
                    .put_account(account.clone())
                    .enqueue(vestry_model::Mutation::create(
                        vestry_model::MutationPayload::Account(account.clone()),
                        Utc::now(),
                    )),
            )
            .unwrap();

        scheduler.set_online(true);
        wait_for(|| store.pending_count() == 0);
        assert!(remote.remote_account(account.id).is_some());
        assert_eq!(
            store.get_account(account.id).unwrap().sync_state,
            SyncState::Synced
        );
    }

    #[test]
    fn drop_joins_the_worker() {
        let (engine, _remote, _store) = engine_with_remote(Duration::from_millis(20));
        let scheduler = SyncScheduler::start(engine, true);
        drop(scheduler);
    }
}
