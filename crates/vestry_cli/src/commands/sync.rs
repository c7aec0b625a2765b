//! Sync command implementation.

use vestry_core::Books;
use vestry_sync::SyncError;

/// Runs one blocking sync cycle and reports the outcome.
pub fn run(books: &Books) -> Result<(), Box<dyn std::error::Error>> {
    match books.sync_now() {
        Ok(outcome) if outcome.skipped => {
            println!("a sync cycle is already running; nothing to do");
        }
        Ok(outcome) => {
            println!(
                "pulled {}, pushed {}, discarded {} in {:?}",
                outcome.pulled, outcome.pushed, outcome.discarded, outcome.duration
            );
            if outcome.seeded_defaults {
                println!("remote category table missing; seeded local defaults");
            }
        }
        Err(SyncError::Unauthenticated) => {
            println!(
                "no remote signed in; ledger stays local-only ({} mutations queued)",
                books.pending_count()
            );
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
