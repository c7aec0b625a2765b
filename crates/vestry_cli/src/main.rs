//! Vestry CLI
//!
//! Operator tools for a file-backed Vestry ledger.
//!
//! # Commands
//!
//! - `account add|list` - Manage accounts
//! - `category add|list` - Manage categories
//! - `txn add|list` - Record and list bookkeeping entries
//! - `status` - Balances, mutation queue, sync state
//! - `sync` - Run one sync cycle against the configured remote

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vestry_core::{Books, SystemClock};
use vestry_model::PrincipalId;
use vestry_store::{FileBackend, LocalStore};
use vestry_sync::{NullRemote, SyncConfig};

/// Vestry command-line ledger tools.
#[derive(Parser)]
#[command(name = "vestry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the ledger snapshot file
    #[arg(global = true, short, long, default_value = "vestry.books")]
    ledger: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: commands::account::AccountCommand,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: commands::category::CategoryCommand,
    },

    /// Record and list bookkeeping entries
    Txn {
        #[command(subcommand)]
        command: commands::txn::TxnCommand,
    },

    /// Show balances, the mutation queue, and sync state
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: commands::status::OutputFormat,
    },

    /// Run one sync cycle against the configured remote
    Sync,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let backend = FileBackend::open_with_create_dirs(&cli.ledger)?;
    let store = Arc::new(LocalStore::open(Box::new(backend))?);
    let owner = resolve_owner(&store);
    let books = Books::open(
        store,
        Arc::new(NullRemote::new()),
        // The CLI drives sync explicitly; keep the timer out of the way.
        SyncConfig::new().with_auto_interval(Duration::from_secs(3600)),
        Arc::new(SystemClock),
        owner,
        false,
    );
    books.load_data();

    match cli.command {
        Commands::Account { command } => commands::account::run(&books, command)?,
        Commands::Category { command } => commands::category::run(&books, command)?,
        Commands::Txn { command } => commands::txn::run(&books, command)?,
        Commands::Status { format } => commands::status::run(&books, &cli.ledger, format)?,
        Commands::Sync => commands::sync::run(&books)?,
    }

    Ok(())
}

/// Reuses the principal stamped on existing records, so repeated
/// invocations against a never-synced ledger stay consistent.
fn resolve_owner(store: &LocalStore) -> PrincipalId {
    if let Some(account) = store.accounts().first() {
        return account.owner_id;
    }
    if let Some(owner) = store.categories().iter().find_map(|c| c.owner_id) {
        return owner;
    }
    PrincipalId::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_format_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["vestry", "status", "--format", "yaml"]).is_err());
        assert!(Cli::try_parse_from(["vestry", "status", "--format", "json"]).is_ok());
        assert!(Cli::try_parse_from(["vestry", "status"]).is_ok());
    }
}
