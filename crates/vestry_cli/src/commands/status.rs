//! Status command implementation.

use clap::ValueEnum;
use serde::Serialize;
use std::path::Path;
use vestry_core::Books;

/// How the status report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Ledger status report.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Ledger snapshot path.
    pub ledger: String,
    /// Whether the facade considers itself online.
    pub online: bool,
    /// Per-account balances.
    pub accounts: Vec<AccountStatus>,
    /// Sum of all current balances.
    pub total_balance: String,
    /// Records not yet confirmed remotely.
    pub pending_records: usize,
    /// Queued, unpushed mutations in FIFO order.
    pub queue: Vec<QueueEntry>,
}

/// One account row in the report.
#[derive(Debug, Serialize)]
pub struct AccountStatus {
    /// Account id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Account kind.
    pub kind: String,
    /// Current balance.
    pub balance: String,
    /// Reconciliation state.
    pub sync_state: String,
}

/// One mutation queue row in the report.
#[derive(Debug, Serialize)]
pub struct QueueEntry {
    /// Target table.
    pub table: String,
    /// Create, update, or delete.
    pub action: String,
    /// Affected record.
    pub record_id: String,
    /// When the mutation was queued.
    pub queued_at: String,
}

/// Runs the status command.
pub fn run(
    books: &Books,
    ledger: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let accounts = books.accounts();
    let transactions = books.transactions();
    let categories = books.categories();
    let pending_records = accounts
        .iter()
        .filter(|a| a.sync_state.is_pending())
        .count()
        + transactions
            .iter()
            .filter(|t| t.sync_state.is_pending())
            .count()
        + categories
            .iter()
            .filter(|c| c.sync_state.is_pending())
            .count();

    let report = StatusReport {
        ledger: ledger.display().to_string(),
        online: books.is_online(),
        accounts: accounts
            .iter()
            .map(|account| AccountStatus {
                id: account.id.to_string(),
                name: account.name.clone(),
                kind: account.kind.to_string(),
                balance: account.current_balance.to_string(),
                sync_state: account.sync_state.to_string(),
            })
            .collect(),
        total_balance: books.total_balance().to_string(),
        pending_records,
        queue: books
            .pending_mutations()
            .iter()
            .map(|entry| QueueEntry {
                table: entry.table().to_string(),
                action: entry.action.to_string(),
                record_id: entry.record_id().to_string(),
                queued_at: entry.queued_at.to_rfc3339(),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &StatusReport) {
    println!("ledger:  {}", report.ledger);
    println!("online:  {}", report.online);
    println!();
    println!("accounts:");
    for account in &report.accounts {
        println!(
            "  {:<24} {:>14}  {:<8} {}",
            account.name, account.balance, account.kind, account.sync_state
        );
    }
    println!("  total: {}", report.total_balance);
    println!();
    println!("pending records: {}", report.pending_records);
    if report.queue.is_empty() {
        println!("mutation queue:  empty");
    } else {
        println!("mutation queue:  {} entries", report.queue.len());
        for entry in &report.queue {
            println!(
                "  {:<12} {:<6} {}  ({})",
                entry.table, entry.action, entry.record_id, entry.queued_at
            );
        }
    }
}
