//! Transaction subcommands.

use chrono::NaiveDate;
use clap::Subcommand;
use vestry_core::{Books, TransactionDraft};
use vestry_model::{Amount, RecordId, TransactionKind};

/// Transaction entry and listing.
#[derive(Subcommand)]
pub enum TxnCommand {
    /// Record an entry
    Add {
        /// Source account id
        account: String,

        /// Amount, e.g. "25.00"
        amount: String,

        /// Entry kind (income, expense, transfer)
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Transfer target account id
        #[arg(short, long)]
        target: Option<String>,

        /// Category id
        #[arg(short, long)]
        category: Option<String>,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Book date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List entries, newest first
    List {
        /// Restrict to one source account id
        #[arg(short, long)]
        account: Option<String>,
    },
}

/// Runs a transaction subcommand.
pub fn run(books: &Books, command: TxnCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        TxnCommand::Add {
            account,
            amount,
            kind,
            target,
            category,
            description,
            date,
        } => {
            let account: RecordId = account.parse()?;
            let amount: Amount = amount.parse()?;
            let kind: TransactionKind = kind.parse()?;

            let mut draft =
                TransactionDraft::new(account, kind, amount).with_description(description);
            if let Some(target) = target {
                draft = draft.with_target(target.parse()?);
            }
            if let Some(category) = category {
                draft = draft.with_category(category.parse()?);
            }
            if let Some(date) = date {
                draft = draft.with_date(date);
            }

            let txn = books.create_transaction(draft)?;
            println!("recorded {} {} ({})", txn.kind, txn.amount, txn.id);
        }
        TxnCommand::List { account } => {
            let entries = match account {
                Some(account) => books.transactions_for_account(account.parse()?),
                None => books.transactions(),
            };
            for txn in entries {
                println!(
                    "{} {:<8} {:>12}  {:<7} {}  {}",
                    txn.date,
                    txn.kind,
                    txn.amount.to_string(),
                    txn.sync_state,
                    txn.id,
                    txn.description
                );
            }
        }
    }
    Ok(())
}
