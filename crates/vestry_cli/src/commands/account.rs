//! Account subcommands.

use clap::Subcommand;
use vestry_core::{AccountDraft, Books};
use vestry_model::{AccountKind, Amount};

/// Account management.
#[derive(Subcommand)]
pub enum AccountCommand {
    /// Add an account
    Add {
        /// Display name
        name: String,

        /// Account kind (checking, savings, credit, cash)
        #[arg(short, long, default_value = "checking")]
        kind: String,

        /// Opening balance, e.g. "1500.00"
        #[arg(short, long, default_value = "0.00")]
        opening: String,
    },

    /// List accounts with balances
    List,
}

/// Runs an account subcommand.
pub fn run(books: &Books, command: AccountCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        AccountCommand::Add {
            name,
            kind,
            opening,
        } => {
            let kind: AccountKind = kind.parse()?;
            let initial_balance: Amount = opening.parse()?;
            let account = books.create_account(AccountDraft {
                name,
                kind,
                initial_balance,
            })?;
            println!("created account {} ({})", account.name, account.id);
        }
        AccountCommand::List => {
            for account in books.accounts() {
                println!(
                    "{:<24} {:>14}  {:<8} {:<7} {}",
                    account.name,
                    account.current_balance.to_string(),
                    account.kind,
                    account.sync_state,
                    account.id
                );
            }
            println!("total: {}", books.total_balance());
        }
    }
    Ok(())
}
