//! Category subcommands.

use clap::Subcommand;
use vestry_core::{Books, CategoryDraft};
use vestry_model::CategoryKind;

/// Category management.
#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Add a category
    Add {
        /// Display name
        name: String,

        /// Category kind (income, expense)
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Display color as a hex string
        #[arg(short, long, default_value = "#607d8b")]
        color: String,
    },

    /// List categories
    List,
}

/// Runs a category subcommand.
pub fn run(books: &Books, command: CategoryCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        CategoryCommand::Add { name, kind, color } => {
            let kind: CategoryKind = kind.parse()?;
            let category = books.create_category(CategoryDraft { name, kind, color })?;
            println!("created category {} ({})", category.name, category.id);
        }
        CategoryCommand::List => {
            for category in books.categories() {
                let origin = if category.is_default() { "default" } else { "custom" };
                println!(
                    "{:<20} {:<8} {:<8} {:<8} {}",
                    category.name, category.kind, category.color, origin, category.id
                );
            }
        }
    }
    Ok(())
}
