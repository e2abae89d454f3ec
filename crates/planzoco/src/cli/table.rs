//! Table CLI commands.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
pub struct TableCommand {
    #[command(subcommand)]
    pub action: TableAction,
}

#[derive(Debug, Subcommand)]
pub enum TableAction {
    /// Create the table and its indexes if they do not exist.
    Ensure,
}
