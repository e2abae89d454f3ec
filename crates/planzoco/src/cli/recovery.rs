//! Recovery CLI commands.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
pub struct RecoveryCommand {
    #[command(subcommand)]
    pub action: RecoveryAction,
}

#[derive(Debug, Subcommand)]
pub enum RecoveryAction {
    /// List events and questions whose deletion was interrupted.
    List,
    /// Finish every interrupted deletion.
    Resume,
}
