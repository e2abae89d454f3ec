//! CLI command definitions.

pub mod events;
pub mod options;
pub mod questions;
pub mod recovery;
pub mod table;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Config, DEFAULT_REGION, DEFAULT_TABLE_NAME};

/// Plan events, ask questions, and vote on options.
#[derive(Debug, Parser)]
#[command(name = "planzoco")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// DynamoDB table name.
    #[arg(long, env = "DYNAMODB_TABLE", default_value = DEFAULT_TABLE_NAME)]
    pub table: String,

    /// AWS region.
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// DynamoDB endpoint URL, for a local DynamoDB.
    #[arg(long, env = "DYNAMODB_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Store configuration from the parsed flags and their environment fallbacks.
    pub fn config(&self) -> Config {
        Config {
            table_name: self.table.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Event management.
    Events(events::EventsCommand),
    /// Question management.
    Questions(questions::QuestionsCommand),
    /// Option management and voting.
    Options(options::OptionsCommand),
    /// Table provisioning.
    Table(table::TableCommand),
    /// Interrupted cascading deletes.
    Recovery(recovery::RecoveryCommand),
}
