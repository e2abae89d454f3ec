use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planzoco::cli::{Cli, Commands};
use planzoco::commands::{execute, exit_code};
use planzoco::config::Config;
use planzoco::state::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planzoco=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    tracing::debug!(store = %config.target_display(), "Resolved configuration");

    let output = match cli.command {
        Commands::Table(_) => ensure_table(&config).await?,
        command => execute(command, &build_state(&config).await, cli.format).await?,
    };

    println!("{output}");
    Ok(())
}

#[cfg(feature = "dynamodb")]
async fn build_state(config: &Config) -> AppState {
    AppState::new(planzoco::storage::DynamoDbStore::from_config(config).await)
}

#[cfg(not(feature = "dynamodb"))]
async fn build_state(_config: &Config) -> AppState {
    tracing::warn!("Built without DynamoDB; using a throwaway in-memory store");
    AppState::in_memory()
}

#[cfg(feature = "dynamodb")]
async fn ensure_table(config: &Config) -> Result<String> {
    let store = planzoco::storage::DynamoDbStore::from_config(config).await;
    let created = planzoco::storage::dynamodb::ensure_table(store.client(), store.table_name()).await?;

    Ok(if created {
        format!("Created table {}", config.table_name)
    } else {
        format!("Table {} already exists", config.table_name)
    })
}

#[cfg(not(feature = "dynamodb"))]
async fn ensure_table(_config: &Config) -> Result<String> {
    anyhow::bail!("Built without DynamoDB support")
}
