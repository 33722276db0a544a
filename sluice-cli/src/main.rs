//! Sluice CLI
//!
//! Command-line interface for submitting ingestion jobs to an execution
//! backend and following their status.

mod backend;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{BackendArgs, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "Sluice ingestion job manager CLI", long_about = None)]
struct Cli {
    /// Manager configuration file (JSON); read from SLUICE_* variables when omitted
    #[arg(long, env = "SLUICE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sluice_manager=info,sluice=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), cli.backend)?;

    handle_command(cli.command, &config).await
}
