//! Configuration module
//!
//! Loads the job manager configuration and the backend connection settings.

use anyhow::{Context, Result};
use clap::Args;
use sluice_manager::ManagerConfig;
use std::path::Path;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings shared by every job manager this CLI builds
    pub manager: ManagerConfig,
    /// Where to reach each backend
    pub backend: BackendArgs,
}

/// Backend connection settings
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Managed engine API endpoint
    #[arg(long, env = "SLUICE_DATAFLOW_ENDPOINT")]
    pub dataflow_endpoint: Option<String>,

    /// Bearer token for the managed engine API
    #[arg(long, env = "SLUICE_DATAFLOW_TOKEN", hide_env_values = true)]
    pub dataflow_token: Option<String>,

    /// Self-hosted engine REST endpoint
    #[arg(
        long,
        env = "SLUICE_FLINK_ENDPOINT",
        default_value = "http://localhost:8081"
    )]
    pub flink_endpoint: String,

    /// Id of the ingestion jar uploaded to the self-hosted engine
    #[arg(long, env = "SLUICE_FLINK_JAR_ID")]
    pub flink_jar_id: Option<String>,

    /// Ingestion program run by the direct runner
    #[arg(long, env = "SLUICE_DIRECT_PROGRAM", default_value = "sluice-ingest")]
    pub direct_program: String,
}

impl Config {
    /// Read the manager configuration from `path`, or from the environment
    pub fn load(path: Option<&Path>, backend: BackendArgs) -> Result<Self> {
        let manager = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => ManagerConfig::from_env().context("Invalid SLUICE_* environment")?,
        };

        Ok(Self { manager, backend })
    }
}
