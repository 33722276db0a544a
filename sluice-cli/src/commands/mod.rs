//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod options;

pub use job::JobCommands;

use anyhow::{Context, Result};
use clap::Subcommand;
use sluice_core::domain::job::Job;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job lifecycle on the execution backend
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Print the launch options a job would be submitted with
    Options {
        /// Job record (JSON)
        file: PathBuf,

        /// Print as command-line arguments instead of JSON
        #[arg(long)]
        args: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// Result indicating success or failure
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Options { file, args } => options::print_options(&file, args, config),
    }
}

/// Read and validate a job record
pub(crate) fn load_job(path: &Path) -> Result<Job> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let job: Job = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid job file {}", path.display()))?;
    job.validate()?;
    Ok(job)
}

/// Write a job record back, pretty-printed
pub(crate) fn save_job(path: &Path, job: &Job) -> Result<()> {
    let raw = serde_json::to_string_pretty(job)?;
    std::fs::write(path, raw + "\n")
        .with_context(|| format!("Failed to write job file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::domain::job::JobStatus;
    use sluice_core::domain::runner::Runner;
    use sluice_core::domain::source::Source;
    use sluice_core::domain::store::Store;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sluice-cli-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_job_file_round_trip() {
        let job = Job::new(
            "job",
            Runner::Direct,
            Source::kafka("servers:9092", "topic"),
            vec![Store::redis("SERVING", "localhost", 6379)],
            vec![],
        )
        .unwrap();
        let path = temp_path("round-trip");

        save_job(&path, &job).unwrap();
        let loaded = load_job(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, job);
        assert_eq!(loaded.status, JobStatus::Pending);
    }

    #[test]
    fn test_load_job_rejects_missing_stores() {
        let path = temp_path("no-stores");
        std::fs::write(
            &path,
            r#"{"id":"job","runner":"DIRECT","source":{"type":"KAFKA","kafkaSourceConfig":{"bootstrapServers":"s:9092","topic":"t"}},"stores":[],"status":"PENDING"}"#,
        )
        .unwrap();

        let result = load_job(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_load_job_missing_file() {
        assert!(load_job(Path::new("/nonexistent/job.json")).is_err());
    }
}
