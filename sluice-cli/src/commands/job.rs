//! Job command handlers
//!
//! Handles starting, inspecting and aborting ingestion jobs. Jobs are read
//! from JSON records; `--save` writes the updated record back in place.

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use sluice_core::domain::job::{Job, JobStatus};
use sluice_core::domain::runner::Runner;
use std::path::{Path, PathBuf};

use super::{load_job, save_job};
use crate::backend::manager_for;
use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a job to its runner
    Start {
        /// Job record (JSON)
        file: PathBuf,

        /// Write the submitted job back to the file
        #[arg(long)]
        save: bool,
    },
    /// Replace a running job with one using the job's current definition
    Update {
        /// Job record (JSON)
        file: PathBuf,

        #[arg(long)]
        save: bool,
    },
    /// Query the job's current status
    Status {
        /// Job record (JSON)
        file: PathBuf,

        #[arg(long)]
        save: bool,
    },
    /// Request cancellation of a running job
    Abort {
        /// Job record (JSON)
        file: PathBuf,

        #[arg(long)]
        save: bool,
    },
    /// Abort the job and submit a fresh copy
    Restart {
        /// Job record (JSON)
        file: PathBuf,

        #[arg(long)]
        save: bool,
    },
}

/// Handle job commands
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Start { file, save } => start_job(config, &file, save).await,
        JobCommands::Update { file, save } => update_job(config, &file, save).await,
        JobCommands::Status { file, save } => job_status(config, &file, save).await,
        JobCommands::Abort { file, save } => abort_job(config, &file, save).await,
        JobCommands::Restart { file, save } => restart_job(config, &file, save).await,
    }
}

async fn start_job(config: &Config, file: &Path, save: bool) -> Result<()> {
    let job = load_job(file)?;
    let manager = manager_for(job.runner, config)?;

    let started = match manager.start_job(&job).await {
        Ok(started) => started,
        Err(e) => {
            println!("{} {}", "✗".red(), e.to_string().red());
            if let Some(ext_id) = e.ext_id() {
                println!("  External ID: {}", ext_id.dimmed());
            }
            return Err(e.into());
        }
    };

    println!("{}", "✓ Job submitted".green().bold());
    println!();
    print_job_details(&started);
    finish(file, &started, save)
}

async fn update_job(config: &Config, file: &Path, save: bool) -> Result<()> {
    let job = load_job(file)?;
    ensure_tracked(&job)?;
    let manager = manager_for(job.runner, config)?;
    let updated = manager.update_job(&job).await?;

    println!("{}", "✓ Job updated".green().bold());
    println!();
    print_job_details(&updated);
    finish(file, &updated, save)
}

async fn job_status(config: &Config, file: &Path, save: bool) -> Result<()> {
    let mut job = load_job(file)?;
    ensure_tracked(&job)?;
    let manager = manager_for(job.runner, config)?;
    let status = manager.get_job_status(&job).await?;

    if status == job.status {
        println!("Status: {}", colorize_status(&status));
    } else {
        println!(
            "Status: {} {} {}",
            colorize_status(&job.status),
            "→".dimmed(),
            colorize_status(&status)
        );
    }

    job.status = status;
    finish(file, &job, save)
}

async fn abort_job(config: &Config, file: &Path, save: bool) -> Result<()> {
    let job = load_job(file)?;
    ensure_tracked(&job)?;
    let manager = manager_for(job.runner, config)?;
    let aborted = manager.abort_job(&job).await?;

    println!(
        "{} Abort requested for {}",
        "✓".green(),
        aborted.ext_id().cyan()
    );
    println!("Status: {}", colorize_status(&aborted.status));
    finish(file, &aborted, save)
}

async fn restart_job(config: &Config, file: &Path, save: bool) -> Result<()> {
    let job = load_job(file)?;
    ensure_tracked(&job)?;
    let manager = manager_for(job.runner, config)?;
    let restarted = manager.restart_job(&job).await?;

    println!("{}", "✓ Job restarted".green().bold());
    println!();
    print_job_details(&restarted);
    finish(file, &restarted, save)
}

/// Direct runner jobs are child processes of the invocation that started
/// them; a later invocation has no handle on them.
fn ensure_tracked(job: &Job) -> Result<()> {
    if job.runner == Runner::Direct && job.is_submitted() {
        bail!(
            "job {} ({}) runs as a local process of the `sluice job start` that launched it \
             and cannot be reached from another invocation",
            job.id(),
            job.ext_id()
        );
    }
    Ok(())
}

fn finish(file: &Path, job: &Job, save: bool) -> Result<()> {
    if save {
        save_job(file, job)?;
        println!("{}", format!("Saved to {}", file.display()).dimmed());
    }
    Ok(())
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id().cyan());
    if job.is_submitted() {
        println!("  External ID: {}", job.ext_id());
    }
    println!("  Runner:      {}", job.runner.identifier());
    println!("  Status:      {}", colorize_status(&job.status));
    println!("  Source:      {}", job.source.topic().dimmed());

    println!("\n{}", "Stores:".bold());
    for store in &job.stores {
        println!("  {} {}", "▸".cyan(), store.name);
    }

    if !job.feature_set_job_statuses.is_empty() {
        println!("\n{}", "Feature Sets:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for fsjs in &job.feature_set_job_statuses {
            println!(
                "  {}  v{}  {:?}",
                fsjs.feature_set.reference(),
                fsjs.version,
                fsjs.delivery_status
            );
        }
        println!("{}", "─".repeat(80).dimmed());
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Error => status_str.red(),
        JobStatus::Aborting | JobStatus::Aborted => status_str.dimmed(),
        JobStatus::Suspended | JobStatus::Unknown => status_str.magenta(),
    }
}
