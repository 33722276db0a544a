//! Sluice Job Manager
//!
//! Turns a declarative ingestion job into a running job on an execution
//! backend and maps the backend's state back onto the platform job status.
//!
//! The pieces, leaf first:
//! - [`options`]: builds the backend options object from a job and the
//!   manager's fixed configuration
//! - [`status`]: translates backend-native states into [`JobStatus`]
//! - [`backend`]: the adapter trait plus one adapter per runner
//! - [`manager`]: orchestrates submission and surfaces typed failures
//!
//! # Example
//!
//! ```no_run
//! use sluice_manager::backend::DirectBackend;
//! use sluice_manager::{JobManager, ManagerConfig};
//! # use sluice_core::domain::job::Job;
//! # async fn example(job: Job) -> anyhow::Result<()> {
//! let config = ManagerConfig::from_env()?;
//! let manager = JobManager::new(config, DirectBackend::new("/opt/sluice/ingestion"));
//!
//! let started = manager.start_job(&job).await?;
//! println!("{} is {}", started.ext_id(), started.status);
//! # Ok(())
//! # }
//! ```
//!
//! [`JobStatus`]: sluice_core::domain::job::JobStatus

pub mod backend;
pub mod config;
pub mod error;
pub mod manager;
pub mod options;
pub mod status;

pub use config::{ManagerConfig, MetricsConfig, RunnerConfigOptions, StagingConfig};
pub use error::{BackendError, JobExecutionError, OptionsError};
pub use manager::JobManager;
