//! Job Manager
//!
//! Submits ingestion jobs to one execution backend and keeps the job
//! record's external id and status in line with what the backend reports.
//!
//! A manager is immutable after construction and can be shared between
//! tasks (e.g. behind an `Arc`). Callers must not run two operations for the
//! same job id at once; that is not checked here.

use sluice_core::domain::job::{Job, JobStatus};
use sluice_core::domain::runner::Runner;
use tracing::{info, warn};

use crate::backend::BackendAdapter;
use crate::config::ManagerConfig;
use crate::error::{BackendError, JobExecutionError};
use crate::options::OptionsBuilder;
use crate::status::translate;

/// Orchestrates job submission against a single backend
pub struct JobManager<B: BackendAdapter> {
    config: ManagerConfig,
    backend: B,
}

impl<B: BackendAdapter> JobManager<B> {
    pub fn new(config: ManagerConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Runner the underlying backend submits to
    pub fn runner(&self) -> Runner {
        self.backend.runner()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Submit `job` and return it with the backend's id and status
    ///
    /// The submission is not retried. A job the backend reports as failed or
    /// cancelled straight away is an error, not a returned record. `job`
    /// itself is left untouched either way.
    ///
    /// Every call creates a new backend job. Starting a record that already
    /// has an external id returns a record pointing at the new backend job;
    /// the previous one is not touched.
    pub async fn start_job(&self, job: &Job) -> Result<Job, JobExecutionError> {
        self.submit(job, false).await
    }

    /// Replace a running job in place with a fresh submission of `job`
    ///
    /// Backends that keep the job identity return the same external id; when
    /// they assign a new one, the returned record carries it.
    pub async fn update_job(&self, job: &Job) -> Result<Job, JobExecutionError> {
        if !job.is_submitted() {
            return Err(JobExecutionError::NotSubmitted(job.id().to_string()));
        }
        self.submit(job, true).await
    }

    /// Ask the backend for the job's current status
    ///
    /// A job that was never submitted keeps its current status.
    pub async fn get_job_status(&self, job: &Job) -> Result<JobStatus, JobExecutionError> {
        if !job.is_submitted() {
            return Ok(job.status);
        }
        self.check_runner(job)?;

        let state = self
            .backend
            .query_state(job.ext_id())
            .await
            .map_err(|source| JobExecutionError::Query {
                job_id: job.id().to_string(),
                ext_id: job.ext_id().to_string(),
                source,
            })?;

        Ok(translate(&state))
    }

    /// Request cancellation; the returned job is `Aborting`
    pub async fn abort_job(&self, job: &Job) -> Result<Job, JobExecutionError> {
        if !job.is_submitted() {
            return Err(JobExecutionError::NotSubmitted(job.id().to_string()));
        }
        self.check_runner(job)?;

        self.backend
            .cancel(job.ext_id())
            .await
            .map_err(|source| JobExecutionError::Abort {
                job_id: job.id().to_string(),
                ext_id: job.ext_id().to_string(),
                source,
            })?;

        info!(job_id = %job.id(), ext_id = %job.ext_id(), "Job abort requested");

        let mut aborted = job.clone();
        aborted.status = JobStatus::Aborting;
        Ok(aborted)
    }

    /// Abort the job if it is still live, then start it again from scratch
    ///
    /// The returned record has a new external id.
    pub async fn restart_job(&self, job: &Job) -> Result<Job, JobExecutionError> {
        if job.is_submitted() && !job.status.is_terminal() {
            self.abort_job(job).await?;
        }

        self.start_job(job).await
    }

    fn check_runner(&self, job: &Job) -> Result<(), JobExecutionError> {
        let backend_runner = self.backend.runner();
        if job.runner != backend_runner {
            return Err(JobExecutionError::RunnerMismatch {
                job_id: job.id().to_string(),
                job_runner: job.runner,
                backend_runner,
            });
        }
        Ok(())
    }

    async fn submit(&self, job: &Job, update: bool) -> Result<Job, JobExecutionError> {
        self.check_runner(job)?;

        let mut started = if update {
            job.clone()
        } else {
            if job.is_submitted() {
                warn!(
                    job_id = %job.id(),
                    previous_ext_id = %job.ext_id(),
                    "Starting a job that was already submitted"
                );
            }
            job.fresh_copy()
        };

        let builder = OptionsBuilder::new(&self.config);
        let options = if update {
            builder.build_for_update(job)
        } else {
            builder.build(job)
        }
        .map_err(|source| JobExecutionError::Options {
            job_id: job.id().to_string(),
            source,
        })?;

        let submission =
            self.backend
                .submit(&options)
                .await
                .map_err(|source| JobExecutionError::Submission {
                    job_id: job.id().to_string(),
                    source,
                })?;

        if submission.external_id.is_empty() {
            return Err(JobExecutionError::Submission {
                job_id: job.id().to_string(),
                source: BackendError::ParseError("backend returned an empty job id".to_string()),
            });
        }

        let status = translate(&submission.state);
        if status.is_terminal_failure() {
            warn!(
                job_id = %job.id(),
                ext_id = %submission.external_id,
                native_state = %submission.state,
                "Job reached a terminal state at submission"
            );
            return Err(JobExecutionError::DeadOnArrival {
                job_id: job.id().to_string(),
                ext_id: submission.external_id,
                status,
            });
        }

        if update {
            started.replace_external_id(submission.external_id.clone())?;
        } else {
            started.assign_external_id(submission.external_id.clone())?;
        }
        started.status = status;

        info!(
            job_id = %started.id(),
            ext_id = %started.ext_id(),
            status = %started.status,
            runner = %self.backend.runner(),
            "Job submitted"
        );

        Ok(started)
    }
}
