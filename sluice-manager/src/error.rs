//! Error types for the job manager

use sluice_core::ModelError;
use sluice_core::domain::job::JobStatus;
use sluice_core::domain::runner::Runner;
use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to an execution backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Backend rejected the request
    #[error("backend rejected request (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// Missing or refused credentials
    #[error("credential error: {0}")]
    Credentials(String),

    /// Local process or filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a backend response
    #[error("failed to parse backend response: {0}")]
    ParseError(String),

    /// The backend does not know the external id
    #[error("job not found on backend: {0}")]
    NotFound(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is an authentication/authorization failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Credentials(_))
            || matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}

/// Failures building the options object
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Nothing to stage; the backend could not run the job
    #[error("no files to stage for job {0}")]
    NoFilesToStage(String),

    /// A configured staging file does not exist
    #[error("file to stage does not exist: {}", .0.display())]
    MissingStagingFile(PathBuf),

    /// The manager's own executable could not be located
    #[error("cannot resolve executable to stage: {0}")]
    CurrentExe(#[source] std::io::Error),

    /// Source, store or spec update config failed to serialize
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure of a job manager operation
///
/// Every operation on [`crate::JobManager`] fails with this type. The variant
/// tells submission failures apart from jobs that died on arrival.
#[derive(Debug, Error)]
pub enum JobExecutionError {
    /// Options could not be built; nothing was submitted
    #[error("cannot build options for job {job_id}: {source}")]
    Options {
        job_id: String,
        #[source]
        source: OptionsError,
    },

    /// The backend round-trip failed
    #[error("failed to submit job {job_id}: {source}")]
    Submission {
        job_id: String,
        #[source]
        source: BackendError,
    },

    /// The backend accepted the job but reports it already failed
    #[error("job {job_id} ({ext_id}) reached terminal state {status} at submission")]
    DeadOnArrival {
        job_id: String,
        ext_id: String,
        status: JobStatus,
    },

    /// Querying the backend for a job's state failed
    #[error("failed to query state of job {job_id} ({ext_id}): {source}")]
    Query {
        job_id: String,
        ext_id: String,
        #[source]
        source: BackendError,
    },

    /// Cancelling a job on the backend failed
    #[error("failed to abort job {job_id} ({ext_id}): {source}")]
    Abort {
        job_id: String,
        ext_id: String,
        #[source]
        source: BackendError,
    },

    /// The job is meant for a different runner than the manager's backend
    #[error("job {job_id} runs on {job_runner}, but this manager submits to {backend_runner}")]
    RunnerMismatch {
        job_id: String,
        job_runner: Runner,
        backend_runner: Runner,
    },

    /// The operation needs a job that was submitted
    #[error("job {0} has not been submitted to a backend")]
    NotSubmitted(String),

    /// The backend assigned an id that conflicts with the job record
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl JobExecutionError {
    pub fn is_dead_on_arrival(&self) -> bool {
        matches!(self, Self::DeadOnArrival { .. })
    }

    pub fn is_submission_failure(&self) -> bool {
        matches!(self, Self::Submission { .. })
    }

    /// External id reported by the backend, when it assigned one
    pub fn ext_id(&self) -> Option<&str> {
        match self {
            Self::DeadOnArrival { ext_id, .. }
            | Self::Query { ext_id, .. }
            | Self::Abort { ext_id, .. } => Some(ext_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors() {
        assert!(BackendError::Credentials("expired".into()).is_auth_error());
        assert!(BackendError::rejected(403, "denied").is_auth_error());
        assert!(!BackendError::rejected(500, "boom").is_auth_error());
    }

    #[test]
    fn test_dead_on_arrival_keeps_ext_id() {
        let err = JobExecutionError::DeadOnArrival {
            job_id: "job".into(),
            ext_id: "feast-job-0".into(),
            status: JobStatus::Error,
        };
        assert!(err.is_dead_on_arrival());
        assert!(!err.is_submission_failure());
        assert_eq!(err.ext_id(), Some("feast-job-0"));
        assert_eq!(
            err.to_string(),
            "job job (feast-job-0) reached terminal state ERROR at submission"
        );
    }

    #[test]
    fn test_submission_failure_exposes_cause() {
        use std::error::Error as _;

        let err = JobExecutionError::Submission {
            job_id: "job".into(),
            source: BackendError::rejected(400, "bad options"),
        };
        assert!(err.is_submission_failure());
        assert_eq!(err.ext_id(), None);
        assert!(err.source().unwrap().to_string().contains("bad options"));
    }
}
