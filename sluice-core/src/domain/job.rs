//! Job domain types

use serde::{Deserialize, Serialize};

use crate::domain::feature_set::FeatureSetJobStatus;
use crate::domain::runner::Runner;
use crate::domain::source::Source;
use crate::domain::store::Store;
use crate::error::ModelError;

/// Ingestion job record
///
/// Binds one source to one or more stores for a set of feature sets. Created
/// in memory as `Pending`, then updated with the backend-assigned id and
/// status once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    id: String,

    /// Backend-assigned id, empty until the first successful submission
    #[serde(default)]
    ext_id: String,

    pub runner: Runner,
    pub source: Source,
    pub stores: Vec<Store>,

    #[serde(default)]
    pub feature_set_job_statuses: Vec<FeatureSetJobStatus>,

    pub status: JobStatus,
}

/// Platform-level job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Submitted but not yet confirmed running
    Pending,
    Running,
    Aborting,
    Aborted,
    Error,
    Completed,
    Suspended,
    Unknown,
}

impl JobStatus {
    /// Statuses a job never leaves once reached
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Aborted | JobStatus::Error | JobStatus::Completed
        )
    }

    /// Terminal statuses that mean the job did not succeed
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, JobStatus::Aborted | JobStatus::Error)
    }

    /// Statuses a job record may be created in
    pub fn is_initial(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Unknown)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Aborting => "ABORTING",
            JobStatus::Aborted => "ABORTED",
            JobStatus::Error => "ERROR",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Suspended => "SUSPENDED",
            JobStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

impl Job {
    /// Create a pending job
    pub fn new(
        id: impl Into<String>,
        runner: Runner,
        source: Source,
        stores: Vec<Store>,
        feature_set_job_statuses: Vec<FeatureSetJobStatus>,
    ) -> Result<Self, ModelError> {
        let job = Self {
            id: id.into(),
            ext_id: String::new(),
            runner,
            source,
            stores,
            feature_set_job_statuses,
            status: JobStatus::Pending,
        };
        job.validate()?;
        Ok(job)
    }

    /// Override the initial status (only `Pending` or `Unknown` are accepted)
    pub fn with_status(mut self, status: JobStatus) -> Result<Self, ModelError> {
        if !status.is_initial() {
            return Err(ModelError::InvalidInitialStatus {
                job_id: self.id,
                status,
            });
        }
        self.status = status;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ext_id(&self) -> &str {
        &self.ext_id
    }

    /// Whether the job has been accepted by a backend
    pub fn is_submitted(&self) -> bool {
        !self.ext_id.is_empty()
    }

    /// Record the backend-assigned id
    ///
    /// The id moves from empty to a value once; re-assigning the same value
    /// is a no-op, a different value is rejected.
    pub fn assign_external_id(&mut self, ext_id: impl Into<String>) -> Result<(), ModelError> {
        let ext_id = ext_id.into();
        if ext_id.is_empty() {
            return Err(empty_external_id(&self.id));
        }
        if self.ext_id.is_empty() || self.ext_id == ext_id {
            self.ext_id = ext_id;
            return Ok(());
        }
        Err(ModelError::ExternalIdAlreadyAssigned {
            job_id: self.id.clone(),
            existing: self.ext_id.clone(),
        })
    }

    /// Point the record at the backend job that replaced the previous one
    ///
    /// Only for in-place updates of a submitted job, where some backends
    /// hand out a new id for the replacement.
    pub fn replace_external_id(&mut self, ext_id: impl Into<String>) -> Result<(), ModelError> {
        if self.ext_id.is_empty() {
            return Err(ModelError::InvalidValue(format!(
                "job {} was never submitted",
                self.id
            )));
        }
        let ext_id = ext_id.into();
        if ext_id.is_empty() {
            return Err(empty_external_id(&self.id));
        }
        self.ext_id = ext_id;
        Ok(())
    }

    /// Copy of this job as it was before any submission
    ///
    /// Same id and definition, empty external id, `Pending` status.
    pub fn fresh_copy(&self) -> Self {
        Self {
            ext_id: String::new(),
            status: JobStatus::Pending,
            ..self.clone()
        }
    }

    /// Structural invariants that hold for every job record
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.stores.is_empty() {
            return Err(ModelError::NoStores(self.id.clone()));
        }
        Ok(())
    }
}

fn empty_external_id(job_id: &str) -> ModelError {
    ModelError::InvalidValue(format!("empty external id for job {}", job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_set::FeatureSet;

    fn job() -> Job {
        let source = Source::kafka("servers:9092", "topic");
        let fs = FeatureSet::new("default", "featureSet", source.clone());
        Job::new(
            "job",
            Runner::Dataflow,
            source,
            vec![Store::redis("SERVING", "localhost", 6379)],
            vec![FeatureSetJobStatus::new(fs)],
        )
        .unwrap()
    }

    #[test]
    fn test_new_job_is_pending_and_unsubmitted() {
        let job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.id(), "job");
        assert!(!job.is_submitted());
    }

    #[test]
    fn test_job_requires_a_store() {
        let result = Job::new(
            "job",
            Runner::Direct,
            Source::kafka("servers:9092", "topic"),
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(ModelError::NoStores(id)) if id == "job"));
    }

    #[test]
    fn test_initial_status_restricted() {
        assert!(job().with_status(JobStatus::Unknown).is_ok());
        assert!(matches!(
            job().with_status(JobStatus::Running),
            Err(ModelError::InvalidInitialStatus { .. })
        ));
    }

    #[test]
    fn test_external_id_is_assigned_once() {
        let mut job = job();
        job.assign_external_id("feast-job-0").unwrap();
        assert!(job.is_submitted());
        job.assign_external_id("feast-job-0").unwrap();
        assert!(job.assign_external_id("feast-job-1").is_err());
        assert_eq!(job.ext_id(), "feast-job-0");
    }

    #[test]
    fn test_empty_external_id_is_rejected() {
        let mut job = job();
        assert!(matches!(
            job.assign_external_id(""),
            Err(ModelError::InvalidValue(_))
        ));
        assert!(!job.is_submitted());

        job.assign_external_id("feast-job-0").unwrap();
        assert!(job.replace_external_id("").is_err());
        assert_eq!(job.ext_id(), "feast-job-0");
    }

    #[test]
    fn test_fresh_copy_clears_submission_state() {
        let mut job = job();
        job.assign_external_id("feast-job-0").unwrap();
        job.status = JobStatus::Running;

        let fresh = job.fresh_copy();

        assert_eq!(fresh.id(), "job");
        assert!(!fresh.is_submitted());
        assert_eq!(fresh.status, JobStatus::Pending);
        assert_eq!(fresh.stores, job.stores);
        assert_eq!(job.ext_id(), "feast-job-0");
    }

    #[test]
    fn test_replace_external_id_requires_submission() {
        let mut job = job();
        assert!(job.replace_external_id("feast-job-1").is_err());
        job.assign_external_id("feast-job-0").unwrap();
        job.replace_external_id("feast-job-1").unwrap();
        assert_eq!(job.ext_id(), "feast-job-1");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Error.is_terminal_failure());
        assert!(JobStatus::Aborted.is_terminal_failure());
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Completed.is_terminal_failure());
        assert!(!JobStatus::Aborting.is_terminal());
        assert!(!JobStatus::Suspended.is_terminal());
    }

    #[test]
    fn test_job_serde_uses_camel_case() {
        let json = serde_json::to_value(job()).unwrap();
        assert_eq!(json["extId"], "");
        assert_eq!(json["runner"], "DATAFLOW");
        assert_eq!(json["status"], "PENDING");
        assert!(json["featureSetJobStatuses"].is_array());
    }
}
