//! Error types for the declarative model

use thiserror::Error;

use crate::domain::job::JobStatus;

/// Errors raised while building or serializing model objects
#[derive(Debug, Error)]
pub enum ModelError {
    /// A job must target at least one store
    #[error("job {0} has no destination stores")]
    NoStores(String),

    /// Jobs may only be created as Pending or Unknown
    #[error("job {job_id} cannot be created with status {status}")]
    InvalidInitialStatus {
        /// Job identifier
        job_id: String,
        /// Rejected status
        status: JobStatus,
    },

    /// The backend-assigned id was already set to a different value
    #[error("job {job_id} already has external id {existing}")]
    ExternalIdAlreadyAssigned {
        /// Job identifier
        job_id: String,
        /// The id assigned at first submission
        existing: String,
    },

    /// Schema-description (de)serialization failed
    #[error("schema description error: {0}")]
    Schema(#[from] serde_json::Error),

    /// A value could not be parsed
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
