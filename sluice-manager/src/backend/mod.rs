//! Execution backend adapters
//!
//! One adapter per supported runner. The job manager only sees the
//! [`BackendAdapter`] trait, so tests substitute a fake implementation.

mod dataflow;
mod direct;
mod flink;

pub use dataflow::DataflowBackend;
pub use direct::DirectBackend;
pub use flink::FlinkBackend;

use async_trait::async_trait;
use sluice_core::domain::runner::Runner;
use sluice_core::dto::options::ImportOptions;

use crate::error::BackendError;
use crate::status::NativeState;

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Id the backend assigned to the job
    pub external_id: String,
    /// State observed right after submission
    pub state: NativeState,
}

/// Capability set of an execution backend
///
/// Timeouts and cancellation of the round-trips belong to the adapter; the
/// job manager neither retries nor times out these calls.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Runner this adapter submits to
    fn runner(&self) -> Runner;

    /// Submit a job and report its immediate state
    async fn submit(&self, options: &ImportOptions) -> Result<Submission, BackendError>;

    /// Current state of a previously submitted job
    async fn query_state(&self, external_id: &str) -> Result<NativeState, BackendError>;

    /// Request cancellation of a running job
    async fn cancel(&self, external_id: &str) -> Result<(), BackendError>;
}

#[async_trait]
impl<B: BackendAdapter + ?Sized> BackendAdapter for Box<B> {
    fn runner(&self) -> Runner {
        (**self).runner()
    }

    async fn submit(&self, options: &ImportOptions) -> Result<Submission, BackendError> {
        (**self).submit(options).await
    }

    async fn query_state(&self, external_id: &str) -> Result<NativeState, BackendError> {
        (**self).query_state(external_id).await
    }

    async fn cancel(&self, external_id: &str) -> Result<(), BackendError> {
        (**self).cancel(external_id).await
    }
}

/// Turn a non-success HTTP response into a [`BackendError`]
pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match status.as_u16() {
        401 | 403 => Err(BackendError::Credentials(error_text)),
        404 => Err(BackendError::NotFound(error_text)),
        code => Err(BackendError::rejected(code, error_text)),
    }
}
