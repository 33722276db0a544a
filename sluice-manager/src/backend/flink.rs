//! Self-hosted streaming engine adapter
//!
//! The ingestion program is uploaded to the engine ahead of time; submission
//! runs that uploaded jar with the options rendered as program arguments.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sluice_core::domain::runner::Runner;
use sluice_core::dto::options::ImportOptions;
use tracing::{debug, warn};

use super::{BackendAdapter, Submission, check_response};
use crate::error::BackendError;
use crate::status::{FlinkState, NativeState};

/// Adapter for the self-hosted streaming engine
#[derive(Debug, Clone)]
pub struct FlinkBackend {
    /// Base URL of the engine's REST API (e.g. "http://localhost:8081")
    endpoint: String,
    /// Id of the uploaded ingestion jar
    jar_id: String,
    entry_class: Option<String>,
    parallelism: Option<u32>,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunJarRequest<'a> {
    program_args_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallelism: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RunJarResponse {
    jobid: String,
}

#[derive(Debug, Deserialize)]
struct JobDetails {
    state: String,
}

impl FlinkBackend {
    pub fn new(endpoint: impl Into<String>, jar_id: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            jar_id: jar_id.into(),
            entry_class: None,
            parallelism: None,
            client: Client::new(),
        }
    }

    /// Main class to run when the jar has none in its manifest
    pub fn with_entry_class(mut self, entry_class: impl Into<String>) -> Self {
        self.entry_class = Some(entry_class.into());
        self
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Use a configured HTTP client (timeouts, proxies, TLS)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn job_state(&self, job_id: &str) -> Result<NativeState, BackendError> {
        let url = format!("{}/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        let details: JobDetails = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::ParseError(format!("invalid job details: {}", e)))?;

        Ok(NativeState::flink(&details.state))
    }
}

#[async_trait]
impl BackendAdapter for FlinkBackend {
    fn runner(&self) -> Runner {
        Runner::Flink
    }

    async fn submit(&self, options: &ImportOptions) -> Result<Submission, BackendError> {
        let url = format!("{}/jars/{}/run", self.endpoint, self.jar_id);
        let body = RunJarRequest {
            program_args_list: options.to_args(),
            entry_class: self.entry_class.as_deref(),
            parallelism: self.parallelism,
        };

        debug!(job_name = %options.job_name, jar_id = %self.jar_id, "Running ingestion jar");

        let response = self.client.post(&url).json(&body).send().await?;
        let run: RunJarResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::ParseError(format!("invalid run response: {}", e)))?;

        // The job already exists at this point; keep its id
        let state = match self.job_state(&run.jobid).await {
            Ok(state) => state,
            Err(e) => {
                warn!(job_id = %run.jobid, error = %e, "State lookup after run failed");
                NativeState::Flink(FlinkState::Initializing)
            }
        };

        Ok(Submission {
            external_id: run.jobid,
            state,
        })
    }

    async fn query_state(&self, external_id: &str) -> Result<NativeState, BackendError> {
        self.job_state(external_id).await
    }

    async fn cancel(&self, external_id: &str) -> Result<(), BackendError> {
        let url = format!("{}/jobs/{}", self.endpoint, external_id);
        let response = self
            .client
            .patch(&url)
            .query(&[("mode", "cancel")])
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }
}
