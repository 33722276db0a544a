//! Managed streaming engine adapter
//!
//! Talks to the engine's REST API. Credential acquisition happens outside
//! this crate; the adapter only attaches the bearer token it is given.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sluice_core::domain::runner::Runner;
use sluice_core::dto::options::ImportOptions;
use std::collections::BTreeMap;
use tracing::debug;

use super::{BackendAdapter, Submission, check_response};
use crate::error::BackendError;
use crate::status::NativeState;

const DEFAULT_ENDPOINT: &str = "https://dataflow.googleapis.com";

/// Adapter for the managed streaming engine
#[derive(Debug, Clone)]
pub struct DataflowBackend {
    /// Base URL of the REST API
    endpoint: String,
    project: String,
    region: String,
    access_token: Option<String>,
    client: Client,
}

/// Job creation request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    job_type: &'static str,
    labels: &'a BTreeMap<String, String>,
    environment: Environment<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Environment<'a> {
    temp_storage_prefix: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    worker_zone: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    network: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    subnetwork: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    service_account_email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_workers: Option<u32>,
    sdk_pipeline_options: PipelineOptions<'a>,
}

#[derive(Debug, Serialize)]
struct PipelineOptions<'a> {
    options: &'a ImportOptions,
}

/// Subset of the engine's job resource the adapter reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResource {
    id: String,
    #[serde(default)]
    current_state: String,
}

impl DataflowBackend {
    /// Create an adapter for the given project and region
    pub fn new(project: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project: project.into(),
            region: region.into(),
            access_token: None,
            client: Client::new(),
        }
    }

    /// Point the adapter at another API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Bearer token attached to every request
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Use a configured HTTP client (timeouts, proxies, TLS)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn jobs_url(&self) -> String {
        format!(
            "{}/v1b3/projects/{}/locations/{}/jobs",
            self.endpoint, self.project, self.region
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BackendAdapter for DataflowBackend {
    fn runner(&self) -> Runner {
        Runner::Dataflow
    }

    async fn submit(&self, options: &ImportOptions) -> Result<Submission, BackendError> {
        let body = CreateJobRequest {
            name: &options.job_name,
            job_type: "JOB_TYPE_STREAMING",
            labels: &options.labels,
            environment: Environment {
                temp_storage_prefix: &options.temp_location,
                worker_zone: &options.zone,
                network: &options.network,
                subnetwork: &options.subnetwork,
                service_account_email: &options.service_account,
                max_workers: options.max_num_workers,
                sdk_pipeline_options: PipelineOptions { options },
            },
        };

        debug!(job_name = %options.job_name, "Creating job on managed engine");

        let response = self
            .authorize(self.client.post(self.jobs_url()))
            .json(&body)
            .send()
            .await?;

        let job: JobResource = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::ParseError(format!("invalid job resource: {}", e)))?;

        Ok(Submission {
            external_id: job.id,
            state: NativeState::dataflow(&job.current_state),
        })
    }

    async fn query_state(&self, external_id: &str) -> Result<NativeState, BackendError> {
        let url = format!("{}/{}", self.jobs_url(), external_id);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("view", "JOB_VIEW_SUMMARY")])
            .send()
            .await?;

        let job: JobResource = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::ParseError(format!("invalid job resource: {}", e)))?;

        Ok(NativeState::dataflow(&job.current_state))
    }

    async fn cancel(&self, external_id: &str) -> Result<(), BackendError> {
        let url = format!("{}/{}", self.jobs_url(), external_id);
        let response = self
            .authorize(self.client.put(&url))
            .json(&serde_json::json!({ "requestedState": "JOB_STATE_CANCELLED" }))
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }
}
