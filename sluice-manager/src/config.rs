//! Job manager configuration
//!
//! Everything a job manager needs besides the job itself: runner defaults,
//! metrics settings, the spec update channel and the artifacts to stage.
//! The value is fixed at construction and never re-read.

use serde::{Deserialize, Serialize};
use sluice_core::domain::runner::Runner;
use sluice_core::domain::source::KafkaSourceConfig;
use sluice_core::domain::streaming::SpecsStreamingUpdateConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;

const DEFAULT_SPECS_TOPIC: &str = "sluice-feature-set-specs";
const DEFAULT_SPECS_ACK_TOPIC: &str = "sluice-feature-set-specs-ack";
const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";

/// Complete job manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerConfig {
    #[serde(default)]
    pub runner: RunnerConfigOptions,

    #[serde(default)]
    pub metrics: MetricsConfig,

    pub specs_streaming_update: SpecsStreamingUpdateConfig,

    #[serde(default)]
    pub staging: StagingConfig,
}

/// Runner-level defaults copied into every options object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunnerConfigOptions {
    pub project: String,
    pub region: String,
    pub zone: String,
    pub network: String,
    pub subnetwork: String,
    /// Scratch storage for the backend (e.g. a bucket prefix)
    pub temp_location: String,
    pub labels: BTreeMap<String, String>,

    pub max_num_workers: Option<u32>,
    pub worker_machine_type: Option<String>,
    pub service_account_email: Option<String>,

    /// Table receiving rows that failed validation
    pub dead_letter_table_spec: Option<String>,
}

/// Metrics settings passed through to the ingestion job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub host: String,
    pub port: Option<u16>,
    pub exporter_type: MetricsExporterType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsExporterType {
    #[default]
    Statsd,
    Prometheus,
}

impl MetricsExporterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricsExporterType::Statsd => "statsd",
            MetricsExporterType::Prometheus => "prometheus",
        }
    }
}

impl std::str::FromStr for MetricsExporterType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "statsd" => Ok(MetricsExporterType::Statsd),
            "prometheus" => Ok(MetricsExporterType::Prometheus),
            other => anyhow::bail!("unknown metrics exporter '{}'", other),
        }
    }
}

/// Artifacts the backend must receive to run the ingestion program
///
/// When `files` is empty the manager stages its own executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StagingConfig {
    pub files: Vec<PathBuf>,
}

impl ManagerConfig {
    /// Creates a configuration with empty runner defaults and metrics disabled
    pub fn new(specs_streaming_update: SpecsStreamingUpdateConfig) -> Self {
        Self {
            runner: RunnerConfigOptions::default(),
            metrics: MetricsConfig::default(),
            specs_streaming_update,
            staging: StagingConfig::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - SLUICE_PROJECT, SLUICE_REGION, SLUICE_ZONE
    /// - SLUICE_NETWORK, SLUICE_SUBNETWORK, SLUICE_TEMP_LOCATION
    /// - SLUICE_LABELS (comma separated `key=value` pairs)
    /// - SLUICE_MAX_NUM_WORKERS, SLUICE_WORKER_MACHINE_TYPE, SLUICE_SERVICE_ACCOUNT
    /// - SLUICE_DEAD_LETTER_TABLE_SPEC
    /// - SLUICE_METRICS_ENABLED (default: false), SLUICE_METRICS_HOST,
    ///   SLUICE_METRICS_PORT, SLUICE_METRICS_EXPORTER (statsd|prometheus)
    /// - SLUICE_SPECS_BOOTSTRAP_SERVERS (default: localhost:9092)
    /// - SLUICE_SPECS_TOPIC, SLUICE_SPECS_ACK_TOPIC
    /// - SLUICE_FILES_TO_STAGE (comma separated paths)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ManagerConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let labels = match var("SLUICE_LABELS") {
            Some(raw) => parse_labels(&raw)?,
            None => BTreeMap::new(),
        };

        let max_num_workers = var("SLUICE_MAX_NUM_WORKERS")
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("SLUICE_MAX_NUM_WORKERS is not a number: {}", e))
            })
            .transpose()?;

        let runner = RunnerConfigOptions {
            project: var("SLUICE_PROJECT").unwrap_or_default(),
            region: var("SLUICE_REGION").unwrap_or_default(),
            zone: var("SLUICE_ZONE").unwrap_or_default(),
            network: var("SLUICE_NETWORK").unwrap_or_default(),
            subnetwork: var("SLUICE_SUBNETWORK").unwrap_or_default(),
            temp_location: var("SLUICE_TEMP_LOCATION").unwrap_or_default(),
            labels,
            max_num_workers,
            worker_machine_type: var("SLUICE_WORKER_MACHINE_TYPE"),
            service_account_email: var("SLUICE_SERVICE_ACCOUNT"),
            dead_letter_table_spec: var("SLUICE_DEAD_LETTER_TABLE_SPEC"),
        };

        let metrics = MetricsConfig {
            enabled: var("SLUICE_METRICS_ENABLED")
                .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            host: var("SLUICE_METRICS_HOST").unwrap_or_default(),
            port: var("SLUICE_METRICS_PORT")
                .map(|s| {
                    s.parse::<u16>()
                        .map_err(|e| anyhow::anyhow!("SLUICE_METRICS_PORT is not a port: {}", e))
                })
                .transpose()?,
            exporter_type: var("SLUICE_METRICS_EXPORTER")
                .map(|s| s.parse::<MetricsExporterType>())
                .transpose()?
                .unwrap_or_default(),
        };

        let servers =
            var("SLUICE_SPECS_BOOTSTRAP_SERVERS").unwrap_or_else(|| DEFAULT_BOOTSTRAP_SERVERS.into());
        let specs_streaming_update = SpecsStreamingUpdateConfig {
            source: KafkaSourceConfig::new(
                servers.clone(),
                var("SLUICE_SPECS_TOPIC").unwrap_or_else(|| DEFAULT_SPECS_TOPIC.into()),
            ),
            ack: Some(KafkaSourceConfig::new(
                servers,
                var("SLUICE_SPECS_ACK_TOPIC").unwrap_or_else(|| DEFAULT_SPECS_ACK_TOPIC.into()),
            )),
        };

        let staging = StagingConfig {
            files: var("SLUICE_FILES_TO_STAGE")
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(PathBuf::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(Self {
            runner,
            metrics,
            specs_streaming_update,
            staging,
        })
    }

    /// Adds a label copied onto every submitted job
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runner.labels.insert(key.into(), value.into());
        self
    }

    /// Validates the configuration for the given runner
    pub fn validate_for(&self, runner: Runner) -> anyhow::Result<()> {
        if runner == Runner::Dataflow {
            if self.runner.project.is_empty() {
                anyhow::bail!("project cannot be empty for the dataflow runner");
            }
            if self.runner.region.is_empty() {
                anyhow::bail!("region cannot be empty for the dataflow runner");
            }
            if self.runner.temp_location.is_empty() {
                anyhow::bail!("temp_location cannot be empty for the dataflow runner");
            }
        }

        if self.metrics.enabled && self.metrics.host.is_empty() {
            anyhow::bail!("metrics host must be set when metrics are enabled");
        }

        let specs = &self.specs_streaming_update.source;
        if specs.topic.is_empty() || specs.bootstrap_servers.is_empty() {
            anyhow::bail!("spec update topic and bootstrap servers cannot be empty");
        }

        if self.runner.labels.keys().any(|k| k.is_empty()) {
            anyhow::bail!("label keys cannot be empty");
        }

        Ok(())
    }
}

/// Parses `key=value,key2=value2`
fn parse_labels(raw: &str) -> anyhow::Result<BTreeMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("label '{}' is not in key=value form", pair))?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
