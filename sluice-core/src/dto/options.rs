//! Ingestion job options
//!
//! The options object is what a backend receives at submission: runner
//! placement, the serialized source/stores, the spec update channel, metrics
//! settings and the artifacts to stage. Field names follow the ingestion
//! program's own options parser.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options for one submission of an ingestion job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Runner identifier (e.g. "DataflowRunner")
    pub runner: String,
    pub project: String,
    pub region: String,
    pub zone: String,
    pub network: String,
    pub subnetwork: String,
    pub temp_location: String,

    /// Replace an already-running job in place
    pub update: bool,
    pub app_name: String,
    /// Backend display name; the platform job id
    pub job_name: String,
    pub labels: BTreeMap<String, String>,

    /// One schema-description string per destination store
    pub stores_json: Vec<String>,
    pub source_json: String,
    pub specs_streaming_update_config_json: String,

    /// Fresh per build, never reused across submissions
    pub options_id: String,

    pub dead_letter_table_spec: String,
    pub statsd_host: String,
    pub statsd_port: Option<u16>,
    pub metrics_exporter_type: String,

    pub files_to_stage: Vec<String>,

    pub max_num_workers: Option<u32>,
    pub worker_machine_type: String,
    pub service_account: String,
}

impl ImportOptions {
    /// Render as `--name=value` arguments for the ingestion program
    ///
    /// Empty strings and unset numbers are left out. Every store is passed as
    /// its own `--storesJson` argument; staging files are comma joined.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        push_arg(&mut args, "runner", &self.runner);
        push_arg(&mut args, "project", &self.project);
        push_arg(&mut args, "region", &self.region);
        push_arg(&mut args, "zone", &self.zone);
        push_arg(&mut args, "network", &self.network);
        push_arg(&mut args, "subnetwork", &self.subnetwork);
        push_arg(&mut args, "tempLocation", &self.temp_location);
        args.push(format!("--update={}", self.update));
        push_arg(&mut args, "appName", &self.app_name);
        push_arg(&mut args, "jobName", &self.job_name);

        if !self.labels.is_empty() {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| format!("\"{}\":\"{}\"", k, v))
                .collect::<Vec<_>>()
                .join(",");
            args.push(format!("--labels={{{}}}", labels));
        }

        for store in &self.stores_json {
            push_arg(&mut args, "storesJson", store);
        }
        push_arg(&mut args, "sourceJson", &self.source_json);
        push_arg(
            &mut args,
            "specsStreamingUpdateConfigJson",
            &self.specs_streaming_update_config_json,
        );
        push_arg(&mut args, "optionsId", &self.options_id);
        push_arg(&mut args, "deadLetterTableSpec", &self.dead_letter_table_spec);
        push_arg(&mut args, "statsdHost", &self.statsd_host);
        if let Some(port) = self.statsd_port {
            args.push(format!("--statsdPort={}", port));
        }
        push_arg(&mut args, "metricsExporterType", &self.metrics_exporter_type);
        push_arg(&mut args, "filesToStage", &self.files_to_stage.join(","));

        if let Some(workers) = self.max_num_workers {
            args.push(format!("--maxNumWorkers={}", workers));
        }
        push_arg(&mut args, "workerMachineType", &self.worker_machine_type);
        push_arg(&mut args, "serviceAccount", &self.service_account);

        args
    }
}

fn push_arg(args: &mut Vec<String>, name: &str, value: &str) {
    if !value.is_empty() {
        args.push(format!("--{}={}", name, value));
    }
}
