//! Execution options builder
//!
//! Turns a job plus the manager's fixed configuration into the options
//! object a backend receives. Apart from resolving the files to stage this
//! does no I/O, and two builds of the same job differ only in `options_id`.

use sluice_core::domain::job::Job;
use sluice_core::dto::options::ImportOptions;
use sluice_core::schema::to_schema_json;
use uuid::Uuid;

use crate::config::{ManagerConfig, StagingConfig};
use crate::error::OptionsError;

/// Application name reported to backends
pub const APP_NAME: &str = "SluiceJobManager";

/// Builds [`ImportOptions`] from a job and the manager configuration
#[derive(Debug, Clone, Copy)]
pub struct OptionsBuilder<'a> {
    config: &'a ManagerConfig,
}

impl<'a> OptionsBuilder<'a> {
    pub fn new(config: &'a ManagerConfig) -> Self {
        Self { config }
    }

    /// Options for the first submission of `job`
    pub fn build(&self, job: &Job) -> Result<ImportOptions, OptionsError> {
        self.build_with_update(job, false)
    }

    /// Options replacing the already-running `job` in place
    pub fn build_for_update(&self, job: &Job) -> Result<ImportOptions, OptionsError> {
        self.build_with_update(job, true)
    }

    fn build_with_update(&self, job: &Job, update: bool) -> Result<ImportOptions, OptionsError> {
        let defaults = &self.config.runner;
        let metrics = &self.config.metrics;

        let stores_json = job
            .stores
            .iter()
            .map(to_schema_json)
            .collect::<Result<Vec<_>, _>>()?;

        let files_to_stage = resolve_files_to_stage(&self.config.staging)?;
        if files_to_stage.is_empty() {
            return Err(OptionsError::NoFilesToStage(job.id().to_string()));
        }

        let (statsd_host, statsd_port, metrics_exporter_type) = if metrics.enabled {
            (
                metrics.host.clone(),
                metrics.port,
                metrics.exporter_type.as_str().to_string(),
            )
        } else {
            (String::new(), None, String::new())
        };

        Ok(ImportOptions {
            runner: job.runner.identifier().to_string(),
            project: defaults.project.clone(),
            region: defaults.region.clone(),
            zone: defaults.zone.clone(),
            network: defaults.network.clone(),
            subnetwork: defaults.subnetwork.clone(),
            temp_location: defaults.temp_location.clone(),
            update,
            app_name: APP_NAME.to_string(),
            job_name: job.id().to_string(),
            labels: defaults.labels.clone(),
            stores_json,
            source_json: to_schema_json(&job.source)?,
            specs_streaming_update_config_json: to_schema_json(
                &self.config.specs_streaming_update,
            )?,
            options_id: Uuid::new_v4().to_string(),
            dead_letter_table_spec: defaults.dead_letter_table_spec.clone().unwrap_or_default(),
            statsd_host,
            statsd_port,
            metrics_exporter_type,
            files_to_stage,
            max_num_workers: defaults.max_num_workers,
            worker_machine_type: defaults.worker_machine_type.clone().unwrap_or_default(),
            service_account: defaults.service_account_email.clone().unwrap_or_default(),
        })
    }
}

/// Files the backend must stage to run the ingestion program
///
/// Configured files must exist. With nothing configured, the running
/// executable is staged.
pub fn resolve_files_to_stage(staging: &StagingConfig) -> Result<Vec<String>, OptionsError> {
    if staging.files.is_empty() {
        let exe = std::env::current_exe().map_err(OptionsError::CurrentExe)?;
        return Ok(vec![exe.display().to_string()]);
    }

    staging
        .files
        .iter()
        .map(|path| {
            if path.exists() {
                Ok(path.display().to_string())
            } else {
                Err(OptionsError::MissingStagingFile(path.clone()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsExporterType;
    use sluice_core::domain::feature_set::{FeatureSet, FeatureSetJobStatus};
    use sluice_core::domain::runner::Runner;
    use sluice_core::domain::source::{KafkaSourceConfig, Source};
    use sluice_core::domain::store::{Store, Subscription};
    use sluice_core::domain::streaming::SpecsStreamingUpdateConfig;
    use sluice_core::schema::from_schema_json;
    use std::path::PathBuf;

    fn config() -> ManagerConfig {
        let mut config = ManagerConfig::new(SpecsStreamingUpdateConfig::new(
            KafkaSourceConfig::new("servers:9092", "specs_topic"),
        ));
        config.runner.project = "project".into();
        config.runner.region = "region".into();
        config.runner.zone = "zone".into();
        config.runner.network = "network".into();
        config.runner.subnetwork = "subnetwork".into();
        config.runner.temp_location = "tempLocation".into();
        config.with_label("orchestrator", "sluice")
    }

    fn job(stores: Vec<Store>) -> Job {
        let source = Source::kafka("servers:9092", "topic");
        let fs = FeatureSet::new("default", "featureSet", source.clone());
        Job::new(
            "job",
            Runner::Dataflow,
            source,
            stores,
            vec![FeatureSetJobStatus::new(fs)],
        )
        .unwrap()
    }

    fn serving() -> Store {
        Store::redis("SERVING", "localhost", 6379).with_subscription(Subscription::new("*", "*"))
    }

    #[test]
    fn test_defaults_are_copied_verbatim() {
        let config = config();
        let options = OptionsBuilder::new(&config).build(&job(vec![serving()])).unwrap();

        assert_eq!(options.runner, "DataflowRunner");
        assert_eq!(options.project, "project");
        assert_eq!(options.region, "region");
        assert_eq!(options.zone, "zone");
        assert_eq!(options.network, "network");
        assert_eq!(options.subnetwork, "subnetwork");
        assert_eq!(options.temp_location, "tempLocation");
        assert_eq!(options.labels, config.runner.labels);
        assert_eq!(options.job_name, "job");
        assert_eq!(options.app_name, APP_NAME);
        assert!(!options.update);
    }

    #[test]
    fn test_source_and_spec_updates_are_serialized() {
        let config = config();
        let job = job(vec![serving()]);
        let options = OptionsBuilder::new(&config).build(&job).unwrap();

        assert_eq!(options.source_json, to_schema_json(&job.source).unwrap());
        assert_eq!(
            options.specs_streaming_update_config_json,
            r#"{"source":{"bootstrapServers":"servers:9092","topic":"specs_topic"}}"#
        );
    }

    #[test]
    fn test_one_stores_json_entry_per_store() {
        let config = config();
        let stores = vec![serving(), Store::redis("ONLINE", "redis", 6380)];
        let options = OptionsBuilder::new(&config).build(&job(stores.clone())).unwrap();

        assert_eq!(options.stores_json.len(), stores.len());
        for (json, store) in options.stores_json.iter().zip(&stores) {
            let decoded: Store = from_schema_json(json).unwrap();
            assert_eq!(&decoded, store);
        }
    }

    #[test]
    fn test_files_to_stage_is_never_empty() {
        let config = config();
        let options = OptionsBuilder::new(&config).build(&job(vec![serving()])).unwrap();
        assert!(!options.files_to_stage.is_empty());
    }

    #[test]
    fn test_missing_staging_file_is_an_error() {
        let mut config = config();
        config.staging.files = vec![PathBuf::from("/nonexistent/ingestion.jar")];
        let result = OptionsBuilder::new(&config).build(&job(vec![serving()]));
        assert!(matches!(result, Err(OptionsError::MissingStagingFile(_))));
    }

    #[test]
    fn test_builds_differ_only_in_options_id() {
        let config = config();
        let job = job(vec![serving()]);
        let builder = OptionsBuilder::new(&config);

        let first = builder.build(&job).unwrap();
        let mut second = builder.build(&job).unwrap();
        assert_ne!(first.options_id, second.options_id);

        second.options_id = first.options_id.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_metrics_disabled_leaves_metrics_options_empty() {
        let mut config = config();
        config.metrics.enabled = false;
        config.metrics.host = "statsd".into();
        config.metrics.port = Some(9125);
        config.runner.dead_letter_table_spec = None;

        let options = OptionsBuilder::new(&config).build(&job(vec![serving()])).unwrap();
        assert_eq!(options.statsd_host, "");
        assert_eq!(options.statsd_port, None);
        assert_eq!(options.metrics_exporter_type, "");
        assert_eq!(options.dead_letter_table_spec, "");
        assert_eq!(options.project, "project");
    }

    #[test]
    fn test_metrics_enabled_populates_metrics_options() {
        let mut config = config();
        config.metrics.enabled = true;
        config.metrics.host = "statsd".into();
        config.metrics.port = Some(9125);
        config.metrics.exporter_type = MetricsExporterType::Prometheus;

        let options = OptionsBuilder::new(&config).build(&job(vec![serving()])).unwrap();
        assert_eq!(options.statsd_host, "statsd");
        assert_eq!(options.statsd_port, Some(9125));
        assert_eq!(options.metrics_exporter_type, "prometheus");
    }

    #[test]
    fn test_update_build_sets_update_flag() {
        let config = config();
        let options = OptionsBuilder::new(&config)
            .build_for_update(&job(vec![serving()]))
            .unwrap();
        assert!(options.update);
    }
}
