//! Backend selection
//!
//! Picks the adapter for a job's runner. Each job manager the CLI builds is
//! bound to one runner for its whole lifetime.

use anyhow::{Result, bail};
use sluice_core::domain::runner::Runner;
use sluice_manager::JobManager;
use sluice_manager::backend::{BackendAdapter, DataflowBackend, DirectBackend, FlinkBackend};
use tracing::debug;

use crate::config::Config;

pub type DynJobManager = JobManager<Box<dyn BackendAdapter>>;

/// Build the adapter for `runner` from the CLI configuration
pub fn backend_for(runner: Runner, config: &Config) -> Result<Box<dyn BackendAdapter>> {
    let args = &config.backend;

    let backend: Box<dyn BackendAdapter> = match runner {
        Runner::Dataflow => {
            let defaults = &config.manager.runner;
            let mut backend = DataflowBackend::new(&defaults.project, &defaults.region);
            if let Some(endpoint) = &args.dataflow_endpoint {
                backend = backend.with_endpoint(endpoint);
            }
            if let Some(token) = &args.dataflow_token {
                backend = backend.with_access_token(token);
            }
            Box::new(backend)
        }
        Runner::Flink => {
            let Some(jar_id) = &args.flink_jar_id else {
                bail!("--flink-jar-id (SLUICE_FLINK_JAR_ID) is required for the flink runner");
            };
            Box::new(FlinkBackend::new(&args.flink_endpoint, jar_id))
        }
        Runner::Direct => Box::new(DirectBackend::new(&args.direct_program).detached()),
    };

    debug!(runner = %runner, "Selected execution backend");
    Ok(backend)
}

/// Build a validated job manager for `runner`
pub fn manager_for(runner: Runner, config: &Config) -> Result<DynJobManager> {
    config.manager.validate_for(runner)?;
    let backend = backend_for(runner, config)?;
    Ok(JobManager::new(config.manager.clone(), backend))
}
