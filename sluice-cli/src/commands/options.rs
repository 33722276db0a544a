//! Options command handler
//!
//! Builds the launch options for a job without contacting any backend.

use anyhow::Result;
use sluice_manager::options::OptionsBuilder;
use std::path::Path;

use super::load_job;
use crate::config::Config;

/// Print the launch options `file`'s job would be submitted with
pub fn print_options(file: &Path, as_args: bool, config: &Config) -> Result<()> {
    let job = load_job(file)?;
    config.manager.validate_for(job.runner)?;
    let options = OptionsBuilder::new(&config.manager).build(&job)?;

    if as_args {
        for arg in options.to_args() {
            println!("{}", arg);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&options)?);
    }
    Ok(())
}
