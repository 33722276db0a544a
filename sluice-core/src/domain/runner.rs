//! Runner domain model
//!
//! Identifies the execution backend a job is submitted to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ModelError;

/// Execution backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Runner {
    /// Managed streaming engine
    Dataflow,

    /// Self-hosted streaming engine
    Flink,

    /// Local process on the manager's host
    Direct,
}

impl Runner {
    /// Runner identifier understood by the ingestion program's options parser
    pub fn identifier(&self) -> &'static str {
        match self {
            Runner::Dataflow => "DataflowRunner",
            Runner::Flink => "FlinkRunner",
            Runner::Direct => "DirectRunner",
        }
    }

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Runner::Dataflow => "dataflow",
            Runner::Flink => "flink",
            Runner::Direct => "direct",
        }
    }
}

impl std::fmt::Display for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Runner {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dataflow" | "dataflowrunner" => Ok(Runner::Dataflow),
            "flink" | "flinkrunner" => Ok(Runner::Flink),
            "direct" | "directrunner" => Ok(Runner::Direct),
            other => Err(ModelError::InvalidValue(format!("unknown runner '{}'", other))),
        }
    }
}
