//! Backend state translation
//!
//! Every runner reports job state in its own vocabulary. This module holds
//! those vocabularies and the one table mapping them onto [`JobStatus`].
//! Logically equivalent states of different backends must map to the same
//! status; text a backend sends that is not listed here becomes `Unknown`.

use serde::{Deserialize, Serialize};
use sluice_core::domain::job::JobStatus;

/// State reported by the managed streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataflowState {
    JobStateUnknown,
    JobStateStopped,
    JobStateRunning,
    JobStateDone,
    JobStateFailed,
    JobStateCancelled,
    JobStateUpdated,
    JobStateDraining,
    JobStateDrained,
    JobStatePending,
    JobStateCancelling,
    JobStateQueued,
    JobStateResourceCleaningUp,
}

/// State reported by the self-hosted streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlinkState {
    Initializing,
    Created,
    Running,
    Failing,
    Failed,
    Cancelling,
    Canceled,
    Finished,
    Restarting,
    Suspended,
    Reconciling,
}

/// State of a locally spawned ingestion process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectState {
    Starting,
    Running,
    Done,
    Failed,
    Cancelled,
}

/// Backend-native job state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeState {
    Dataflow(DataflowState),
    Flink(FlinkState),
    Direct(DirectState),
    /// Text the backend sent that no vocabulary above contains
    Unrecognized(String),
}

impl NativeState {
    /// Parse a managed-engine state string (e.g. `JOB_STATE_RUNNING`)
    pub fn dataflow(raw: &str) -> Self {
        parse(raw).map(Self::Dataflow).unwrap_or_else(|| Self::unrecognized(raw))
    }

    /// Parse a self-hosted-engine state string (e.g. `RUNNING`)
    pub fn flink(raw: &str) -> Self {
        parse(&raw.to_ascii_uppercase())
            .map(Self::Flink)
            .unwrap_or_else(|| Self::unrecognized(raw))
    }

    fn unrecognized(raw: &str) -> Self {
        Self::Unrecognized(raw.to_string())
    }
}

impl std::fmt::Display for NativeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeState::Dataflow(s) => write!(f, "{:?}", s),
            NativeState::Flink(s) => write!(f, "{:?}", s),
            NativeState::Direct(s) => write!(f, "{:?}", s),
            NativeState::Unrecognized(s) => write!(f, "unrecognized({})", s),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

/// Map a backend-native state onto the platform job status
pub fn translate(state: &NativeState) -> JobStatus {
    match state {
        NativeState::Dataflow(s) => match s {
            DataflowState::JobStateUnknown => JobStatus::Unknown,
            DataflowState::JobStateStopped => JobStatus::Suspended,
            DataflowState::JobStateRunning => JobStatus::Running,
            DataflowState::JobStateDone => JobStatus::Completed,
            DataflowState::JobStateFailed => JobStatus::Error,
            DataflowState::JobStateCancelled => JobStatus::Aborted,
            DataflowState::JobStateUpdated => JobStatus::Aborting,
            DataflowState::JobStateDraining => JobStatus::Aborting,
            DataflowState::JobStateDrained => JobStatus::Aborted,
            DataflowState::JobStatePending => JobStatus::Pending,
            DataflowState::JobStateCancelling => JobStatus::Aborting,
            DataflowState::JobStateQueued => JobStatus::Pending,
            DataflowState::JobStateResourceCleaningUp => JobStatus::Aborting,
        },
        NativeState::Flink(s) => match s {
            FlinkState::Initializing => JobStatus::Pending,
            FlinkState::Created => JobStatus::Pending,
            FlinkState::Reconciling => JobStatus::Pending,
            FlinkState::Running => JobStatus::Running,
            FlinkState::Restarting => JobStatus::Running,
            FlinkState::Failing => JobStatus::Error,
            FlinkState::Failed => JobStatus::Error,
            FlinkState::Cancelling => JobStatus::Aborting,
            FlinkState::Canceled => JobStatus::Aborted,
            FlinkState::Finished => JobStatus::Completed,
            FlinkState::Suspended => JobStatus::Suspended,
        },
        NativeState::Direct(s) => match s {
            DirectState::Starting => JobStatus::Pending,
            DirectState::Running => JobStatus::Running,
            DirectState::Done => JobStatus::Completed,
            DirectState::Failed => JobStatus::Error,
            DirectState::Cancelled => JobStatus::Aborted,
        },
        NativeState::Unrecognized(_) => JobStatus::Unknown,
    }
}
