//! Feature set domain types
//!
//! Feature sets are the schemas a job extracts from its source. Version and
//! status live in the meta block and are managed by the platform, never by
//! the execution backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::source::Source;

/// Feature set definition plus platform metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub spec: FeatureSetSpec,
    #[serde(default)]
    pub meta: FeatureSetMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetSpec {
    pub project: String,
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Field>,
    #[serde(default)]
    pub features: Vec<Field>,
    pub source: Source,
    /// Maximum staleness of a feature row, in seconds (0 = unbounded)
    #[serde(default)]
    pub max_age_seconds: u64,
}

/// Typed column of a feature set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Bytes,
    String,
    Int32,
    Int64,
    Double,
    Float,
    Bool,
    BytesList,
    StringList,
    Int32List,
    Int64List,
    DoubleList,
    FloatList,
    BoolList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: FeatureSetStatus,
}

/// Platform-side lifecycle of a feature set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureSetStatus {
    #[default]
    Pending,
    Ready,
}

impl FeatureSet {
    pub fn new(project: impl Into<String>, name: impl Into<String>, source: Source) -> Self {
        Self {
            spec: FeatureSetSpec {
                project: project.into(),
                name: name.into(),
                entities: Vec::new(),
                features: Vec::new(),
                source,
                max_age_seconds: 0,
            },
            meta: FeatureSetMeta::default(),
        }
    }

    /// `project/name` reference used in logs and lookups
    pub fn reference(&self) -> String {
        format!("{}/{}", self.spec.project, self.spec.name)
    }
}

/// Which feature sets a job is extracting, and how far delivery has got
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetJobStatus {
    pub feature_set: FeatureSet,
    /// Spec version last acknowledged by the running job
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub delivery_status: FeatureSetJobDeliveryStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureSetJobDeliveryStatus {
    #[default]
    InProgress,
    Delivered,
}

impl FeatureSetJobStatus {
    pub fn new(feature_set: FeatureSet) -> Self {
        Self {
            feature_set,
            version: 0,
            delivery_status: FeatureSetJobDeliveryStatus::InProgress,
        }
    }
}
