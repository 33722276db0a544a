//! Spec streaming update channel
//!
//! A running job learns about feature-set spec changes from a dedicated
//! topic, and acknowledges the versions it applied on another.

use serde::{Deserialize, Serialize};

use crate::domain::source::KafkaSourceConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecsStreamingUpdateConfig {
    /// Topic carrying feature-set spec updates
    pub source: KafkaSourceConfig,

    /// Topic the job acknowledges applied specs on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<KafkaSourceConfig>,
}

impl SpecsStreamingUpdateConfig {
    pub fn new(source: KafkaSourceConfig) -> Self {
        Self { source, ack: None }
    }
}
