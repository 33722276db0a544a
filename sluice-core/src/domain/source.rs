//! Source domain types

use serde::{Deserialize, Serialize};

/// Inbound event stream a job reads from
///
/// Immutable once attached to a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// Message-queue topic
    #[serde(rename_all = "camelCase")]
    Kafka {
        kafka_source_config: KafkaSourceConfig,
    },
}

/// Connection settings for a Kafka topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaSourceConfig {
    /// Comma separated `host:port` list
    pub bootstrap_servers: String,
    pub topic: String,
}

impl KafkaSourceConfig {
    pub fn new(bootstrap_servers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            topic: topic.into(),
        }
    }
}

impl Source {
    /// Shorthand for a Kafka source
    pub fn kafka(bootstrap_servers: impl Into<String>, topic: impl Into<String>) -> Self {
        Source::Kafka {
            kafka_source_config: KafkaSourceConfig::new(bootstrap_servers, topic),
        }
    }

    /// Topic name, whatever the source kind
    pub fn topic(&self) -> &str {
        match self {
            Source::Kafka {
                kafka_source_config,
            } => &kafka_source_config.topic,
        }
    }
}
