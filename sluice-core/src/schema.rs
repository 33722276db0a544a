//! Canonical schema-description serializer
//!
//! Every descriptor handed to a backend (sources, stores, the spec update
//! channel) is rendered as compact JSON. Field order follows struct
//! declaration order and maps are ordered, so identical values always render
//! to identical strings.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ModelError;

/// Render a descriptor in its canonical schema-description form
pub fn to_schema_json<T: Serialize>(value: &T) -> Result<String, ModelError> {
    Ok(serde_json::to_string(value)?)
}

/// Parse a descriptor back from its schema-description form
pub fn from_schema_json<T: DeserializeOwned>(json: &str) -> Result<T, ModelError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::source::{KafkaSourceConfig, Source};
    use crate::domain::store::{Store, Subscription};

    #[test]
    fn test_source_schema_json_shape() {
        let source = Source::kafka("servers:9092", "topic");
        let json = to_schema_json(&source).unwrap();
        assert_eq!(
            json,
            r#"{"type":"KAFKA","kafkaSourceConfig":{"bootstrapServers":"servers:9092","topic":"topic"}}"#
        );
    }

    #[test]
    fn test_store_schema_json_shape() {
        let store = Store::redis("SERVING", "localhost", 6379)
            .with_subscription(Subscription::new("*", "*"));
        let json = to_schema_json(&store).unwrap();
        assert_eq!(
            json,
            r#"{"name":"SERVING","type":"REDIS","redisConfig":{"host":"localhost","port":6379},"subscriptions":[{"project":"*","name":"*"}]}"#
        );
    }

    #[test]
    fn test_store_round_trip() {
        let store = Store::redis("SERVING", "localhost", 6379)
            .with_subscription(Subscription::new("project", "driver_*"))
            .with_subscription(Subscription::new("project", "driver_test").excluded());
        let json = to_schema_json(&store).unwrap();
        let decoded: Store = from_schema_json(&json).unwrap();
        assert_eq!(decoded, store);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let source = Source::Kafka {
            kafka_source_config: KafkaSourceConfig {
                bootstrap_servers: "a:9092,b:9092".to_string(),
                topic: "events".to_string(),
            },
        };
        assert_eq!(
            to_schema_json(&source).unwrap(),
            to_schema_json(&source.clone()).unwrap()
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result: Result<Source, _> = from_schema_json("{\"type\":\"PUBSUB\"}");
        assert!(matches!(result, Err(ModelError::Schema(_))));
    }
}
