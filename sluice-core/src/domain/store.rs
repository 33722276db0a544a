//! Store domain types
//!
//! A store is a destination for ingested features. Its subscriptions decide
//! which feature sets it receives.

use serde::{Deserialize, Serialize};

/// Destination store descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Store {
    pub name: String,

    #[serde(flatten)]
    pub config: StoreConfig,

    /// Project/name glob pairs; `("*", "*")` means every feature set
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// Kind-specific store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreConfig {
    #[serde(rename_all = "camelCase")]
    Redis { redis_config: RedisConfig },

    #[serde(rename_all = "camelCase")]
    RedisCluster {
        redis_cluster_config: RedisClusterConfig,
    },

    #[serde(rename_all = "camelCase")]
    Bigquery { bigquery_config: BigQueryConfig },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisClusterConfig {
    /// Comma separated `host:port` seed nodes
    pub connection_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BigQueryConfig {
    pub project_id: String,
    pub dataset_id: String,
}

/// Feature-set filter attached to a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Project glob
    pub project: String,
    /// Feature-set name glob
    pub name: String,
    /// Excluding subscriptions remove matches from the inclusive ones
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclude: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Subscription {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
            exclude: false,
        }
    }

    /// Turn this subscription into an exclusion
    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// Whether the feature set `project/name` matches both globs
    pub fn matches(&self, project: &str, name: &str) -> bool {
        glob_match(&self.project, project) && glob_match(&self.name, name)
    }
}

impl Store {
    pub fn new(name: impl Into<String>, config: StoreConfig) -> Self {
        Self {
            name: name.into(),
            config,
            subscriptions: Vec::new(),
        }
    }

    /// Shorthand for a single-node Redis store
    pub fn redis(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self::new(
            name,
            StoreConfig::Redis {
                redis_config: RedisConfig {
                    host: host.into(),
                    port,
                },
            },
        )
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Whether this store should receive the given feature set
    ///
    /// A feature set is delivered when at least one inclusive subscription
    /// matches and no excluding subscription does.
    pub fn is_subscribed_to(&self, project: &str, name: &str) -> bool {
        let (exclusions, inclusions): (Vec<_>, Vec<_>) =
            self.subscriptions.iter().partition(|s| s.exclude);

        inclusions.iter().any(|s| s.matches(project, name))
            && !exclusions.iter().any(|s| s.matches(project, name))
    }
}

/// Match `value` against a pattern where `*` stands for any run of characters
fn glob_match(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let value: Vec<char> = value.chars().collect();

    let (mut p, mut v) = (0, 0);
    let mut star: Option<usize> = None;
    let mut backtrack = 0;

    while v < value.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            backtrack = v;
            p += 1;
        } else if p < pattern.len() && pattern[p] == value[v] {
            p += 1;
            v += 1;
        } else if let Some(s) = star {
            p = s + 1;
            backtrack += 1;
            v = backtrack;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
