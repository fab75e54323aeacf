//! Pipeline configuration types.
//!
//! This module defines `NetworkConfig` and its builder. The configuration is
//! injected into [`BasicNetwork`](crate::BasicNetwork) and its adapters; there
//! is no process-wide debug flag.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Requests slower than this emit a diagnostic record
    #[serde(with = "duration_millis_serde")]
    pub slow_request_threshold: Duration,
    /// Emit the diagnostic record for every request
    pub debug: bool,
    /// Byte budget of the buffer pool built by `BasicNetwork::new`
    pub pool_size_limit: usize,
    /// Upper bound on how long synchronous adapters wait for a callback
    #[serde(with = "duration_option_millis_serde")]
    pub blocking_timeout: Option<Duration>,
    /// Worker threads of an owned dispatch pool
    pub dispatch_threads: usize,
}

/// Builder for `NetworkConfig`
#[derive(Debug, Clone, Default)]
pub struct NetworkConfigBuilder {
    slow_request_threshold: Option<Duration>,
    debug: Option<bool>,
    pool_size_limit: Option<usize>,
    blocking_timeout: Option<Duration>,
    dispatch_threads: Option<usize>,
}

impl NetworkConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.slow_request_threshold = Some(threshold);
        self
    }
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }
    pub fn pool_size_limit(mut self, limit: usize) -> Self {
        self.pool_size_limit = Some(limit);
        self
    }
    pub fn blocking_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.blocking_timeout = timeout;
        self
    }
    pub fn dispatch_threads(mut self, threads: usize) -> Self {
        self.dispatch_threads = Some(threads.max(1));
        self
    }

    /// Build the configuration
    pub fn build(self) -> NetworkConfig {
        let defaults = NetworkConfig::default();
        NetworkConfig {
            slow_request_threshold: self
                .slow_request_threshold
                .unwrap_or(defaults.slow_request_threshold),
            debug: self.debug.unwrap_or(defaults.debug),
            pool_size_limit: self.pool_size_limit.unwrap_or(defaults.pool_size_limit),
            blocking_timeout: self.blocking_timeout,
            dispatch_threads: self.dispatch_threads.unwrap_or(defaults.dispatch_threads),
        }
    }
}

impl NetworkConfig {
    /// Returns a builder for constructing `NetworkConfig`
    pub fn builder() -> NetworkConfigBuilder {
        NetworkConfigBuilder::new()
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            slow_request_threshold: crate::defaults::network::SLOW_REQUEST_THRESHOLD,
            debug: false,
            pool_size_limit: crate::defaults::network::POOL_SIZE_LIMIT,
            blocking_timeout: None,
            dispatch_threads: crate::defaults::network::DISPATCH_THREADS,
        }
    }
}

// Durations are serialized as whole milliseconds
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod duration_option_millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_falls_back_to_defaults() {
        let config = NetworkConfig::builder().debug(true).build();
        assert!(config.debug);
        assert_eq!(config.slow_request_threshold, Duration::from_millis(3000));
        assert_eq!(config.pool_size_limit, 4096);
        assert_eq!(config.blocking_timeout, None);
        assert_eq!(config.dispatch_threads, 1);
    }

    #[test]
    fn serializes_durations_as_millis() {
        let config = NetworkConfig::builder()
            .blocking_timeout(Some(Duration::from_millis(250)))
            .build();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["slow_request_threshold"], 3000);
        assert_eq!(json["blocking_timeout"], 250);

        let back: NetworkConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
