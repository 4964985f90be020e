//! LoggingBlueprint - Config Loader output
//!
//! Describes the complete logging setup: formatter stamping, logger defaults
//! and the list of sinks events are routed to.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::LogLevel;

/// Default maximum number of events per outbound batch
pub const DEFAULT_BATCH_SIZE_LIMIT: usize = 10;

/// Default maximum time an event may sit unsent
pub const DEFAULT_MAX_WAIT_INTERVAL_SECS: f64 = 2.0;

/// Default per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Application name stamped on every event as `app_name`
    #[serde(default)]
    pub app_name: Option<String>,

    /// Deployment environment stamped on every event as `env`
    #[serde(default)]
    pub environment: Option<String>,

    /// Records below this level are dropped before formatting
    #[serde(default)]
    pub min_level: LogLevel,

    /// Prefix non-empty payload types with the logger context
    #[serde(default = "default_prefix_payload_type")]
    pub prefix_payload_type: bool,

    /// Output routing
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

fn default_prefix_payload_type() -> bool {
    true
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink name
    #[validate(length(min = 1, message = "sink name cannot be empty"))]
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Collector endpoint (required for HTTP sink types)
    #[serde(default)]
    #[validate(url(message = "endpoint_uri must be a valid URL"))]
    pub endpoint_uri: Option<String>,

    /// Max events per outbound batch
    #[serde(default = "default_batch_size_limit")]
    #[validate(range(min = 1, message = "batch_size_limit must be >= 1"))]
    pub batch_size_limit: usize,

    /// Max seconds an event may wait before a batch is cut
    #[serde(default = "default_max_wait_interval_secs")]
    #[validate(range(exclusive_min = 0.0, message = "max_wait_interval_secs must be > 0"))]
    pub max_wait_interval_secs: f64,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1, message = "request_timeout_secs must be >= 1"))]
    pub request_timeout_secs: u64,
}

fn default_batch_size_limit() -> usize {
    DEFAULT_BATCH_SIZE_LIMIT
}

fn default_max_wait_interval_secs() -> f64 {
    DEFAULT_MAX_WAIT_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SinkConfig {
    /// HTTP sink config with default batching parameters
    pub fn http(name: impl Into<String>, sink_type: SinkType, endpoint_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type,
            endpoint_uri: Some(endpoint_uri.into()),
            batch_size_limit: DEFAULT_BATCH_SIZE_LIMIT,
            max_wait_interval_secs: DEFAULT_MAX_WAIT_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Console sink config
    pub fn console(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::Console,
            endpoint_uri: None,
            batch_size_limit: DEFAULT_BATCH_SIZE_LIMIT,
            max_wait_interval_secs: DEFAULT_MAX_WAIT_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn max_wait_interval(&self) -> Duration {
        Duration::from_secs_f64(self.max_wait_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// JSON lines through the diagnostic log
    Console,
    /// One POST per event, one at a time
    Simple,
    /// One POST per event, fanned out across a worker pool
    Batching,
    /// One POST per batch with a JSON array body
    Bundling,
}

impl SinkType {
    /// Whether this sink type posts to an HTTP collector
    pub fn requires_endpoint(&self) -> bool {
        !matches!(self, SinkType::Console)
    }
}
