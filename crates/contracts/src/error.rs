//! Layered error definitions
//!
//! Categorized by source: config / record / serialization / transport / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Record Errors =====
    /// A timestamp without offset/zone information was supplied
    #[error("timestamp '{value}' is naive; an explicit offset is required")]
    NaiveTimestamp { value: String },

    /// A timestamp string could not be parsed at all
    #[error("invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    /// Unknown log level name
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    // ===== Serialization Errors =====
    /// Payload or record could not be serialized
    #[error("serialization error: {message}")]
    Serialization { message: String },

    // ===== Transport Errors =====
    /// HTTP delivery failed (network error or non-2xx status)
    #[error("delivery to '{endpoint}' failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Transport {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink has been closed
    #[error("sink '{sink_name}' is closed")]
    SinkClosed { sink_name: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink closed error
    pub fn sink_closed(sink_name: impl Into<String>) -> Self {
        Self::SinkClosed {
            sink_name: sink_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = ContractError::transport("http://collector/logs", Some(503), "unavailable");
        assert_eq!(
            err.to_string(),
            "delivery to 'http://collector/logs' failed with status 503: unavailable"
        );

        let err = ContractError::transport("http://collector/logs", None, "connection refused");
        assert_eq!(
            err.to_string(),
            "delivery to 'http://collector/logs' failed: connection refused"
        );
    }
}
