//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded
    #[error("Failed to load configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// A sink could not be created
    #[error("Failed to build sinks: {0}")]
    SinkCreation(#[from] dispatcher::DispatcherError),

    /// `--payload` is not a JSON document
    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    /// Flush or close of the sinks failed
    #[error("Error during shutdown: {0}")]
    Shutdown(#[from] logger::LoggerError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
