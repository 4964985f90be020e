//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// The dispatcher task of a sink is gone
    #[error("dispatcher for sink '{sink_name}' stopped unexpectedly")]
    DispatcherStopped { sink_name: String },

    /// Sink error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a dispatcher stopped error
    pub fn dispatcher_stopped(sink_name: impl Into<String>) -> Self {
        Self::DispatcherStopped {
            sink_name: sink_name.into(),
        }
    }
}

impl From<DispatcherError> for contracts::ContractError {
    fn from(err: DispatcherError) -> Self {
        match err {
            DispatcherError::Contract(inner) => inner,
            DispatcherError::SinkCreation { name, message } => Self::sink_write(name, message),
            DispatcherError::DispatcherStopped { sink_name } => {
                Self::sink_write(sink_name, "dispatcher stopped unexpectedly")
            }
        }
    }
}
