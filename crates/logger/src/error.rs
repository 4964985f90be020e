//! Logger error types

use thiserror::Error;

/// Logger-specific errors
#[derive(Debug, Error)]
pub enum LoggerError {
    /// One or more sinks failed during flush or close
    #[error("{operation} failed for {} sink(s): {}", .failures.len(), format_failures(.failures))]
    SinkFailures {
        operation: &'static str,
        failures: Vec<(String, String)>,
    },

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl LoggerError {
    pub fn sink_failures(operation: &'static str, failures: Vec<(String, String)>) -> Self {
        Self::SinkFailures {
            operation,
            failures,
        }
    }
}

fn format_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(sink, message)| format!("{sink}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
