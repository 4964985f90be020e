//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::LogLevel;
use std::path::PathBuf;

/// logship - structured log shipping to HTTP collectors
#[derive(Parser, Debug)]
#[command(
    name = "logship",
    author,
    version,
    about = "Structured JSON logging with batched HTTP delivery",
    long_about = "Formats log records as JSON events and ships them to the sinks of a \n\
                  logging configuration: console, or HTTP collectors with simple, \n\
                  batching or bundling delivery."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGSHIP_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGSHIP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus exporter port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "LOGSHIP_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit a single record through every configured sink
    Send(SendArgs),

    /// Drive concurrent writers against the configured sinks
    Stress(StressArgs),

    /// Validate configuration file without sending anything
    Validate(ValidateArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "logging.toml",
        env = "LOGSHIP_CONFIG"
    )]
    pub config: PathBuf,

    /// Record level (debug, info, warning, error, fatal)
    #[arg(short, long, default_value = "info", env = "LOGSHIP_LEVEL")]
    pub level: LogLevel,

    /// Logger context
    #[arg(long, default_value = "logship", env = "LOGSHIP_CONTEXT")]
    pub context: String,

    /// Payload type name
    #[arg(long)]
    pub payload_type: Option<String>,

    /// Payload as a JSON document
    #[arg(long)]
    pub payload: Option<String>,

    /// Human-readable message
    #[arg(short, long, default_value = "")]
    pub message: String,

    /// Also forward this process's own diagnostics to the sinks
    #[arg(long)]
    pub forward_tracing: bool,
}

/// Arguments for the `stress` command
#[derive(Parser, Debug, Clone)]
pub struct StressArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "logging.toml",
        env = "LOGSHIP_CONFIG"
    )]
    pub config: PathBuf,

    /// Total number of records to emit
    #[arg(short, long, default_value = "1000", env = "LOGSHIP_STRESS_EVENTS")]
    pub events: u64,

    /// Number of concurrent writer tasks
    #[arg(short, long, default_value = "4", env = "LOGSHIP_STRESS_WRITERS")]
    pub writers: usize,

    /// Logger context
    #[arg(long, default_value = "Calc", env = "LOGSHIP_CONTEXT")]
    pub context: String,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Also forward this process's own diagnostics to the sinks
    #[arg(long)]
    pub forward_tracing: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(
        short,
        long,
        default_value = "logging.toml",
        env = "LOGSHIP_CONFIG"
    )]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
