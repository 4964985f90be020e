//! # logship CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - One-shot record sending through the configured sinks
//! - A concurrent load run with delivery statistics

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use logger::TracingBridge;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_send, run_stress, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // send / stress initialise logging once their sinks exist
    let result = match &cli.command {
        Commands::Send(args) => run_send(&cli, args).await,
        Commands::Stress(args) => run_stress(&cli, args).await,
        Commands::Validate(args) => init_logging(&cli, None).and_then(|()| run_validate(args)),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize diagnostics, optionally forwarding them to the sinks too
pub(crate) fn init_logging(cli: &Cli, bridge: Option<TracingBridge>) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_layer(
        ObservabilityConfig {
            log_format: cli.log_format.into(),
            metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
            default_log_level: default_log_level.to_string(),
        },
        bridge,
    )?;

    info!(version = env!("CARGO_PKG_VERSION"), "logship starting");
    Ok(())
}
