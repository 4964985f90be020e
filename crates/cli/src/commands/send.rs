//! `send` command implementation.

use anyhow::{Context, Result};
use logger::Entry;
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, SendArgs};
use crate::error::CliError;
use crate::pipeline::{load_blueprint, LoggingPipeline};

/// Execute the `send` command
pub async fn run_send(cli: &Cli, args: &SendArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let entry = build_entry(args)?;

    let pipeline = LoggingPipeline::build(&blueprint)?;
    crate::init_logging(cli, args.forward_tracing.then(|| pipeline.bridge()))?;

    info!(
        config = %args.config.display(),
        sinks = pipeline.reports().len(),
        level = %args.level,
        "Sending record"
    );

    pipeline.logger(&args.context).log(args.level, entry);

    let flush_time = pipeline.shutdown().await.context("Pipeline shutdown failed")?;

    info!(flush_ms = flush_time.as_secs_f64() * 1000.0, "Record sent");
    for report in pipeline.reports() {
        report.print();
    }
    Ok(())
}

fn build_entry(args: &SendArgs) -> Result<Entry, CliError> {
    let mut entry = Entry::new().with_message(args.message.as_str());

    if let Some(payload_type) = &args.payload_type {
        entry = entry.with_payload_type(payload_type.as_str());
    }
    if let Some(raw) = &args.payload {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| CliError::invalid_payload(e.to_string()))?;
        entry = entry.with_payload(value);
    }
    Ok(entry)
}
