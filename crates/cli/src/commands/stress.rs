//! `stress` command implementation.
//!
//! Runs a small calculator workload on concurrent writer tasks: every
//! division is logged as a `MathOperation` warning, every division by zero
//! as a `CalculationError` fatal carrying the captured error.

use std::time::Instant;

use anyhow::{Context, Result};
use logger::{Entry, Logger};
use observability::{DeliverySummary, RunningStats, StatsSummary};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cli::{Cli, StressArgs};
use crate::pipeline::{load_blueprint, LoggingPipeline, SinkReport};

/// Every n-th division of the workload divides by zero
const ZERO_DIVISOR_EVERY: u64 = 7;

#[derive(Debug, Error)]
#[error("attempted to divide {dividend} by zero")]
struct DivideByZero {
    dividend: i64,
}

/// Execute the `stress` command
pub async fn run_stress(cli: &Cli, args: &StressArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let pipeline = LoggingPipeline::build(&blueprint)?;
    crate::init_logging(cli, args.forward_tracing.then(|| pipeline.bridge()))?;

    let writers = args.writers.max(1);
    info!(
        events = args.events,
        writers = writers,
        sinks = pipeline.reports().len(),
        "Starting stress run"
    );

    let started = Instant::now();
    let mut tasks = JoinSet::new();
    for (writer, count) in split_events(args.events, writers).into_iter().enumerate() {
        let logger = pipeline.logger(&args.context);
        tasks.spawn(async move { run_writer(&logger, writer as u64, count) });
    }

    let mut latency = RunningStats::default();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(stats) => latency.merge(&stats),
            Err(e) => warn!(error = %e, "Writer task failed"),
        }
    }

    let flush_time = pipeline.shutdown().await.context("Pipeline shutdown failed")?;
    let elapsed = started.elapsed();
    let reports = pipeline.reports();

    let summary = summarize(&reports, &latency, elapsed.as_secs_f64(), flush_time.as_secs_f64());
    if args.json {
        let output = StressOutput {
            sinks: &reports,
            emitted: summary.events_emitted,
            delivered: summary.events_delivered,
            failed: summary.events_failed,
            rejected: summary.events_rejected,
            batches: summary.batches,
            elapsed_secs: summary.elapsed_secs,
            throughput: summary.throughput(),
            flush_ms: summary.flush_ms,
        };
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize stress result")?;
        println!("{}", json);
    } else {
        println!("\n{}", summary);
        println!("Sinks ({}):", reports.len());
        for report in &reports {
            report.print();
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StressOutput<'a> {
    sinks: &'a [SinkReport],
    emitted: u64,
    delivered: u64,
    failed: u64,
    rejected: u64,
    batches: u64,
    elapsed_secs: f64,
    throughput: f64,
    flush_ms: f64,
}

/// Emit `count` records; returns per-call latency in microseconds
fn run_writer(logger: &Logger, writer: u64, count: u64) -> RunningStats {
    let mut latency = RunningStats::default();

    for i in 0..count {
        let dividend = (writer * 1_000 + i) as i64;
        let divisor = (i % ZERO_DIVISOR_EVERY) as i64;

        let call = Instant::now();
        match divide(dividend, divisor) {
            Ok(result) => logger.warning(Entry::typed(
                "MathOperation",
                json!({"Dividend": dividend, "Div": divisor, "Result": result}),
            )),
            Err(e) => logger.fatal(
                Entry::new()
                    .with_payload_type("CalculationError")
                    .with_message("Outch")
                    .with_payload(json!({"Dividend": dividend, "Writer": writer}))
                    .with_error(&e),
            ),
        }
        latency.push(call.elapsed().as_secs_f64() * 1_000_000.0);
    }

    latency
}

fn divide(dividend: i64, divisor: i64) -> Result<i64, DivideByZero> {
    dividend
        .checked_div(divisor)
        .ok_or(DivideByZero { dividend })
}

/// Split `events` across `writers` as evenly as possible
fn split_events(events: u64, writers: usize) -> Vec<u64> {
    let writers = writers.max(1) as u64;
    let base = events / writers;
    let extra = events % writers;
    (0..writers).map(|w| base + u64::from(w < extra)).collect()
}

fn summarize(
    reports: &[SinkReport],
    latency: &RunningStats,
    elapsed_secs: f64,
    flush_secs: f64,
) -> DeliverySummary {
    DeliverySummary {
        events_emitted: reports.iter().map(|r| r.emitted).sum(),
        events_delivered: reports.iter().map(|r| r.delivered).sum(),
        events_failed: reports.iter().map(|r| r.failed).sum(),
        events_rejected: reports.iter().map(|r| r.rejected).sum(),
        batches: reports.iter().map(|r| r.batches).sum(),
        elapsed_secs,
        emit_latency_us: StatsSummary::from(latency),
        flush_ms: flush_secs * 1000.0,
    }
}
