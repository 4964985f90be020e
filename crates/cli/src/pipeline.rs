//! Logging pipeline assembled from a blueprint: sinks, registry, formatter.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{LogLevel, LoggingBlueprint};
use dispatcher::{BuiltSink, MetricsSnapshot};
use formatter::{FormatterOptions, JsonFormatter};
use logger::{Logger, SinkRegistry, TracingBridge};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CliError, Result};

/// Load a blueprint, failing early on a missing file
pub fn load_blueprint(path: &Path) -> Result<LoggingBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}

/// Running sinks plus everything needed to create loggers for them
pub struct LoggingPipeline {
    sinks: Vec<BuiltSink>,
    registry: Arc<SinkRegistry>,
    formatter: Arc<JsonFormatter>,
    min_level: LogLevel,
    prefix_payload_type: bool,
}

impl LoggingPipeline {
    /// Spawn every configured sink (requires a tokio runtime)
    pub fn build(blueprint: &LoggingBlueprint) -> Result<Self> {
        let sinks = dispatcher::build_sinks(&blueprint.sinks)?;
        Ok(Self::from_sinks(sinks, blueprint))
    }

    /// Pipeline over already running sinks, configured by `blueprint`
    pub fn from_sinks(sinks: Vec<BuiltSink>, blueprint: &LoggingBlueprint) -> Self {
        if sinks.is_empty() {
            warn!("No sinks configured, records will be discarded");
        }

        let registry = Arc::new(SinkRegistry::with_sinks(
            sinks.iter().map(|built| Arc::clone(&built.sink)),
        ));
        let formatter = Arc::new(JsonFormatter::new(FormatterOptions {
            app_name: blueprint.app_name.clone(),
            environment: blueprint.environment.clone(),
        }));

        Self {
            sinks,
            registry,
            formatter,
            min_level: blueprint.min_level,
            prefix_payload_type: blueprint.prefix_payload_type,
        }
    }

    pub fn logger(&self, context: &str) -> Logger {
        Logger::new(context, Arc::clone(&self.registry), Arc::clone(&self.formatter))
            .with_level(self.min_level)
            .with_prefix_payload_type(self.prefix_payload_type)
    }

    /// Layer forwarding foreign `tracing` events to the same sinks
    pub fn bridge(&self) -> TracingBridge {
        TracingBridge::new(Arc::clone(&self.registry), Arc::clone(&self.formatter))
            .with_level(self.min_level)
    }

    /// Flush every sink, returning how long it took
    pub async fn flush(&self) -> Result<Duration> {
        let started = Instant::now();
        self.registry.flush_all().await?;
        Ok(started.elapsed())
    }

    /// Close every sink; pending events are delivered first
    pub async fn close(&self) -> Result<()> {
        self.registry.close_all().await?;
        info!(sinks = self.sinks.len(), "Pipeline closed");
        Ok(())
    }

    /// Flush then close every sink, returning the flush time.
    ///
    /// Close runs even when the flush fails; the first error is returned.
    pub async fn shutdown(&self) -> Result<Duration> {
        let flushed = self.flush().await;
        if let Err(ref e) = flushed {
            warn!(error = %e, "Flush failed, closing sinks anyway");
        }
        let closed = self.close().await;

        let flush_time = flushed?;
        closed?;
        Ok(flush_time)
    }

    /// Counter snapshot of every sink
    pub fn reports(&self) -> Vec<SinkReport> {
        self.sinks
            .iter()
            .map(|built| SinkReport::new(built.name(), built.metrics.snapshot()))
            .collect()
    }
}

/// Counters of one sink
#[derive(Debug, Clone, Serialize)]
pub struct SinkReport {
    pub name: String,
    pub emitted: u64,
    pub delivered: u64,
    pub failed: u64,
    pub rejected: u64,
    pub purged: u64,
    pub batches: u64,
    pub queued: usize,
}

impl SinkReport {
    pub fn new(name: &str, metrics: MetricsSnapshot) -> Self {
        Self {
            name: name.to_string(),
            emitted: metrics.emitted_count,
            delivered: metrics.delivered_count,
            failed: metrics.failed_count,
            rejected: metrics.rejected_count,
            purged: metrics.purged_count,
            batches: metrics.batch_count,
            queued: metrics.queue_len,
        }
    }

    pub fn print(&self) {
        println!(
            "  - {}: emitted={} delivered={} failed={} rejected={} purged={} batches={} queued={}",
            self.name,
            self.emitted,
            self.delivered,
            self.failed,
            self.rejected,
            self.purged,
            self.batches,
            self.queued
        );
    }
}
