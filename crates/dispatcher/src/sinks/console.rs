//! ConsoleSink - writes events through tracing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use contracts::{ContractError, EventSink, SerializedEvent, SinkState};
use tracing::{info, instrument};

use crate::metrics::SinkMetrics;

/// Sink that prints each event as one JSON line, for development
pub struct ConsoleSink {
    name: String,
    metrics: Arc<SinkMetrics>,
    closed: AtomicBool,
}

impl ConsoleSink {
    /// Create a new ConsoleSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Arc::new(SinkMetrics::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, event: SerializedEvent) -> bool {
        if self.closed.load(Ordering::Acquire) {
            self.metrics.inc_rejected_count();
            observability::record_event_rejected(&self.name);
            return false;
        }

        self.metrics.inc_emitted_count();
        observability::record_event_emitted(&self.name);
        info!(
            sink = %self.name,
            event = %event.as_str().unwrap_or("<non-utf8 event>"),
            "Log event"
        );
        self.metrics.add_delivered_count(1);
        true
    }

    #[instrument(name = "console_sink_flush", skip(self))]
    async fn flush(&self) -> Result<(), ContractError> {
        // Nothing buffered
        Ok(())
    }

    #[instrument(name = "console_sink_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(sink = %self.name, "ConsoleSink closed");
        }
        Ok(())
    }

    fn state(&self) -> SinkState {
        if self.closed.load(Ordering::Acquire) {
            SinkState::Closed
        } else {
            SinkState::Open
        }
    }
}
