//! SinkRegistry - explicit set of sinks shared by loggers

use std::sync::{Arc, PoisonError, RwLock};

use contracts::{EventSink, SerializedEvent};
use tracing::{debug, error, info, instrument};

use crate::error::LoggerError;

/// Sinks every logger built on this registry writes to.
///
/// Constructed once at process setup and passed to each `Logger`; torn down
/// with `close_all`. Independent registries share nothing.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `sinks`
    pub fn with_sinks(sinks: impl IntoIterator<Item = Arc<dyn EventSink>>) -> Self {
        Self {
            sinks: RwLock::new(sinks.into_iter().collect()),
        }
    }

    pub fn register(&self, sink: Arc<dyn EventSink>) {
        debug!(sink = %sink.name(), "Sink registered");
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    /// Snapshot of the registered sinks
    pub fn sinks(&self) -> Vec<Arc<dyn EventSink>> {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand each event to every sink. Returns the number of accepted emits.
    ///
    /// Emits run against a snapshot, outside the registry lock.
    pub fn dispatch(&self, events: &[SerializedEvent]) -> usize {
        let mut accepted = 0;
        for sink in self.sinks() {
            for event in events {
                if sink.emit(event.clone()) {
                    accepted += 1;
                }
            }
        }
        accepted
    }

    /// Flush every sink; a failing sink does not stop the others
    #[instrument(name = "registry_flush_all", skip(self))]
    pub async fn flush_all(&self) -> Result<(), LoggerError> {
        let mut failures = Vec::new();
        for sink in self.sinks() {
            if let Err(e) = sink.flush().await {
                error!(sink = %sink.name(), error = %e, "Flush failed");
                failures.push((sink.name().to_string(), e.to_string()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::sink_failures("flush", failures))
        }
    }

    /// Close every sink; always attempts all of them
    #[instrument(name = "registry_close_all", skip(self))]
    pub async fn close_all(&self) -> Result<(), LoggerError> {
        let mut failures = Vec::new();
        for sink in self.sinks() {
            if let Err(e) = sink.close().await {
                error!(sink = %sink.name(), error = %e, "Close failed");
                failures.push((sink.name().to_string(), e.to_string()));
            }
        }

        info!(
            sinks = self.len(),
            failed = failures.len(),
            "Sink registry closed"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::sink_failures("close", failures))
        }
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.sinks().iter().map(|s| s.name().to_string()).collect();
        f.debug_struct("SinkRegistry").field("sinks", &names).finish()
    }
}
