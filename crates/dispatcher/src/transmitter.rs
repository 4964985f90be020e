//! Transmitter - bounded worker pool performing the HTTP POSTs

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, instrument};

use contracts::{ContractError, SerializedEvent, Transport};

/// Hard ceiling on concurrent deliveries per sink
pub const MAX_TRANSMIT_WORKERS: usize = 16;

/// How a batch maps onto HTTP requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// One POST per event, one event at a time
    Simple,
    /// One POST per event, fanned out across the pool
    Batching,
    /// One POST per batch, body is a JSON array of the events
    Bundling,
}

/// Outcome of one `transmit` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Events in the batch
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers batches through a `Transport`.
///
/// Per-event (or per-bundle) failures are logged and counted, never retried
/// and never re-queued. `transmit` returns only after every request of the
/// batch has completed.
pub struct Transmitter<T> {
    sink_name: String,
    endpoint: String,
    mode: DeliveryMode,
    transport: Arc<T>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl<T> Transmitter<T>
where
    T: Transport + Sync + 'static,
{
    /// Pool size is `min(batch_limit, MAX_TRANSMIT_WORKERS)`, or 1 in simple mode
    pub fn new(
        sink_name: impl Into<String>,
        endpoint: impl Into<String>,
        mode: DeliveryMode,
        transport: Arc<T>,
        batch_limit: usize,
    ) -> Self {
        let workers = match mode {
            DeliveryMode::Simple => 1,
            DeliveryMode::Batching | DeliveryMode::Bundling => {
                batch_limit.clamp(1, MAX_TRANSMIT_WORKERS)
            }
        };

        Self {
            sink_name: sink_name.into(),
            endpoint: endpoint.into(),
            mode,
            transport,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver a batch and wait for every request to finish
    #[instrument(
        name = "transmitter_transmit",
        skip(self, batch),
        fields(sink = %self.sink_name, batch_size = batch.len())
    )]
    pub async fn transmit(&self, batch: Vec<SerializedEvent>) -> BatchReport {
        if batch.is_empty() {
            return BatchReport::default();
        }

        let started = Instant::now();
        let report = match self.mode {
            DeliveryMode::Bundling => self.send_bundle(batch).await,
            DeliveryMode::Simple | DeliveryMode::Batching => self.fan_out(batch).await,
        };

        debug!(
            sink = %self.sink_name,
            delivered = report.delivered,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch transmitted"
        );
        report
    }

    /// Stop handing out worker permits; pending `transmit` calls fail fast
    pub fn shutdown(&self) {
        self.permits.close();
    }

    async fn send_bundle(&self, batch: Vec<SerializedEvent>) -> BatchReport {
        let attempted = batch.len();
        let body = SerializedEvent::bundle(&batch);

        let result = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(_permit) => self.transport.post_json(&self.endpoint, body).await,
            Err(_) => Err(ContractError::sink_closed(&self.sink_name)),
        };

        let success = result.is_ok();
        if let Err(e) = result {
            error!(
                sink = %self.sink_name,
                endpoint = %self.endpoint,
                batch_size = attempted,
                error = %e,
                "Bundle delivery failed"
            );
        }
        observability::record_delivery(&self.sink_name, success);

        if success {
            BatchReport {
                attempted,
                delivered: attempted,
                failed: 0,
            }
        } else {
            BatchReport {
                attempted,
                delivered: 0,
                failed: attempted,
            }
        }
    }

    async fn fan_out(&self, batch: Vec<SerializedEvent>) -> BatchReport {
        let mut report = BatchReport {
            attempted: batch.len(),
            ..Default::default()
        };
        let mut in_flight = JoinSet::new();

        for event in batch {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    self.record_failure(&ContractError::sink_closed(&self.sink_name));
                    report.failed += 1;
                    continue;
                }
            };

            let transport = Arc::clone(&self.transport);
            let endpoint = self.endpoint.clone();
            in_flight.spawn(async move {
                let _permit = permit;
                transport.post_json(&endpoint, event.into_bytes()).await
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(Ok(())) => {
                    observability::record_delivery(&self.sink_name, true);
                    report.delivered += 1;
                }
                Ok(Err(e)) => {
                    self.record_failure(&e);
                    report.failed += 1;
                }
                Err(join_err) => {
                    error!(
                        sink = %self.sink_name,
                        error = %join_err,
                        "Delivery task panicked"
                    );
                    observability::record_delivery(&self.sink_name, false);
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn record_failure(&self, e: &ContractError) {
        error!(
            sink = %self.sink_name,
            endpoint = %self.endpoint,
            error = %e,
            "Event delivery failed"
        );
        observability::record_delivery(&self.sink_name, false);
    }
}
