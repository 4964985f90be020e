//! DeliverySink - queue + dispatcher + transmitter behind the EventSink interface

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{ContractError, EventSink, SerializedEvent, SinkState, Transport};

use crate::dispatcher::{Command, Dispatcher};
use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;
use crate::policy::BatchPolicy;
use crate::queue::DeliveryQueue;
use crate::transmitter::{DeliveryMode, Transmitter};

/// Parameters of one delivery sink
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub name: String,
    pub endpoint: String,
    pub mode: DeliveryMode,
    pub batch_size_limit: usize,
    pub max_wait_interval: Duration,
}

impl DeliveryConfig {
    /// Size limit and wait interval actually applied.
    ///
    /// Simple mode sends every event on its own as soon as the dispatcher
    /// wakes, so its limit is 1 and its wait interval zero.
    fn effective_policy(&self) -> BatchPolicy {
        match self.mode {
            DeliveryMode::Simple => BatchPolicy::new(1, Duration::ZERO),
            DeliveryMode::Batching | DeliveryMode::Bundling => {
                BatchPolicy::new(self.batch_size_limit, self.max_wait_interval)
            }
        }
    }
}

/// HTTP sink with in-memory batching.
///
/// `emit` only pushes onto the queue and, when the batch policy fires, wakes
/// the dispatcher task. Delivery order across batches is not guaranteed;
/// consumers must order by the event `timestamp`.
pub struct DeliverySink {
    name: String,
    queue: DeliveryQueue,
    policy: Arc<BatchPolicy>,
    metrics: Arc<SinkMetrics>,
    wake: Arc<Notify>,
    commands: mpsc::UnboundedSender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    active_flushes: Arc<AtomicUsize>,
}

impl DeliverySink {
    /// Create the sink and spawn its dispatcher task (requires a tokio runtime)
    pub fn spawn<T>(config: DeliveryConfig, transport: Arc<T>) -> Self
    where
        T: Transport + Sync + 'static,
    {
        let policy = Arc::new(config.effective_policy());
        let queue = DeliveryQueue::new();
        let metrics = Arc::new(SinkMetrics::new());
        let wake = Arc::new(Notify::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let transmitter = Transmitter::new(
            &config.name,
            &config.endpoint,
            config.mode,
            transport,
            policy.size_limit(),
        );

        let worker = Dispatcher::new(
            &config.name,
            queue.clone(),
            Arc::clone(&policy),
            transmitter,
            Arc::clone(&metrics),
            Arc::clone(&wake),
            rx,
        )
        .spawn();

        debug!(
            sink = %config.name,
            endpoint = %config.endpoint,
            mode = ?config.mode,
            "DeliverySink spawned"
        );

        Self {
            name: config.name,
            queue,
            policy,
            metrics,
            wake,
            commands: tx,
            worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
            active_flushes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<()>) -> Command,
    ) -> Result<(), DispatcherError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(command(ack_tx))
            .map_err(|_| DispatcherError::dispatcher_stopped(&self.name))?;
        ack_rx
            .await
            .map_err(|_| DispatcherError::dispatcher_stopped(&self.name))
    }

    fn reject(&self) -> bool {
        self.metrics.inc_rejected_count();
        observability::record_event_rejected(&self.name);
        debug!(sink = %self.name, "Event rejected, sink closed");
        false
    }
}

/// Keeps `SinkState::Flushing` visible while a flush is pending
struct FlushGuard(Arc<AtomicUsize>);

impl FlushGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl EventSink for DeliverySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, event: SerializedEvent) -> bool {
        if self.closed.load(Ordering::Acquire) || !self.queue.push(event) {
            return self.reject();
        }

        self.metrics.inc_emitted_count();
        observability::record_event_emitted(&self.name);

        let len = self.queue.len();
        self.metrics.set_queue_len(len);
        if self.policy.evaluate(len).is_some() {
            self.wake.notify_one();
        }
        true
    }

    #[instrument(name = "delivery_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&self) -> Result<(), ContractError> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = FlushGuard::enter(&self.active_flushes);
        match self.request(Command::Flush).await {
            Ok(()) => Ok(()),
            // A concurrent close drained the queue and stopped the dispatcher
            Err(_) if self.closed.load(Ordering::Acquire) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(name = "delivery_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&self) -> Result<(), ContractError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(sink = %self.name, "DeliverySink already closed");
            return Ok(());
        }
        self.queue.close();

        if let Err(e) = self.request(Command::Close).await {
            error!(sink = %self.name, error = %e, "Drain on close failed");
        }

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                error!(sink = %self.name, error = ?e, "Dispatcher task panicked");
            }
        }

        let purged = self.queue.purge();
        if purged > 0 {
            self.metrics.add_purged_count(purged as u64);
            warn!(sink = %self.name, purged = purged, "Undelivered events discarded on close");
        }
        self.metrics.set_queue_len(0);
        observability::record_queue_depth(&self.name, 0);

        let snapshot = self.metrics.snapshot();
        info!(
            sink = %self.name,
            emitted = snapshot.emitted_count,
            delivered = snapshot.delivered_count,
            failed = snapshot.failed_count,
            batches = snapshot.batch_count,
            "DeliverySink closed"
        );
        Ok(())
    }

    fn state(&self) -> SinkState {
        if self.closed.load(Ordering::Acquire) {
            SinkState::Closed
        } else if self.active_flushes.load(Ordering::Acquire) > 0 {
            SinkState::Flushing
        } else {
            SinkState::Open
        }
    }
}
