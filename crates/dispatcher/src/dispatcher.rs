//! Dispatcher - per-sink drain loop
//!
//! One task per sink owns the draining side of the queue, so draining is
//! mutually exclusive by construction. It wakes on three sources:
//! - `emit` notifying that the policy fired
//! - a timer armed for `last_flush + max_wait`, so idle queues still drain
//! - flush / close commands, acknowledged once the drain is done
//!
//! Every drain handles at most the backlog present when it started and then
//! returns to the `select!`, so pending commands are served between drains.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{SerializedEvent, Transport};

use crate::metrics::SinkMetrics;
use crate::policy::{BatchPolicy, Trigger};
use crate::queue::DeliveryQueue;
use crate::transmitter::Transmitter;

/// Added to the policy deadline so the strict `> max_wait` check holds on wake
pub const DEADLINE_SLACK: Duration = Duration::from_millis(1);

/// Requests from the sink to its dispatcher task
#[derive(Debug)]
pub(crate) enum Command {
    /// Drain the backlog, then acknowledge
    Flush(oneshot::Sender<()>),
    /// Drain the backlog, acknowledge and stop
    Close(oneshot::Sender<()>),
}

/// Drain loop of one sink
pub struct Dispatcher<T> {
    sink_name: String,
    queue: DeliveryQueue,
    policy: Arc<BatchPolicy>,
    transmitter: Transmitter<T>,
    metrics: Arc<SinkMetrics>,
    wake: Arc<Notify>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<T> Dispatcher<T>
where
    T: Transport + Sync + 'static,
{
    pub(crate) fn new(
        sink_name: impl Into<String>,
        queue: DeliveryQueue,
        policy: Arc<BatchPolicy>,
        transmitter: Transmitter<T>,
        metrics: Arc<SinkMetrics>,
        wake: Arc<Notify>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            sink_name: sink_name.into(),
            queue,
            policy,
            transmitter,
            metrics,
            wake,
            commands,
        }
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run until a close command arrives or the sink is dropped
    #[instrument(name = "dispatcher_run", skip(self), fields(sink = %self.sink_name))]
    pub async fn run(mut self) {
        info!(
            sink = %self.sink_name,
            size_limit = self.policy.size_limit(),
            max_wait_ms = self.policy.max_wait().as_millis() as u64,
            workers = self.transmitter.workers(),
            "Dispatcher started"
        );

        loop {
            let deadline =
                tokio::time::Instant::from_std(self.policy.next_deadline() + DEADLINE_SLACK);
            // A past deadline with an empty queue needs no timer: the next
            // emit finds the interval elapsed and notifies.
            let armed = !self.queue.is_empty() || deadline > tokio::time::Instant::now();

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Flush(ack)) => {
                        self.drain(Trigger::Forced).await;
                        let _ = ack.send(());
                    }
                    Some(Command::Close(ack)) => {
                        self.drain(Trigger::Forced).await;
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        debug!(sink = %self.sink_name, "Sink dropped, draining backlog");
                        self.drain(Trigger::Forced).await;
                        break;
                    }
                },
                _ = self.wake.notified() => self.drain_triggered().await,
                _ = tokio::time::sleep_until(deadline), if armed => self.drain_triggered().await,
            }
        }

        self.transmitter.shutdown();
        info!(sink = %self.sink_name, "Dispatcher stopped");
    }

    /// One policy-driven drain. If the policy still fires afterwards the
    /// loop is woken again, after any pending command has been served.
    async fn drain_triggered(&self) {
        let Some(trigger) = self.policy.evaluate(self.queue.len()) else {
            return;
        };
        if self.drain(trigger).await > 0 && self.policy.evaluate(self.queue.len()).is_some() {
            self.wake.notify_one();
        }
    }

    /// Cut and transmit batches for one trigger. Returns the batch count.
    ///
    /// Every trigger is bounded by the backlog present at entry. Threshold
    /// drains additionally stop once the queue is back at the limit.
    async fn drain(&self, trigger: Trigger) -> usize {
        let limit = self.policy.size_limit();
        let mut budget = self.queue.len();
        let mut batches = 0;

        while budget > 0 {
            if trigger == Trigger::Threshold && self.queue.len() <= limit {
                break;
            }

            let batch = self.queue.take_batch(limit.min(budget));
            if batch.is_empty() {
                break;
            }
            budget = budget.saturating_sub(batch.len());
            self.dispatch(batch).await;
            batches += 1;
        }

        if batches > 0 {
            debug!(
                sink = %self.sink_name,
                trigger = ?trigger,
                batches = batches,
                remaining = self.queue.len(),
                "Drain complete"
            );
        }
        batches
    }

    async fn dispatch(&self, batch: Vec<SerializedEvent>) {
        let size = batch.len();
        self.metrics.inc_batch_count();
        observability::record_batch_dispatched(&self.sink_name, size);

        let report = self.transmitter.transmit(batch).await;
        self.policy.mark_flushed();

        self.metrics.add_delivered_count(report.delivered as u64);
        self.metrics.add_failed_count(report.failed as u64);

        let depth = self.queue.len();
        self.metrics.set_queue_len(depth);
        observability::record_queue_depth(&self.sink_name, depth);
    }
}
