//! Sink metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Events accepted by `emit`
    emitted_count: AtomicU64,
    /// Events delivered successfully
    delivered_count: AtomicU64,
    /// Events whose delivery failed
    failed_count: AtomicU64,
    /// Events rejected because the sink was closed
    rejected_count: AtomicU64,
    /// Events discarded when the queue was purged
    purged_count: AtomicU64,
    /// Batches handed to the transmitter
    batch_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted_count.load(Ordering::Relaxed)
    }

    pub fn inc_emitted_count(&self) {
        self.emitted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn add_delivered_count(&self, n: u64) {
        self.delivered_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    pub fn add_failed_count(&self, n: u64) {
        self.failed_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    pub fn inc_rejected_count(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn purged_count(&self) -> u64 {
        self.purged_count.load(Ordering::Relaxed)
    }

    pub fn add_purged_count(&self, n: u64) {
        self.purged_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    pub fn inc_batch_count(&self) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            emitted_count: self.emitted_count(),
            delivered_count: self.delivered_count(),
            failed_count: self.failed_count(),
            rejected_count: self.rejected_count(),
            purged_count: self.purged_count(),
            batch_count: self.batch_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub emitted_count: u64,
    pub delivered_count: u64,
    pub failed_count: u64,
    pub rejected_count: u64,
    pub purged_count: u64,
    pub batch_count: u64,
}

impl MetricsSnapshot {
    /// Events emitted but neither delivered, failed nor purged yet
    pub fn in_flight(&self) -> u64 {
        self.emitted_count
            .saturating_sub(self.delivered_count + self.failed_count + self.purged_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_in_flight() {
        let metrics = SinkMetrics::new();
        for _ in 0..5 {
            metrics.inc_emitted_count();
        }
        metrics.add_delivered_count(3);
        metrics.add_failed_count(1);
        metrics.inc_batch_count();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.emitted_count, 5);
        assert_eq!(snapshot.batch_count, 1);
        assert_eq!(snapshot.in_flight(), 1);
    }
}
