//! BatchPolicy - decides when a batch is cut

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Reason a batch is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Queue grew past the size limit
    Threshold,
    /// The oldest pending item may have waited longer than the max interval
    Elapsed,
    /// Explicit flush or close
    Forced,
}

/// Greedy at-least-one-trigger batching policy.
///
/// A batch is cut when `queue_len > size_limit`, or when pending items exist
/// and more than `max_wait` has passed since the last flush. Forced drains
/// bypass `evaluate` entirely.
#[derive(Debug)]
pub struct BatchPolicy {
    size_limit: usize,
    max_wait: Duration,
    origin: Instant,
    /// Nanoseconds since `origin`
    last_flush: AtomicU64,
}

impl BatchPolicy {
    /// `size_limit` is clamped to at least 1
    pub fn new(size_limit: usize, max_wait: Duration) -> Self {
        Self {
            size_limit: size_limit.max(1),
            max_wait,
            origin: Instant::now(),
            last_flush: AtomicU64::new(0),
        }
    }

    pub fn size_limit(&self) -> usize {
        self.size_limit
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Evaluate against the current time
    pub fn evaluate(&self, queue_len: usize) -> Option<Trigger> {
        self.evaluate_at(queue_len, Instant::now())
    }

    pub fn evaluate_at(&self, queue_len: usize, now: Instant) -> Option<Trigger> {
        if queue_len > self.size_limit {
            Some(Trigger::Threshold)
        } else if queue_len > 0 && self.since_last_flush_at(now) > self.max_wait {
            Some(Trigger::Elapsed)
        } else {
            None
        }
    }

    /// Record that a batch was just handed to the transmitter
    pub fn mark_flushed(&self) {
        self.mark_flushed_at(Instant::now());
    }

    pub fn mark_flushed_at(&self, now: Instant) {
        let nanos = now.saturating_duration_since(self.origin).as_nanos() as u64;
        self.last_flush.fetch_max(nanos, Ordering::AcqRel);
    }

    /// Instant at which a pending item is due, measured from the last flush
    pub fn next_deadline(&self) -> Instant {
        let last = self.origin + Duration::from_nanos(self.last_flush.load(Ordering::Acquire));
        last.checked_add(self.max_wait)
            .unwrap_or(last + Duration::from_secs(86_400))
    }

    pub fn since_last_flush(&self) -> Duration {
        self.since_last_flush_at(Instant::now())
    }

    fn since_last_flush_at(&self, now: Instant) -> Duration {
        let last = Duration::from_nanos(self.last_flush.load(Ordering::Acquire));
        now.saturating_duration_since(self.origin)
            .saturating_sub(last)
    }
}
