//! Delivery pipeline metrics
//!
//! Thin wrappers over the `metrics` macros so metric names and labels live in
//! one place, plus in-memory summaries for command-line reporting.

use metrics::{counter, gauge, histogram};

/// Record an event accepted onto a sink's queue
pub fn record_event_emitted(sink_name: &str) {
    counter!("logship_events_emitted_total", "sink" => sink_name.to_string()).increment(1);
}

/// Record an event rejected by a closed sink
pub fn record_event_rejected(sink_name: &str) {
    counter!("logship_events_rejected_total", "sink" => sink_name.to_string()).increment(1);
}

/// Record one batch handed to the transmitter
pub fn record_batch_dispatched(sink_name: &str, batch_size: usize) {
    counter!("logship_batches_dispatched_total", "sink" => sink_name.to_string()).increment(1);
    histogram!("logship_batch_size", "sink" => sink_name.to_string()).record(batch_size as f64);
}

/// Record the outcome of one delivery attempt
pub fn record_delivery(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "logship_deliveries_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the current queue depth
pub fn record_queue_depth(sink_name: &str, depth: usize) {
    gauge!("logship_queue_depth", "sink" => sink_name.to_string()).set(depth as f64);
}

/// Summary of one load run against a set of sinks
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub events_emitted: u64,
    pub events_delivered: u64,
    pub events_failed: u64,
    pub events_rejected: u64,
    pub batches: u64,
    pub elapsed_secs: f64,
    /// Per-call emit latency in microseconds
    pub emit_latency_us: StatsSummary,
    /// Time spent in the final flush, in milliseconds
    pub flush_ms: f64,
}

impl DeliverySummary {
    /// Emitted events per second over the whole run
    pub fn throughput(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.events_emitted as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }

    /// Share of attempted deliveries that failed, in percent
    pub fn failure_rate(&self) -> f64 {
        let attempted = self.events_delivered + self.events_failed;
        if attempted > 0 {
            self.events_failed as f64 / attempted as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Events emitted: {}", self.events_emitted)?;
        writeln!(f, "Events delivered: {}", self.events_delivered)?;
        writeln!(
            f,
            "Events failed: {} ({:.2}%)",
            self.events_failed,
            self.failure_rate()
        )?;
        writeln!(f, "Events rejected: {}", self.events_rejected)?;
        writeln!(f, "Batches: {}", self.batches)?;
        writeln!(
            f,
            "Elapsed: {:.3}s ({:.1} events/s)",
            self.elapsed_secs,
            self.throughput()
        )?;
        writeln!(f, "Emit latency (us): {}", self.emit_latency_us)?;
        writeln!(f, "Final flush: {:.3}ms", self.flush_ms)?;
        Ok(())
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Merge another accumulator into this one (Chan et al.)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        self.m2 += other.m2 + delta * delta * (self.count * other.count) as f64 / count as f64;
        self.mean += delta * other.count as f64 / count as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_running_stats_merge() {
        let mut left = RunningStats::default();
        let mut right = RunningStats::default();
        for v in [1.0, 2.0] {
            left.push(v);
        }
        for v in [3.0, 4.0, 5.0] {
            right.push(v);
        }

        left.merge(&right);
        assert_eq!(left.count(), 5);
        assert!((left.mean() - 3.0).abs() < 1e-10);
        assert!((left.variance() - 2.5).abs() < 1e-10);
        assert!((left.max() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let summary = DeliverySummary {
            events_emitted: 100,
            events_delivered: 95,
            events_failed: 5,
            elapsed_secs: 2.0,
            ..Default::default()
        };

        let output = format!("{}", summary);
        assert!(output.contains("Events emitted: 100"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("50.0 events/s"));
    }

    #[test]
    fn test_record_helpers_without_recorder() {
        // No recorder installed: calls are no-ops
        record_event_emitted("s");
        record_event_rejected("s");
        record_batch_dispatched("s", 3);
        record_delivery("s", false);
        record_queue_depth("s", 0);
    }
}
