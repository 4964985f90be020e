//! Recording transport
//!
//! In-memory `Transport` for tests and dry runs: records every request,
//! supports failure injection and an artificial per-request delay.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, Transport};

/// Failure / latency injection
#[derive(Debug, Clone, Default)]
pub struct MockTransportConfig {
    /// Fail any request whose body contains one of these substrings
    pub fail_bodies_containing: Vec<String>,
    /// Fail every request
    pub fail_all: bool,
    /// Sleep before answering
    pub delay: Duration,
}

/// One recorded request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub body: Bytes,
    pub delivered: bool,
}

/// Transport double that records instead of sending
#[derive(Debug, Default)]
pub struct RecordingTransport {
    config: MockTransportConfig,
    requests: Mutex<Vec<RecordedRequest>>,
    attempts: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockTransportConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Every request attempted so far, in completion order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful requests
    pub fn request_count(&self) -> usize {
        self.requests().iter().filter(|r| r.delivered).count()
    }

    /// Number of requests attempted, successful or not
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently running requests observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Delivered events, with bundle bodies split into their elements
    pub fn delivered_events(&self) -> Vec<serde_json::Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.delivered)
            .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
            .flat_map(|value| match value {
                serde_json::Value::Array(items) => items,
                other => vec![other],
            })
            .collect()
    }

    fn should_fail(&self, body: &Bytes) -> bool {
        if self.config.fail_all {
            return true;
        }
        let text = String::from_utf8_lossy(body);
        self.config
            .fail_bodies_containing
            .iter()
            .any(|marker| text.contains(marker.as_str()))
    }
}

impl Transport for RecordingTransport {
    async fn post_json(&self, endpoint: &str, body: Bytes) -> Result<(), ContractError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let delivered = !self.should_fail(&body);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                endpoint: endpoint.to_string(),
                body,
                delivered,
            });

        if delivered {
            Ok(())
        } else {
            Err(ContractError::transport(endpoint, Some(500), "injected failure"))
        }
    }
}
