//! EventSink trait - delivery endpoint capability interface
//!
//! Every sink variant (console, simple HTTP, batching, bundling) implements
//! this trait; the logger and the registry depend on nothing else.

use async_trait::async_trait;

use crate::{ContractError, SerializedEvent};

/// Lifecycle state of a sink.
///
/// `Open -> Flushing -> Open` is transient and re-entrant,
/// `Open -> Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Open,
    Flushing,
    Closed,
}

/// Event output trait
///
/// Used as `Arc<dyn EventSink>`, hence `async_trait` rather than native
/// async fns.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Hand an event to the sink.
    ///
    /// Never blocks on I/O and never fails loudly. Returns `false` when the
    /// event was rejected (sink closed).
    fn emit(&self, event: SerializedEvent) -> bool;

    /// Drain everything pending at the time of the call
    async fn flush(&self) -> Result<(), ContractError>;

    /// Flush, release resources and reject further events.
    ///
    /// Idempotent: calls after the first have no effect.
    async fn close(&self) -> Result<(), ContractError>;

    /// Current lifecycle state
    fn state(&self) -> SinkState;
}
