//! Transport trait - blocking-per-request HTTP delivery
//!
//! The pipeline never talks to the network directly; the transmitter calls
//! this trait so tests can substitute a recording double.

use bytes::Bytes;

use crate::ContractError;

/// One HTTP POST with `Content-Type: application/json`.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Post `body` to `endpoint`.
    ///
    /// # Errors
    /// Network failures and non-2xx responses map to `ContractError::Transport`.
    async fn post_json(&self, endpoint: &str, body: Bytes) -> Result<(), ContractError>;
}
