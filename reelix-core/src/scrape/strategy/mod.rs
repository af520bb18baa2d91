//! The three run-driving strategies.
//!
//! Each strategy implements one method: drive a run for a descriptor,
//! emitting lifecycle events into the sink, and hand back the output (or
//! the fact that every candidate was exhausted). The orchestrator depends
//! only on this trait.

pub mod fanout;
pub mod remote;
pub mod sequential;

use async_trait::async_trait;
use reelix_model::{MediaDescriptor, StreamResult};
use tokio_util::sync::CancellationToken;

use crate::scrape::sink::EventSink;

/// Strategy-level faults. Per-candidate failures are absorbed into the
/// store; only faults that end the whole run early surface here.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// The remote delegation transport failed (disconnect, malformed frame,
    /// stream ended without a terminal signal). Distinct from exhaustion by
    /// contract: absence of output is an explicit server signal.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The plugin runtime itself died mid-run.
    #[error("provider runtime failure: {0}")]
    Runtime(String),
}

/// Drives one run end to end.
///
/// `Ok(Some(result))` is the single terminal output; `Ok(None)` means every
/// candidate was exhausted. Cancellation is cooperative via `cancel`; a
/// strategy noticing it mid-run returns whatever it has (the orchestrator
/// discards stale results by run tag anyway).
#[async_trait]
pub trait ScrapeStrategy: Send + Sync {
    async fn drive(
        &self,
        descriptor: &MediaDescriptor,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<Option<StreamResult>, StrategyError>;
}
