//! The write path strategies use to reach the candidate state.

use std::sync::{Arc, Mutex, PoisonError};

use reelix_model::ScrapeEvent;

use crate::scrape::run::EngineState;

/// Receives lifecycle events from a strategy invocation.
///
/// Strategies never hold the store or tree directly; they emit events into
/// a sink the orchestrator hands them, and the orchestrator decides whether
/// those events still belong to the current run.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScrapeEvent);
}

/// Sink tagged with the run it was created for. Emission is synchronous:
/// the event is applied (or discarded as stale) before `emit` returns, so
/// a strategy's events land in exactly the order it produced them.
#[derive(Clone)]
pub(crate) struct RunSink {
    run: u64,
    state: Arc<Mutex<EngineState>>,
}

impl RunSink {
    pub fn new(run: u64, state: Arc<Mutex<EngineState>>) -> Self {
        Self { run, state }
    }
}

impl EventSink for RunSink {
    fn emit(&self, event: ScrapeEvent) {
        let mut state =
            self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.apply(self.run, event);
    }
}
