//! Scrape orchestration: candidate state, lifecycle events, and the three
//! run-driving strategies behind one observable contract.

pub mod orchestrator;
pub mod run;
pub mod sink;
pub mod store;
pub mod strategy;
pub mod tree;

pub use orchestrator::{
    RunOutcome, ScrapeOptions, ScrapeOrchestrator, ScrapeSnapshot,
};
pub use run::RunPhase;
pub use sink::EventSink;
pub use store::{SegmentStore, StoreUpdate, TransitionDetail};
pub use strategy::fanout::{ProviderRuntime, ProviderRuntimeError};
pub use strategy::{ScrapeStrategy, StrategyError};
pub use tree::{CandidateNode, CandidateTree, TreeError};
