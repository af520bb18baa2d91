//! Per-run engine state and the single event-application path.
//!
//! Every strategy invocation is tagged with the run it was started for;
//! events carrying a stale tag are discarded here, so an abandoned run can
//! never mutate the state of its successor even while its network activity
//! is still winding down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reelix_model::{Candidate, CandidateStatus, MediaIdentity, ScrapeEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::ScraperCatalog;
use crate::scrape::store::{SegmentStore, TransitionDetail};
use crate::scrape::tree::CandidateTree;

/// Lifecycle of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Resolved,
    Cancelled,
}

/// Book-keeping for the run currently holding the engine.
pub(crate) struct ActiveRun {
    pub run: u64,
    pub correlation: Uuid,
    pub identity: MediaIdentity,
    pub cancel: CancellationToken,
    pub labels: Arc<dyn ScraperCatalog>,
    /// Initial progress for candidates registered by `init`.
    pub waiting_progress: u8,
    /// Most recently started candidate; drives the pending→success flip on
    /// the next `start`.
    pub last_started: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for ActiveRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRun")
            .field("run", &self.run)
            .field("correlation", &self.correlation)
            .field("identity", &self.identity)
            .field("last_started", &self.last_started)
            .finish()
    }
}

/// The orchestrator-owned mutable state: lifecycle phase, the active run,
/// and the two observable structures every strategy writes into.
#[derive(Debug)]
pub(crate) struct EngineState {
    pub phase: RunPhase,
    pub run_seq: u64,
    pub active: Option<ActiveRun>,
    pub store: SegmentStore,
    pub tree: CandidateTree,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            run_seq: 0,
            active: None,
            store: SegmentStore::new(),
            tree: CandidateTree::new(),
        }
    }

    /// Enter `Running` for `identity`: bump the run counter, clear all
    /// candidate state, and hand back the new run's tag and cancel token.
    pub fn begin_run(
        &mut self,
        identity: MediaIdentity,
        labels: Arc<dyn ScraperCatalog>,
        waiting_progress: u8,
    ) -> (u64, CancellationToken) {
        self.run_seq += 1;
        self.store.clear();
        self.tree.clear();
        let cancel = CancellationToken::new();
        let run = self.run_seq;
        self.active = Some(ActiveRun {
            run,
            correlation: Uuid::now_v7(),
            identity,
            cancel: cancel.clone(),
            labels,
            waiting_progress,
            last_started: None,
            started_at: Utc::now(),
        });
        self.phase = RunPhase::Running;
        (run, cancel)
    }

    /// Back to `Idle`: cancel the active strategy invocation and discard all
    /// candidate state. Snapshots taken after this are empty.
    pub fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
        self.store.clear();
        self.tree.clear();
        self.phase = RunPhase::Idle;
    }

    pub fn is_current(&self, run: u64) -> bool {
        self.active.as_ref().is_some_and(|active| active.run == run)
    }

    /// Apply one lifecycle event for run `run`, in arrival order.
    pub fn apply(&mut self, run: u64, event: ScrapeEvent) {
        if !self.is_current(run) {
            debug!(run, ?event, "stale scrape event discarded");
            return;
        }

        match event {
            ScrapeEvent::Init(payload) => self.apply_init(payload.source_ids),
            ScrapeEvent::Start(payload) => self.apply_start(payload.id),
            ScrapeEvent::Update(payload) => {
                self.store.transition(
                    &payload.id,
                    payload.status,
                    TransitionDetail::update(
                        payload.reason,
                        payload.error,
                        payload.percentage,
                    ),
                );
            }
            ScrapeEvent::DiscoverEmbeds(payload) => {
                self.apply_discover_embeds(payload.source_id, payload.embeds);
            }
        }
    }

    fn apply_init(&mut self, source_ids: Vec<String>) {
        let Some(active) = self.active.as_ref() else { return };
        let waiting_progress = active.waiting_progress;
        let candidates: Vec<Candidate> = source_ids
            .iter()
            .map(|id| {
                Candidate::waiting(id.clone(), active.labels.label(id))
                    .with_progress(waiting_progress)
            })
            .collect();

        self.tree.register_roots(source_ids);
        for candidate in candidates {
            self.store.upsert(candidate);
        }
    }

    fn apply_start(&mut self, id: String) {
        let Some(active) = self.active.as_mut() else { return };
        // The previously started candidate, if still mid-attempt, is done
        // and produced no failure event: it succeeded at its own level.
        if let Some(previous) = active.last_started.replace(id.clone()) {
            if previous != id
                && self
                    .store
                    .get(&previous)
                    .is_some_and(|c| c.status == CandidateStatus::Pending)
            {
                self.store.transition(
                    &previous,
                    CandidateStatus::Success,
                    TransitionDetail::none(),
                );
            }
        }
        self.store
            .transition(&id, CandidateStatus::Pending, TransitionDetail::none());
    }

    fn apply_discover_embeds(
        &mut self,
        source_id: String,
        embeds: Vec<reelix_model::DiscoveredEmbed>,
    ) {
        let Some(active) = self.active.as_ref() else { return };

        // Ids the store already tracks would be clobbered back to waiting;
        // drop them the same way the tree drops re-homed children.
        let fresh: Vec<_> = embeds
            .into_iter()
            .filter(|embed| !self.store.contains(&embed.id))
            .collect();

        let child_ids: Vec<String> =
            fresh.iter().map(|embed| embed.id.clone()).collect();
        if let Err(err) = self.tree.attach_children(&source_id, child_ids) {
            warn!(%err, "embed discovery for unknown source dropped");
            return;
        }

        let labels = Arc::clone(&active.labels);
        for embed in fresh {
            self.store.upsert(Candidate::waiting_embed(
                embed.id,
                labels.label(&embed.embed_scraper_id),
                source_id.clone(),
            ));
        }
    }

    /// Terminal promotion: the candidate that actually produced the output
    /// is marked `success`. Never applied speculatively.
    pub fn promote_winner(&mut self, run: u64, winning_id: &str) {
        if !self.is_current(run) {
            return;
        }
        self.store.transition(
            winning_id,
            CandidateStatus::Success,
            TransitionDetail::none(),
        );
    }
}
