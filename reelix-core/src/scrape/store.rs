//! Observable candidate status store.

use std::collections::HashMap;

use reelix_model::{Candidate, CandidateStatus};
use tokio::sync::broadcast;
use tracing::warn;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Notification emitted after each committed store mutation, in mutation
/// order. Observers that only ever need the latest picture can ignore these
/// and poll [`SegmentStore::snapshot`] instead.
#[derive(Debug, Clone)]
pub enum StoreUpdate {
    Upserted(Candidate),
    Transitioned(Candidate),
    Cleared,
}

/// In-memory map from candidate id to its current status record.
///
/// Single-writer by construction: the orchestrator owns the store for the
/// duration of a run and strategies only reach it through the run sink.
/// Observers receive an immutable copy per mutation over a broadcast
/// channel, never a live reference.
#[derive(Debug)]
pub struct SegmentStore {
    segments: HashMap<String, Candidate>,
    updates: broadcast::Sender<StoreUpdate>,
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentStore {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            segments: HashMap::new(),
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.updates.subscribe()
    }

    /// Insert or replace a candidate record.
    pub fn upsert(&mut self, candidate: Candidate) {
        self.segments
            .insert(candidate.id.clone(), candidate.clone());
        let _ = self.updates.send(StoreUpdate::Upserted(candidate));
    }

    /// Apply a status transition to a known candidate.
    ///
    /// `status` always replaces the current one. `reason` and `error` are
    /// replaced by the given values when `detailed` is set (an update event
    /// carries its full detail, clearing stale fields it omits); a bare
    /// status flip leaves them untouched. `progress` changes only when one
    /// is carried.
    ///
    /// A transition targeting an unknown id is a no-op: it means a strategy
    /// emitted an event for a candidate it never introduced. That is the
    /// collaborator's bug, not a reason to abort the run, so it is logged
    /// and reported to the caller via the `false` return.
    pub fn transition(
        &mut self,
        id: &str,
        status: CandidateStatus,
        detail: TransitionDetail,
    ) -> bool {
        let Some(candidate) = self.segments.get_mut(id) else {
            warn!(candidate = id, %status, "transition for unknown candidate dropped");
            return false;
        };

        candidate.status = status;
        if detail.detailed {
            candidate.reason = detail.reason;
            candidate.error = detail.error;
        }
        if let Some(progress) = detail.progress {
            candidate.progress = progress.min(100);
        }

        let _ = self
            .updates
            .send(StoreUpdate::Transitioned(candidate.clone()));
        true
    }

    /// Point-in-time copy of every candidate record.
    pub fn snapshot(&self) -> HashMap<String, Candidate> {
        self.segments.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.segments.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.segments.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Discard every record, notifying observers once.
    pub fn clear(&mut self) {
        if !self.segments.is_empty() {
            self.segments.clear();
            let _ = self.updates.send(StoreUpdate::Cleared);
        }
    }
}

/// Optional detail accompanying a status transition.
#[derive(Debug, Default)]
pub struct TransitionDetail {
    detailed: bool,
    reason: Option<String>,
    error: Option<String>,
    progress: Option<u8>,
}

impl TransitionDetail {
    /// A bare status flip: reason, error and progress stay as they are.
    pub fn none() -> Self {
        Self::default()
    }

    /// Full detail from an update event. Omitted fields clear.
    pub fn update(
        reason: Option<String>,
        error: Option<String>,
        progress: u8,
    ) -> Self {
        Self {
            detailed: true,
            reason,
            error,
            progress: Some(progress),
        }
    }
}
