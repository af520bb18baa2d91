//! Run lifecycle owner: strategy selection, reset/cancel, outcome
//! normalization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use reelix_model::{
    Candidate, MediaDescriptor, MediaIdentity, MirrorServer, ScraperInfo,
    StreamResult,
};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{ScraperCatalog, StaticCatalog};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::mirror::{HttpMirrorApi, MirrorApi};
use crate::scrape::run::{EngineState, RunPhase};
use crate::scrape::sink::RunSink;
use crate::scrape::store::StoreUpdate;
use crate::scrape::strategy::fanout::{PluginFanoutStrategy, ProviderRuntime};
use crate::scrape::strategy::remote::{
    RemoteDelegatedStrategy, fetch_remote_catalog,
};
use crate::scrape::strategy::sequential::SequentialMirrorStrategy;
use crate::scrape::strategy::{ScrapeStrategy, StrategyError};
use crate::scrape::tree::CandidateNode;

/// Mirrors surface mid-bar the moment they are listed.
const MIRROR_WAITING_PROGRESS: u8 = 40;

/// Terminal outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success(StreamResult),
    /// Every candidate was tried; none produced output.
    NotFound,
    /// The run was interrupted, or the remote transport failed. Kept
    /// distinct from [`RunOutcome::NotFound`] end to end.
    Cancelled { detail: Option<String> },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }
}

/// Caller-tunable knobs for one run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Preferred provider ordering; may reorder the registered providers
    /// but never add or remove them.
    pub preferred_order: Vec<String>,
    /// An active local extension outranks remote delegation.
    pub local_override_active: bool,
}

/// Point-in-time view of a run for observers.
#[derive(Debug, Clone)]
pub struct ScrapeSnapshot {
    pub phase: RunPhase,
    pub sources: HashMap<String, Candidate>,
    pub order: Vec<CandidateNode>,
    /// Most recently started candidate.
    pub current: Option<String>,
    pub identity: Option<MediaIdentity>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Owns SegmentStore and CandidateTree for the duration of a run and
/// normalizes all three strategies' outcomes into [`RunOutcome`].
///
/// Exactly one run may be `Running` at a time per instance; callers reset
/// before switching descriptors.
pub struct ScrapeOrchestrator {
    state: Arc<Mutex<EngineState>>,
    config: EngineConfig,
    runtime: Arc<dyn ProviderRuntime>,
    mirror_api: Option<Arc<dyn MirrorApi>>,
    registry_catalog: Arc<StaticCatalog>,
    http: reqwest::Client,
}

impl std::fmt::Debug for ScrapeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeOrchestrator")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .finish()
    }
}

impl ScrapeOrchestrator {
    pub fn new(
        config: EngineConfig,
        runtime: Arc<dyn ProviderRuntime>,
    ) -> Self {
        let registry_catalog = Arc::new(StaticCatalog::new(
            runtime
                .sources()
                .into_iter()
                .chain(runtime.embeds())
                .collect::<Vec<ScraperInfo>>(),
        ));
        let mirror_api = config.mirror_base_url.clone().map(|base| {
            Arc::new(HttpMirrorApi::new(base, config.mirror_api_key.clone()))
                as Arc<dyn MirrorApi>
        });
        Self {
            state: Arc::new(Mutex::new(EngineState::new())),
            config,
            runtime,
            mirror_api,
            registry_catalog,
            http: reqwest::Client::new(),
        }
    }

    /// Replace the mirror endpoint client (tests, alternate transports).
    pub fn with_mirror_api(mut self, api: Arc<dyn MirrorApi>) -> Self {
        self.mirror_api = Some(api);
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.lock_state().phase
    }

    /// Subscribe to per-mutation store notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.lock_state().store.subscribe()
    }

    pub fn snapshot(&self) -> ScrapeSnapshot {
        let state = self.lock_state();
        ScrapeSnapshot {
            phase: state.phase,
            sources: state.store.snapshot(),
            order: state.tree.snapshot(),
            current: state
                .active
                .as_ref()
                .and_then(|active| active.last_started.clone()),
            identity: state
                .active
                .as_ref()
                .map(|active| active.identity.clone()),
            started_at: state.active.as_ref().map(|active| active.started_at),
        }
    }

    /// Abandon any in-flight run and return to `Idle`. The old strategy is
    /// signaled to stop; whatever it still emits is discarded by run tag.
    pub fn reset(&self) {
        self.lock_state().reset();
    }

    /// Resolve the ranked mirror list for a descriptor, for callers that
    /// want to attach it before invoking the sequential path.
    pub async fn resolve_mirror_servers(
        &self,
        descriptor: &MediaDescriptor,
    ) -> Result<Vec<MirrorServer>, EngineError> {
        let api = self
            .mirror_api
            .as_ref()
            .ok_or(EngineError::NoMirrorEndpoint)?;
        Ok(api.list_servers(descriptor).await?)
    }

    /// Run the descriptor through remote delegation when an endpoint is
    /// configured (and no local override is active), else plugin fan-out.
    pub async fn start_run(
        &self,
        descriptor: MediaDescriptor,
        options: ScrapeOptions,
    ) -> Result<RunOutcome, EngineError> {
        self.admit(&descriptor)?;

        let use_remote = !self.config.remote_endpoints.is_empty()
            && !options.local_override_active;

        let (strategy, labels): (Box<dyn ScrapeStrategy>, Arc<dyn ScraperCatalog>) =
            if use_remote {
                let endpoint = self
                    .config
                    .pick_remote_endpoint()
                    .ok_or(EngineError::NoRemoteEndpoint)?
                    .clone();
                // Labels degrade to raw ids if the prefetch fails; a run is
                // never blocked on metadata.
                let catalog =
                    fetch_remote_catalog(&self.http, &endpoint).await;
                info!(endpoint = %endpoint, "delegating scrape to remote service");
                (
                    Box::new(RemoteDelegatedStrategy::new(endpoint)),
                    Arc::new(catalog),
                )
            } else {
                (
                    Box::new(PluginFanoutStrategy::new(
                        Arc::clone(&self.runtime),
                        options.preferred_order,
                    )),
                    Arc::clone(&self.registry_catalog) as Arc<dyn ScraperCatalog>,
                )
            };

        let (run, cancel) = self.begin(&descriptor, labels, 0)?;
        let sink = RunSink::new(run, Arc::clone(&self.state));
        let driven = strategy.drive(&descriptor, &sink, &cancel).await;
        Ok(self.finalize(run, driven))
    }

    /// Independent sequential path for descriptors that already carry a
    /// ranked mirror list.
    pub async fn start_mirror_run(
        &self,
        descriptor: MediaDescriptor,
    ) -> Result<RunOutcome, EngineError> {
        self.admit(&descriptor)?;

        // Mirror names come with the descriptor, not from any registry.
        let labels: Arc<dyn ScraperCatalog> =
            Arc::new(StaticCatalog::new(descriptor.servers.iter().map(
                |server| {
                    ScraperInfo::new(server.handle.clone(), server.name.clone())
                },
            )));

        if descriptor.servers.is_empty() {
            // Nothing to try: resolve the run without a single fetch.
            let (run, _cancel) = self.begin(&descriptor, labels, 0)?;
            return Ok(self.finalize(run, Ok(None)));
        }

        let api = self
            .mirror_api
            .as_ref()
            .map(Arc::clone)
            .ok_or(EngineError::NoMirrorEndpoint)?;
        let strategy = SequentialMirrorStrategy::new(api);

        let (run, cancel) =
            self.begin(&descriptor, labels, MIRROR_WAITING_PROGRESS)?;
        let sink = RunSink::new(run, Arc::clone(&self.state));
        let driven = strategy.drive(&descriptor, &sink, &cancel).await;
        Ok(self.finalize(run, driven))
    }

    /// Pre-run admission: descriptor shape and the blocklist.
    fn admit(&self, descriptor: &MediaDescriptor) -> Result<(), EngineError> {
        descriptor.validate()?;
        if self.config.is_disallowed(descriptor) {
            return Err(EngineError::DisallowedMedia(descriptor.identity()));
        }
        Ok(())
    }

    /// Enter `Running`, rejecting the attempt if another run holds the
    /// engine. Clearing and the run-tag bump happen inside the same lock,
    /// so no event from the old run can land in the gap.
    fn begin(
        &self,
        descriptor: &MediaDescriptor,
        labels: Arc<dyn ScraperCatalog>,
        waiting_progress: u8,
    ) -> Result<(u64, CancellationToken), EngineError> {
        let mut state = self.lock_state();
        if state.phase == RunPhase::Running {
            if let Some(active) = state.active.as_ref() {
                return Err(EngineError::ConcurrentRunRejected {
                    active: active.identity.clone(),
                    requested: descriptor.identity(),
                });
            }
        }
        let identity = descriptor.identity();
        let (run, cancel) =
            state.begin_run(identity.clone(), labels, waiting_progress);
        if let Some(active) = state.active.as_ref() {
            info!(run, correlation = %active.correlation, target = %identity, "scrape run started");
        }
        Ok((run, cancel))
    }

    /// Normalize a driven strategy's result into the run outcome, applying
    /// the terminal winner promotion. A run that lost the engine while its
    /// strategy was still in flight resolves as cancelled and must not
    /// touch the successor's state.
    fn finalize(
        &self,
        run: u64,
        driven: Result<Option<StreamResult>, StrategyError>,
    ) -> RunOutcome {
        let mut state = self.lock_state();
        if !state.is_current(run) {
            debug!(run, "finalizing an abandoned run");
            return RunOutcome::Cancelled { detail: None };
        }
        match driven {
            Ok(Some(result)) => {
                state.promote_winner(run, &result.source_id);
                state.phase = RunPhase::Resolved;
                info!(run, winner = %result.source_id, "scrape run resolved");
                RunOutcome::Success(result)
            }
            Ok(None) => {
                state.phase = RunPhase::Resolved;
                info!(run, "scrape run exhausted all candidates");
                RunOutcome::NotFound
            }
            Err(err) => {
                state.phase = RunPhase::Cancelled;
                warn!(run, %err, "scrape run interrupted");
                RunOutcome::Cancelled {
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
