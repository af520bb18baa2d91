//! Fan-out across the provider plugin registry.
//!
//! The plugin runtime is an opaque collaborator: it owns provider and
//! embed scrapers, decides per-candidate success and failure, and emits
//! the lifecycle events. This engine's job is to pass the caller's
//! preferred ordering through and reflect every event into the candidate
//! state in arrival order.

use std::sync::Arc;

use async_trait::async_trait;
use reelix_model::{MediaDescriptor, ScraperInfo, StreamResult};
use tokio_util::sync::CancellationToken;

use crate::scrape::sink::EventSink;
use crate::scrape::strategy::{ScrapeStrategy, StrategyError};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProviderRuntimeError(pub String);

/// Contract of the plugin runtime collaborator.
///
/// The runtime guarantees it emits at most one terminal output, and that
/// any `start(id)` was previously introduced by `init` or
/// `discoverEmbeds`. The preferred order may reorder the registered
/// providers but never add or remove them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderRuntime: Send + Sync {
    /// Registered provider scrapers, in registry order.
    fn sources(&self) -> Vec<ScraperInfo>;

    /// Registered embed scrapers.
    fn embeds(&self) -> Vec<ScraperInfo>;

    /// Run every applicable provider for the descriptor, streaming
    /// lifecycle events into `events` as they happen.
    async fn run_all<'e>(
        &self,
        descriptor: &MediaDescriptor,
        preferred_order: &[String],
        events: &(dyn EventSink + 'e),
        cancel: CancellationToken,
    ) -> Result<Option<StreamResult>, ProviderRuntimeError>;
}

/// Drives the registry for one run.
pub struct PluginFanoutStrategy {
    runtime: Arc<dyn ProviderRuntime>,
    preferred_order: Vec<String>,
}

impl std::fmt::Debug for PluginFanoutStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginFanoutStrategy")
            .field("preferred_order", &self.preferred_order)
            .finish()
    }
}

impl PluginFanoutStrategy {
    pub fn new(
        runtime: Arc<dyn ProviderRuntime>,
        preferred_order: Vec<String>,
    ) -> Self {
        Self {
            runtime,
            preferred_order,
        }
    }
}

#[async_trait]
impl ScrapeStrategy for PluginFanoutStrategy {
    async fn drive(
        &self,
        descriptor: &MediaDescriptor,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<Option<StreamResult>, StrategyError> {
        self.runtime
            .run_all(descriptor, &self.preferred_order, sink, cancel.clone())
            .await
            .map_err(|err| StrategyError::Runtime(err.to_string()))
    }
}
