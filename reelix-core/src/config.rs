use std::env;

use rand::seq::IndexedRandom;
use reelix_model::MediaDescriptor;
use url::Url;

/// Engine configuration loaded via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base url of the mirror endpoint service, when one is deployed.
    pub mirror_base_url: Option<Url>,
    /// API key sent with mirror server listings.
    pub mirror_api_key: String,

    /// Pool of remote orchestration endpoints. Empty means scrape locally.
    pub remote_endpoints: Vec<Url>,

    /// `kind-id` entries for titles the engine refuses to scrape.
    pub disallowed_ids: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mirror_base_url: None,
            mirror_api_key: String::new(),
            remote_endpoints: Vec::new(),
            disallowed_ids: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let mirror_base_url = match env::var("REELIX_MIRROR_URL") {
            Ok(raw) if !raw.is_empty() => Some(Url::parse(&raw)?),
            _ => None,
        };

        let remote_endpoints = env::var("REELIX_REMOTE_URLS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Url::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            mirror_base_url,
            mirror_api_key: env::var("REELIX_MIRROR_API_KEY")
                .unwrap_or_else(|_| String::new()),
            remote_endpoints,
            disallowed_ids: env::var("REELIX_DISALLOWED_IDS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    /// Pick one remote endpoint from the pool, spreading runs across the
    /// deployed instances.
    pub fn pick_remote_endpoint(&self) -> Option<&Url> {
        self.remote_endpoints.choose(&mut rand::rng())
    }

    /// Whether the descriptor is on the `kind-id` blocklist.
    pub fn is_disallowed(&self, descriptor: &MediaDescriptor) -> bool {
        self.disallowed_ids.iter().any(|entry| {
            match entry.split_once('-') {
                Some((kind, id)) => {
                    kind == descriptor.kind.as_str() && id == descriptor.id
                }
                None => false,
            }
        })
    }

    pub fn with_remote_endpoints(mut self, endpoints: Vec<Url>) -> Self {
        self.remote_endpoints = endpoints;
        self
    }

    pub fn with_disallowed_ids(mut self, entries: Vec<String>) -> Self {
        self.disallowed_ids = entries;
        self
    }
}
