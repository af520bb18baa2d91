//! Display-name catalog for known scrapers.
//!
//! Candidates arrive in `init` and `discoverEmbeds` events as bare scraper
//! ids; the catalog turns those into display labels. A missing entry never
//! aborts a run — the raw id is a serviceable label.

use std::collections::HashMap;

use reelix_model::ScraperInfo;

/// Resolves a scraper id to its display name.
pub trait ScraperCatalog: Send + Sync {
    fn display_name(&self, scraper_id: &str) -> Option<String>;

    /// Label for a candidate: the catalog name, or the id itself.
    fn label(&self, scraper_id: &str) -> String {
        self.display_name(scraper_id)
            .unwrap_or_else(|| scraper_id.to_string())
    }
}

/// Catalog backed by a fixed id→name map, built from a provider registry's
/// source and embed listings or from a remote metadata prefetch.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    names: HashMap<String, String>,
}

impl StaticCatalog {
    pub fn new(entries: impl IntoIterator<Item = ScraperInfo>) -> Self {
        Self {
            names: entries
                .into_iter()
                .map(|info| (info.id, info.name))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl ScraperCatalog for StaticCatalog {
    fn display_name(&self, scraper_id: &str) -> Option<String> {
        self.names.get(scraper_id).cloned()
    }
}

impl FromIterator<ScraperInfo> for StaticCatalog {
    fn from_iter<T: IntoIterator<Item = ScraperInfo>>(iter: T) -> Self {
        Self::new(iter)
    }
}
