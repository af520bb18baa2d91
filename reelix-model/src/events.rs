//! Scrape lifecycle event vocabulary.
//!
//! All three strategies converge on these four events; the payload structs
//! mirror the remote delegation wire contract (camelCase JSON) so the remote
//! path can deserialize frames directly into them.

use crate::candidate::CandidateStatus;

/// Identity of a known scraper: used to label candidates for display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScraperInfo {
    pub id: String,
    pub name: String,
}

impl ScraperInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An embed discovered under a source candidate mid-run. `id` is the
/// candidate id of the attempt; `embed_scraper_id` names the embed scraper
/// that will drive it (and keys the display label lookup).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DiscoveredEmbed {
    pub id: String,
    pub embed_scraper_id: String,
}

/// `init` wire payload: the top-level candidates selected for a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct InitPayload {
    pub source_ids: Vec<String>,
}

/// `start` wire payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartPayload {
    pub id: String,
}

/// `update` wire payload: a direct status/progress transition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct UpdatePayload {
    pub id: String,
    pub status: CandidateStatus,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reason: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub error: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub percentage: u8,
}

/// `discoverEmbeds` wire payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DiscoverEmbedsPayload {
    pub source_id: String,
    pub embeds: Vec<DiscoveredEmbed>,
}

/// One lifecycle event, as ingested by the engine. Every strategy produces
/// these in its own order; the engine applies them in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeEvent {
    Init(InitPayload),
    Start(StartPayload),
    Update(UpdatePayload),
    DiscoverEmbeds(DiscoverEmbedsPayload),
}

impl ScrapeEvent {
    pub fn init(source_ids: Vec<String>) -> Self {
        ScrapeEvent::Init(InitPayload { source_ids })
    }

    pub fn start(id: impl Into<String>) -> Self {
        ScrapeEvent::Start(StartPayload { id: id.into() })
    }

    pub fn update(
        id: impl Into<String>,
        status: CandidateStatus,
        reason: Option<String>,
        error: Option<String>,
        percentage: u8,
    ) -> Self {
        ScrapeEvent::Update(UpdatePayload {
            id: id.into(),
            status,
            reason,
            error,
            percentage,
        })
    }

    pub fn discover_embeds(
        source_id: impl Into<String>,
        embeds: Vec<DiscoveredEmbed>,
    ) -> Self {
        ScrapeEvent::DiscoverEmbeds(DiscoverEmbedsPayload {
            source_id: source_id.into(),
            embeds,
        })
    }
}
