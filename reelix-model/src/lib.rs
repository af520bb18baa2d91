//! Core data model definitions shared across Reelix crates.
#![allow(missing_docs)]

pub mod candidate;
pub mod error;
pub mod events;
pub mod media;
pub mod mirror;
pub mod stream;

// Intentionally curated re-exports for downstream consumers.
pub use candidate::{Candidate, CandidateStatus};
pub use error::{ModelError, Result as ModelResult};
pub use events::{
    DiscoveredEmbed, DiscoverEmbedsPayload, InitPayload, ScrapeEvent,
    ScraperInfo, StartPayload, UpdatePayload,
};
pub use media::{MediaDescriptor, MediaIdentity, MediaKind};
pub use mirror::{MirrorServer, MirrorSource, MirrorSubtitle};
pub use stream::{
    CaptionFormat, CaptionTrack, PlayableStream, StreamFlag, StreamKind,
    StreamResult,
};
