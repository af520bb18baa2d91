use reelix_model::MediaIdentity;
use thiserror::Error;

/// Run-level failures surfaced to callers. Per-candidate failures never show
/// up here; they are only visible through [`crate::scrape::SegmentStore`]
/// snapshots.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("a scrape run is already active for {active} (requested {requested})")]
    ConcurrentRunRejected {
        active: MediaIdentity,
        requested: MediaIdentity,
    },

    #[error("media is disallowed: {0}")]
    DisallowedMedia(MediaIdentity),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(#[from] reelix_model::ModelError),

    #[error("no remote endpoint configured")]
    NoRemoteEndpoint,

    #[error("no mirror endpoint configured")]
    NoMirrorEndpoint,

    #[error("mirror endpoint failure: {0}")]
    Mirror(#[from] crate::mirror::MirrorError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
