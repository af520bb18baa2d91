use std::fmt::{self, Display};

use crate::error::ModelError;
use crate::mirror::MirrorServer;

/// Content kind of a scrape request. Serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaKind {
    Movie,
    Series,
    Anime,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Anime => "anime",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable scrape request. A change in any identity field invalidates all
/// in-flight scrape state for the previous descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaDescriptor {
    /// External title id (opaque to the engine).
    pub id: String,
    pub kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Pre-resolved mirror list, when the caller already holds one. An empty
    /// list means the sequential mirror path has nothing to try.
    #[cfg_attr(feature = "serde", serde(default))]
    pub servers: Vec<MirrorServer>,
}

impl MediaDescriptor {
    pub fn movie(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Movie,
            season: None,
            episode: None,
            servers: Vec::new(),
        }
    }

    pub fn series(id: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Series,
            season: Some(season),
            episode: Some(episode),
            servers: Vec::new(),
        }
    }

    pub fn anime(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Anime,
            season: None,
            episode: None,
            servers: Vec::new(),
        }
    }

    pub fn with_servers(mut self, servers: Vec<MirrorServer>) -> Self {
        self.servers = servers;
        self
    }

    /// Identity tuple of the request. Mirror lists do not participate: two
    /// descriptors for the same title are the same run target even if one
    /// carries a resolved server list.
    pub fn identity(&self) -> MediaIdentity {
        MediaIdentity {
            id: self.id.clone(),
            kind: self.kind,
            season: self.season,
            episode: self.episode,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.is_empty() {
            return Err(ModelError::InvalidDescriptor(
                "id cannot be empty".to_string(),
            ));
        }
        if self.kind == MediaKind::Series
            && (self.season.is_none() || self.episode.is_none())
        {
            return Err(ModelError::InvalidDescriptor(
                "series descriptors require season and episode".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derived identity of a descriptor, used to tag runs and reject stale events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaIdentity {
    pub id: String,
    pub kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl Display for MediaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => {
                write!(f, "{}:{} s{season:02}e{episode:02}", self.kind, self.id)
            }
            _ => write!(f, "{}:{}", self.kind, self.id),
        }
    }
}
