//! Wire types for the mirror endpoint collaborator.
//!
//! Field renames follow the mirror service's JSON: a server's opaque handle
//! travels as `hash`, a source's playable location as `source`. An empty
//! `location` is the canonical "not found" signal, not an error.

use crate::stream::CaptionFormat;

/// One ranked mirror endpoint: display name plus an opaque fetch handle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MirrorServer {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "hash"))]
    pub handle: String,
}

impl MirrorServer {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
        }
    }
}

/// Source payload fetched for one mirror handle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MirrorSource {
    #[cfg_attr(feature = "serde", serde(rename = "source"))]
    pub location: String,
    #[cfg_attr(feature = "serde", serde(rename = "thumbnails", default))]
    pub thumbnail_location: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subtitles: Vec<MirrorSubtitle>,
}

impl MirrorSource {
    /// Empty location means the mirror had nothing for this title.
    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }
}

/// One subtitle entry as the mirror service reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MirrorSubtitle {
    /// Caption format; absent means the canonical text format (vtt).
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", default, skip_serializing_if = "Option::is_none")
    )]
    pub format: Option<CaptionFormat>,
    /// Location of the subtitle file; doubles as the track id.
    pub file: String,
    /// Human-readable language label, e.g. "Dutch".
    pub label: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub language_code: Option<String>,
}
