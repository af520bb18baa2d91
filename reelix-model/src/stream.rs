//! Terminal success payload of a scrape run.

/// Delivery kind of a resolved stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StreamKind {
    /// Segmented playlist (HLS).
    Hls,
    /// Direct file.
    File,
}

/// Capability flags attached to a stream by the producing scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StreamFlag {
    /// The stream host permits cross-origin playback.
    CorsAllowed,
    /// Requests must carry an IP-locked token.
    IpLocked,
}

/// Text caption formats the player understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CaptionFormat {
    Vtt,
    Srt,
}

/// One subtitle track attached to a resolved stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CaptionTrack {
    pub id: String,
    pub url: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub format: CaptionFormat,
    /// ISO language code when one could be derived, else the raw label.
    pub language: String,
    pub has_cors_restrictions: bool,
}

/// Playable stream descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlayableStream {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: StreamKind,
    /// Playlist url for `Hls`, file location for `File`.
    pub playlist: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: Vec<StreamFlag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub captions: Vec<CaptionTrack>,
}

/// The single terminal output of a successful run: the stream plus the id of
/// the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StreamResult {
    pub stream: PlayableStream,
    /// Winning top-level candidate id.
    pub source_id: String,
    /// Winning embed id, when the stream came from a discovered embed.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub embed_id: Option<String>,
}

impl StreamResult {
    pub fn new(stream: PlayableStream, source_id: impl Into<String>) -> Self {
        Self {
            stream,
            source_id: source_id.into(),
            embed_id: None,
        }
    }
}
