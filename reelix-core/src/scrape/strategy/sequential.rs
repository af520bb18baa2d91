//! Sequential mirror fallback.
//!
//! Walks a descriptor's pre-resolved mirror list in rank order, one
//! blocking fetch at a time, and stops at the first mirror that yields a
//! non-empty playable location. No retries: each mirror is attempted
//! exactly once per run.

use async_trait::async_trait;
use reelix_model::{
    CandidateStatus, CaptionFormat, CaptionTrack, MediaDescriptor,
    MirrorSubtitle, PlayableStream, ScrapeEvent, StreamFlag, StreamKind,
    StreamResult,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::language::label_to_language_code;
use crate::mirror::MirrorApi;
use crate::scrape::sink::EventSink;
use crate::scrape::strategy::{ScrapeStrategy, StrategyError};

const FETCH_FAILED_REASON: &str = "Failed to fetch source";

/// Tries each mirror of the descriptor once, in list order.
pub struct SequentialMirrorStrategy {
    api: Arc<dyn MirrorApi>,
}

impl std::fmt::Debug for SequentialMirrorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialMirrorStrategy").finish()
    }
}

impl SequentialMirrorStrategy {
    pub fn new(api: Arc<dyn MirrorApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ScrapeStrategy for SequentialMirrorStrategy {
    async fn drive(
        &self,
        descriptor: &MediaDescriptor,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<Option<StreamResult>, StrategyError> {
        if descriptor.servers.is_empty() {
            // Nothing to try; resolve without a single fetch.
            return Ok(None);
        }

        sink.emit(ScrapeEvent::init(
            descriptor
                .servers
                .iter()
                .map(|server| server.handle.clone())
                .collect(),
        ));

        for server in &descriptor.servers {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            sink.emit(ScrapeEvent::start(&server.handle));

            // One fetch per mirror. An in-flight fetch is allowed to finish
            // even if the run is abandoned; its result is discarded by the
            // run tag at the sink.
            match self.api.fetch_source(&server.handle).await {
                Ok(source) if !source.is_empty() => {
                    debug!(mirror = %server.name, "mirror produced a stream");
                    let stream = PlayableStream {
                        id: server.handle.clone(),
                        kind: StreamKind::Hls,
                        playlist: source.location,
                        flags: vec![StreamFlag::CorsAllowed],
                        captions: source
                            .subtitles
                            .into_iter()
                            .map(caption_from_subtitle)
                            .collect(),
                    };
                    // The terminal success status is the orchestrator's
                    // call, made once the output is confirmed.
                    return Ok(Some(StreamResult::new(stream, &server.handle)));
                }
                Ok(_) => {
                    sink.emit(ScrapeEvent::update(
                        &server.handle,
                        CandidateStatus::Failure,
                        Some(FETCH_FAILED_REASON.to_string()),
                        Some("source not found".to_string()),
                        100,
                    ));
                }
                Err(err) => {
                    sink.emit(ScrapeEvent::update(
                        &server.handle,
                        CandidateStatus::Failure,
                        Some(FETCH_FAILED_REASON.to_string()),
                        Some(err.to_string()),
                        100,
                    ));
                }
            }
        }

        Ok(None)
    }
}

/// Caption track for one mirror subtitle entry: explicit language code if
/// present, else the label mapped through the lookup table, else the raw
/// label; format defaults to vtt.
fn caption_from_subtitle(subtitle: MirrorSubtitle) -> CaptionTrack {
    let language = subtitle
        .language_code
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| {
            label_to_language_code(&subtitle.label)
                .map(str::to_string)
                .unwrap_or_else(|| subtitle.label.clone())
        });
    CaptionTrack {
        id: subtitle.file.clone(),
        url: subtitle.file,
        format: subtitle.format.unwrap_or(CaptionFormat::Vtt),
        language,
        has_cors_restrictions: false,
    }
}
