//! Remote delegation over a server-streamed connection.
//!
//! The remote orchestration service speaks the same four lifecycle events
//! as the local fan-out, as named SSE events, plus exactly one terminal
//! event per run: `completed` carrying the result, or `noOutput`. Unknown
//! event names are ignored so the protocol can grow; transport faults are
//! never reinterpreted as exhaustion.

use async_trait::async_trait;
use futures::StreamExt;
use reelix_model::{
    DiscoverEmbedsPayload, InitPayload, MediaDescriptor, ScrapeEvent,
    ScraperInfo, StartPayload, StreamResult, UpdatePayload,
};
use reqwest_eventsource::{Event, EventSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::StaticCatalog;
use crate::scrape::sink::EventSink;
use crate::scrape::strategy::{ScrapeStrategy, StrategyError};

/// One decoded SSE frame.
#[derive(Debug)]
enum Frame {
    Event(ScrapeEvent),
    Completed(Box<StreamResult>),
    NoOutput,
    Ignored,
}

/// Decode a named SSE frame into the engine vocabulary.
///
/// Unknown names decode to `Ignored`; a malformed payload for a known name
/// is a protocol fault the caller turns into a transport failure.
fn decode_frame(
    message: &eventsource_stream::Event,
) -> Result<Frame, serde_json::Error> {
    let data = message.data.as_str();
    match message.event.as_str() {
        "init" => serde_json::from_str::<InitPayload>(data)
            .map(|payload| Frame::Event(ScrapeEvent::Init(payload))),
        "start" => serde_json::from_str::<StartPayload>(data)
            .map(|payload| Frame::Event(ScrapeEvent::Start(payload))),
        "update" => serde_json::from_str::<UpdatePayload>(data)
            .map(|payload| Frame::Event(ScrapeEvent::Update(payload))),
        "discoverEmbeds" => serde_json::from_str::<DiscoverEmbedsPayload>(data)
            .map(|payload| Frame::Event(ScrapeEvent::DiscoverEmbeds(payload))),
        "completed" => serde_json::from_str::<StreamResult>(data)
            .map(|result| Frame::Completed(Box::new(result))),
        "noOutput" => Ok(Frame::NoOutput),
        other => {
            debug!(event = other, "unknown remote scrape event ignored");
            Ok(Frame::Ignored)
        }
    }
}

/// Append one path segment to an endpoint base, tolerating a trailing slash.
fn endpoint_path(base: &Url, segment: &str) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().push(segment);
    Some(url)
}

/// Stream url for one run: `{base}/scrape` keyed by the descriptor.
fn scrape_stream_url(
    base: &Url,
    descriptor: &MediaDescriptor,
) -> Result<Url, StrategyError> {
    let mut url = endpoint_path(base, "scrape").ok_or_else(|| {
        StrategyError::Transport(format!("invalid remote endpoint: {base}"))
    })?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("type", descriptor.kind.as_str());
        query.append_pair("id", &descriptor.id);
        if let (Some(season), Some(episode)) =
            (descriptor.season, descriptor.episode)
        {
            query.append_pair("season", &season.to_string());
            query.append_pair("episode", &episode.to_string());
        }
    }
    Ok(url)
}

/// Prefetch the remote service's scraper metadata, used to label candidates.
///
/// A failed prefetch degrades labels to raw ids; it never blocks a run.
pub async fn fetch_remote_catalog(
    http: &reqwest::Client,
    base: &Url,
) -> StaticCatalog {
    let Some(url) = endpoint_path(base, "metadata") else {
        warn!(endpoint = %base, "invalid remote metadata url");
        return StaticCatalog::default();
    };
    let entries = async {
        http.get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ScraperInfo>>()
            .await
    }
    .await;

    match entries {
        Ok(entries) => StaticCatalog::new(entries),
        Err(err) => {
            warn!(%err, "remote scraper metadata prefetch failed");
            StaticCatalog::default()
        }
    }
}

/// Delegates a run to the remote orchestration service.
#[derive(Debug)]
pub struct RemoteDelegatedStrategy {
    endpoint: Url,
}

impl RemoteDelegatedStrategy {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ScrapeStrategy for RemoteDelegatedStrategy {
    async fn drive(
        &self,
        descriptor: &MediaDescriptor,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<Option<StreamResult>, StrategyError> {
        let url = scrape_stream_url(&self.endpoint, descriptor)?;
        let mut source = EventSource::get(url);

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    // Descriptor change or reset: close the connection. The
                    // run tag already invalidated anything we would return.
                    source.close();
                    return Ok(None);
                }
                event = source.next() => event,
            };

            match event {
                Some(Ok(Event::Open)) => {
                    debug!(endpoint = %self.endpoint, "remote scrape stream opened");
                }
                Some(Ok(Event::Message(message))) => {
                    match decode_frame(&message) {
                        Ok(Frame::Event(event)) => sink.emit(event),
                        Ok(Frame::Completed(result)) => {
                            source.close();
                            return Ok(Some(*result));
                        }
                        Ok(Frame::NoOutput) => {
                            source.close();
                            return Ok(None);
                        }
                        Ok(Frame::Ignored) => {}
                        Err(err) => {
                            source.close();
                            return Err(StrategyError::Transport(format!(
                                "malformed {} frame: {err}",
                                message.event
                            )));
                        }
                    }
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                    source.close();
                    return Err(StrategyError::Transport(
                        "stream ended before a terminal signal".to_string(),
                    ));
                }
                Some(Err(err)) => {
                    source.close();
                    return Err(StrategyError::Transport(err.to_string()));
                }
            }
        }
    }
}
