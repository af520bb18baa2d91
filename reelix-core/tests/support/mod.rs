//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reelix_core::mirror::{MirrorApi, MirrorError};
use reelix_core::scrape::{
    EventSink, ProviderRuntime, ProviderRuntimeError,
};
use reelix_model::{
    MediaDescriptor, MirrorServer, MirrorSource, ScrapeEvent, ScraperInfo,
    StreamResult,
};
use tokio_util::sync::CancellationToken;

/// Route engine tracing into the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mirror endpoint fake: scripted responses per handle, recorded fetch order.
#[derive(Default)]
pub struct FakeMirrorApi {
    responses: Mutex<Vec<(String, Result<MirrorSource, String>)>>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeMirrorApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_fetch(self, handle: &str, response: Result<MirrorSource, &str>) -> Self {
        self.responses.lock().unwrap().push((
            handle.to_string(),
            response.map_err(|message| message.to_string()),
        ));
        self
    }

    pub fn fetch_order(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MirrorApi for FakeMirrorApi {
    async fn list_servers(
        &self,
        _descriptor: &MediaDescriptor,
    ) -> Result<Vec<MirrorServer>, MirrorError> {
        Ok(Vec::new())
    }

    async fn fetch_source(
        &self,
        handle: &str,
    ) -> Result<MirrorSource, MirrorError> {
        self.fetched.lock().unwrap().push(handle.to_string());
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(scripted_handle, _)| scripted_handle == handle)
            .map(|(_, response)| response.clone());
        match scripted {
            Some(Ok(source)) => Ok(source),
            Some(Err(message)) => Err(MirrorError::InvalidUrl(message)),
            None => Err(MirrorError::InvalidUrl(format!(
                "no scripted response for {handle}"
            ))),
        }
    }
}

pub fn empty_source() -> MirrorSource {
    MirrorSource {
        location: String::new(),
        thumbnail_location: String::new(),
        subtitles: Vec::new(),
    }
}

pub fn playable_source(location: &str) -> MirrorSource {
    MirrorSource {
        location: location.to_string(),
        thumbnail_location: String::new(),
        subtitles: Vec::new(),
    }
}

/// Provider runtime fake: replays a scripted event sequence, then resolves
/// with the scripted output. Optionally parks until released, for tests
/// that need a run caught mid-flight.
pub struct ScriptedRuntime {
    pub catalog: Vec<ScraperInfo>,
    pub events: Vec<ScrapeEvent>,
    pub output: Option<StreamResult>,
    pub fail_with: Option<String>,
    pub hold: Option<Arc<tokio::sync::Notify>>,
    pub seen_order: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    pub fn new(events: Vec<ScrapeEvent>, output: Option<StreamResult>) -> Self {
        Self {
            catalog: vec![
                ScraperInfo::new("p1", "Provider One"),
                ScraperInfo::new("p2", "Provider Two"),
                ScraperInfo::new("x", "Embed X"),
            ],
            events,
            output,
            fail_with: None,
            hold: None,
            seen_order: Mutex::new(Vec::new()),
        }
    }

    pub fn holding(mut self, gate: Arc<tokio::sync::Notify>) -> Self {
        self.hold = Some(gate);
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(Vec::new(), None)
        }
    }
}

#[async_trait]
impl ProviderRuntime for ScriptedRuntime {
    fn sources(&self) -> Vec<ScraperInfo> {
        self.catalog.clone()
    }

    fn embeds(&self) -> Vec<ScraperInfo> {
        Vec::new()
    }

    async fn run_all<'e>(
        &self,
        _descriptor: &MediaDescriptor,
        preferred_order: &[String],
        events: &(dyn EventSink + 'e),
        cancel: CancellationToken,
    ) -> Result<Option<StreamResult>, ProviderRuntimeError> {
        *self.seen_order.lock().unwrap() = preferred_order.to_vec();
        if let Some(message) = &self.fail_with {
            return Err(ProviderRuntimeError(message.clone()));
        }
        for event in &self.events {
            events.emit(event.clone());
        }
        if let Some(gate) = &self.hold {
            tokio::select! {
                _ = gate.notified() => {}
                _ = cancel.cancelled() => {}
            }
        }
        Ok(self.output.clone())
    }
}

/// Minimal remote orchestration stub: serves `/metadata` as JSON and
/// `/scrape` as one SSE stream of the scripted frames, then drops the
/// connection. A frame list without a terminal event therefore doubles as
/// a transport-fault script.
pub async fn spawn_remote_stub(
    metadata_json: &'static str,
    frames: Vec<(&'static str, &'static str)>,
) -> url::Url {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let frames = frames.clone();
            tokio::spawn(async move {
                // Drain the request head.
                let mut head = Vec::new();
                let mut byte = [0u8; 1];
                while !head.ends_with(b"\r\n\r\n") {
                    match socket.read(&mut byte).await {
                        Ok(0) | Err(_) => return,
                        Ok(_) => head.push(byte[0]),
                    }
                }
                let head = String::from_utf8_lossy(&head);
                let path = head
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();

                if path.starts_with("/metadata") {
                    let body = metadata_json;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    return;
                }

                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n",
                    )
                    .await;
                for (event, data) in frames {
                    let frame = format!("event: {event}\ndata: {data}\n\n");
                    if socket.write_all(frame.as_bytes()).await.is_err() {
                        return;
                    }
                }
                let _ = socket.flush().await;
            });
        }
    });

    url::Url::parse(&format!("http://{addr}/")).expect("stub url")
}

/// A runtime that must never be driven; trips the test if it is.
pub struct UnusedRuntime;

#[async_trait]
impl ProviderRuntime for UnusedRuntime {
    fn sources(&self) -> Vec<ScraperInfo> {
        Vec::new()
    }

    fn embeds(&self) -> Vec<ScraperInfo> {
        Vec::new()
    }

    async fn run_all<'e>(
        &self,
        _descriptor: &MediaDescriptor,
        _preferred_order: &[String],
        _events: &(dyn EventSink + 'e),
        _cancel: CancellationToken,
    ) -> Result<Option<StreamResult>, ProviderRuntimeError> {
        panic!("provider runtime driven unexpectedly");
    }
}
