//! Mirror endpoint client.
//!
//! Mirrors are fixed fallback endpoints queried without plugin discovery:
//! one call lists the ranked servers for a title, a second fetches the
//! source payload for a chosen server's handle.

use async_trait::async_trait;
use reelix_model::{MediaDescriptor, MirrorServer, MirrorSource};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("mirror endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid mirror url: {0}")]
    InvalidUrl(String),
}

/// Contract of the mirror endpoint collaborator. An empty `location` in a
/// fetched source is the canonical "not found" signal, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MirrorApi: Send + Sync {
    /// Ranked servers for a descriptor, in attempt-priority order.
    async fn list_servers(
        &self,
        descriptor: &MediaDescriptor,
    ) -> Result<Vec<MirrorServer>, MirrorError>;

    /// Source payload for one server handle.
    async fn fetch_source(
        &self,
        handle: &str,
    ) -> Result<MirrorSource, MirrorError>;
}

#[derive(Debug, Deserialize)]
struct ServersEnvelope {
    data: Vec<MirrorServer>,
}

#[derive(Debug, Deserialize)]
struct SourceEnvelope {
    data: MirrorSource,
}

/// HTTP implementation of [`MirrorApi`].
#[derive(Debug, Clone)]
pub struct HttpMirrorApi {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl HttpMirrorApi {
    pub fn new(base: Url, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            api_key: api_key.into(),
        }
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, MirrorError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }

    fn join(&self, segments: &[&str]) -> Result<Url, MirrorError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                MirrorError::InvalidUrl(self.base.to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl MirrorApi for HttpMirrorApi {
    async fn list_servers(
        &self,
        descriptor: &MediaDescriptor,
    ) -> Result<Vec<MirrorServer>, MirrorError> {
        let mut url = self.join(&[&descriptor.id, "servers"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("type", descriptor.kind.as_str());
            // Season and episode travel together or not at all.
            if let (Some(season), Some(episode)) =
                (descriptor.season, descriptor.episode)
            {
                query.append_pair("season", &season.to_string());
                query.append_pair("episode", &episode.to_string());
            }
            if !self.api_key.is_empty() {
                query.append_pair("key", &self.api_key);
            }
        }

        let envelope: ServersEnvelope = self.get_json(url).await?;
        Ok(envelope.data)
    }

    async fn fetch_source(
        &self,
        handle: &str,
    ) -> Result<MirrorSource, MirrorError> {
        let url = self.join(&["source", handle])?;
        let envelope: SourceEnvelope = self.get_json(url).await?;
        Ok(envelope.data)
    }
}
