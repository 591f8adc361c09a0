//! reqwest implementation of the REST API and the push stream transport.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

use super::{ApiError, DownloadApi};
use crate::config::SyncConfig;
use crate::job::{JobRecord, StartRequest};
use crate::stream::{EventByteStream, EventTransport, StreamKey};

/// HTTP client bound to one service origin. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base: Url,
}

impl HttpClient {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("dlsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn from_config(cfg: &SyncConfig) -> Result<Self, ApiError> {
        Self::new(
            &cfg.api_base_url,
            Duration::from_secs(cfg.connect_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/api/downloads/{segments...}`, with each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "downloads"])
                .extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, "api request");
        self.client.request(method, url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base url".to_string()));
    }
    Ok(url)
}

/// Turn a non-success status into [`ApiError::Http`].
fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ApiError::Http {
            status: status.as_u16(),
        })
    }
}

async fn read_json<D: serde::de::DeserializeOwned>(resp: Response) -> Result<D, ApiError> {
    let body = check(resp)?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

impl DownloadApi for HttpClient {
    async fn list(&self) -> Result<Vec<JobRecord>, ApiError> {
        let resp = self.request(Method::GET, &[]).send().await?;
        read_json(resp).await
    }

    async fn create(&self, request: &StartRequest) -> Result<JobRecord, ApiError> {
        let resp = self
            .request(Method::POST, &[])
            .json(request)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let resp = self.request(Method::DELETE, &[id]).send().await?;
        check(resp).map(drop)
    }

    async fn pause(&self, id: &str) -> Result<(), ApiError> {
        let resp = self.request(Method::POST, &[id, "pause"]).send().await?;
        check(resp).map(drop)
    }

    async fn resume(&self, id: &str) -> Result<(), ApiError> {
        let resp = self.request(Method::POST, &[id, "resume"]).send().await?;
        check(resp).map(drop)
    }
}

impl EventTransport for HttpClient {
    async fn open(&self, key: &StreamKey) -> Result<EventByteStream, ApiError> {
        let req = match key {
            StreamKey::All => self.request(Method::GET, &["stream"]),
            StreamKey::Job(id) => self.request(Method::GET, &[id.as_str(), "stream"]),
        };
        let resp = req
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let body = check(resp)?
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(ApiError::from));
        Ok(body.boxed())
    }
}
