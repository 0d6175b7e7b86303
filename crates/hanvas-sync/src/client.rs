//! Remote community feed client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use hanvas_models::{normalize_feed, CommunityPost, CreatePostRequest};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, info_span, Instrument};
use url::Url;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::metrics::record_request;

/// Feed endpoint, relative to the server base URL.
pub const POSTS_PATH: &str = "api/community-posts";

/// A feed store reachable over the network.
#[async_trait]
pub trait RemoteFeed: Send + Sync {
    /// Current feed, newest first.
    async fn fetch_posts(&self) -> SyncResult<Vec<CommunityPost>>;

    /// Submit a snapshot; returns the updated feed.
    async fn publish(&self, image_data_url: &str) -> SyncResult<Vec<CommunityPost>>;
}

/// HTTP client for `/api/community-posts`.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    endpoint: Url,
}

impl FeedClient {
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("hanvas-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: posts_endpoint(&config.server_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Turn a response into the feed it carries.
    async fn read_feed(operation: &str, started: Instant, response: Response) -> SyncResult<Vec<CommunityPost>> {
        let status = response.status();
        record_request(operation, status.as_u16(), started.elapsed().as_secs_f64() * 1000.0);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(SyncError::HttpStatus(status.as_u16(), message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SyncError::invalid_response(e.to_string()))?;
        let posts = body
            .get("posts")
            .filter(|posts| posts.is_array())
            .ok_or_else(|| SyncError::invalid_response("response has no posts list"))?;

        let feed = normalize_feed(posts);
        debug!(operation, posts = feed.len(), "Feed received");
        Ok(feed)
    }
}

#[async_trait]
impl RemoteFeed for FeedClient {
    async fn fetch_posts(&self) -> SyncResult<Vec<CommunityPost>> {
        let span = info_span!("feed_fetch", url = %self.endpoint);
        let started = Instant::now();

        let sent = self
            .http
            .get(self.endpoint.clone())
            .send()
            .instrument(span.clone())
            .await;
        let response = sent.map_err(|e| {
            record_request("fetch", 0, started.elapsed().as_secs_f64() * 1000.0);
            SyncError::Network(e)
        })?;

        Self::read_feed("fetch", started, response).instrument(span).await
    }

    async fn publish(&self, image_data_url: &str) -> SyncResult<Vec<CommunityPost>> {
        let span = info_span!("feed_publish", url = %self.endpoint, bytes = image_data_url.len());
        let started = Instant::now();
        let request = CreatePostRequest {
            image_data_url: image_data_url.to_string(),
        };

        let sent = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .instrument(span.clone())
            .await;
        let response = sent.map_err(|e| {
            record_request("publish", 0, started.elapsed().as_secs_f64() * 1000.0);
            SyncError::Network(e)
        })?;

        Self::read_feed("publish", started, response).instrument(span).await
    }
}

/// `<base>/api/community-posts`, keeping any path prefix on the base.
fn posts_endpoint(server_url: &str) -> SyncResult<Url> {
    let mut base = Url::parse(server_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(POSTS_PATH)?)
}
