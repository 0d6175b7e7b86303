//! Community feed synchronization with local fallback.
//!
//! Starts in [`SyncMode::Remote`]. The first remote failure (network error,
//! non-success status, malformed body) switches the session to
//! [`SyncMode::Local`] for good: every later fetch and publish goes to the
//! local store, and the remote is not retried until a new session starts.

use hanvas_models::CommunityPost;
use tracing::{info, warn};

use crate::client::{FeedClient, RemoteFeed};
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::local::LocalFeedStore;
use crate::metrics::record_fallback;

/// Shown when a feed read falls back to local storage.
pub const FETCH_FALLBACK_MESSAGE: &str =
    "Community server unavailable. Showing drawings saved on this device.";

/// Shown when a publish falls back to local storage.
pub const PUBLISH_FALLBACK_MESSAGE: &str =
    "Community server unavailable. Drawing saved on this device instead.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Remote,
    Local,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Remote => "remote",
            SyncMode::Local => "local",
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a fetch or publish.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub posts: Vec<CommunityPost>,
    pub mode: SyncMode,
    /// User-facing note, set when this call fell back to local storage.
    pub message: Option<String>,
}

pub struct CommunitySync {
    remote: Box<dyn RemoteFeed>,
    local: LocalFeedStore,
    mode: SyncMode,
    feed: Vec<CommunityPost>,
}

impl CommunitySync {
    pub fn new(remote: Box<dyn RemoteFeed>, local: LocalFeedStore) -> Self {
        Self {
            remote,
            local,
            mode: SyncMode::Remote,
            feed: Vec::new(),
        }
    }

    /// HTTP client plus local store from config.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let remote = FeedClient::new(config)?;
        Ok(Self::new(
            Box::new(remote),
            LocalFeedStore::new(config.local_feed_path.clone()),
        ))
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Current view of the feed.
    pub fn feed(&self) -> &[CommunityPost] {
        &self.feed
    }

    fn fall_back(&mut self, operation: &str, error: &dyn std::fmt::Display) {
        warn!(operation, error = %error, "Remote feed failed, switching to local storage");
        record_fallback(operation);
        self.mode = SyncMode::Local;
    }

    fn report(&mut self, posts: Vec<CommunityPost>, message: Option<&str>) -> SyncReport {
        self.feed = posts.clone();
        SyncReport {
            posts,
            mode: self.mode,
            message: message.map(str::to_string),
        }
    }

    /// Load the feed. Never fails: remote errors fall back to local storage.
    pub async fn fetch_feed(&mut self) -> SyncReport {
        if self.mode == SyncMode::Local {
            let posts = self.local.load().await;
            return self.report(posts, None);
        }

        let fetched = self.remote.fetch_posts().await;
        match fetched {
            Ok(posts) => {
                info!(posts = posts.len(), "Community feed loaded");
                self.report(posts, None)
            }
            Err(e) => {
                self.fall_back("fetch", &e);
                let posts = self.local.load().await;
                self.report(posts, Some(FETCH_FALLBACK_MESSAGE))
            }
        }
    }

    /// Share a snapshot. Only a local write failure is an error.
    pub async fn publish(&mut self, image_data_url: &str) -> SyncResult<SyncReport> {
        let mut message = None;
        if self.mode == SyncMode::Remote {
            let published = self.remote.publish(image_data_url).await;
            match published {
                Ok(posts) => {
                    info!(posts = posts.len(), "Shared to community feed");
                    return Ok(self.report(posts, None));
                }
                Err(e) => {
                    self.fall_back("publish", &e);
                    message = Some(PUBLISH_FALLBACK_MESSAGE);
                }
            }
        }

        let posts = self.local.publish(image_data_url).await?;
        info!(posts = posts.len(), path = %self.local.path().display(), "Saved drawing to local feed");
        Ok(self.report(posts, message))
    }
}
