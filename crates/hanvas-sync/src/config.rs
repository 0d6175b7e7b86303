//! Feed sync configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Community feed client configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the feed server (default: http://localhost:8000)
    pub server_url: String,
    /// JSON file used as the local feed store
    pub local_feed_path: PathBuf,
    /// Request timeout (default: 10s)
    pub timeout: Duration,
    /// Connect timeout (default: 5s)
    pub connect_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            local_feed_path: PathBuf::from("hanvas-community-posts.json"),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl SyncConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_url: std::env::var("HANVAS_SERVER_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.server_url),
            local_feed_path: std::env::var("HANVAS_LOCAL_FEED_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_feed_path),
            timeout: std::env::var("HANVAS_SYNC_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: defaults.connect_timeout,
        }
    }
}
