//! Local feed store.
//!
//! A JSON array of posts in a single file. Reads never fail: a missing,
//! unreadable or malformed file is an empty feed, and malformed entries are
//! dropped on the way in.

use std::path::{Path, PathBuf};

use hanvas_models::{normalize_feed, prepend_post, CommunityPost};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone)]
pub struct LocalFeedStore {
    path: PathBuf,
}

impl LocalFeedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored feed, newest first.
    pub async fn load(&self) -> Vec<CommunityPost> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read local feed");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(raw) => normalize_feed(&raw),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Local feed is not valid JSON");
                Vec::new()
            }
        }
    }

    /// Replace the stored feed.
    pub async fn save(&self, posts: &[CommunityPost]) -> SyncResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(posts)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| SyncError::io(&self.path, e))?;

        debug!(path = %self.path.display(), posts = posts.len(), "Local feed saved");
        Ok(())
    }

    /// Prepend a post stamped now, cap, persist, and return the new feed.
    pub async fn publish(&self, image_data_url: &str) -> SyncResult<Vec<CommunityPost>> {
        let current = self.load().await;
        let updated = prepend_post(&current, CommunityPost::new(image_data_url));
        self.save(&updated).await?;
        Ok(updated)
    }
}
