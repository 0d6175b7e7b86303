//! File-backed community feed.
//!
//! The feed is one pretty-printed JSON array on disk. Reads never fail on
//! bad content: a missing, unreadable or malformed file reads as an empty
//! feed. Writes are serialized behind a mutex so concurrent posts cannot
//! drop each other.

use std::path::{Path, PathBuf};

use hanvas_models::{normalize_feed, prepend_post, CommunityPost};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ApiResult;

/// Feed file name inside the data directory.
pub const POSTS_FILE: &str = "community-posts.json";

#[derive(Debug)]
pub struct FilePostStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePostStore {
    /// Open the store under `data_dir`, creating the directory and an empty
    /// feed file when they are missing.
    pub async fn open(data_dir: &Path) -> ApiResult<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(POSTS_FILE);
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, "[]").await?;
            info!(path = %path.display(), "Created empty community feed");
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current feed, newest first.
    pub async fn read_posts(&self) -> Vec<CommunityPost> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read community feed");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(raw) => normalize_feed(&raw),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Community feed is not valid JSON");
                Vec::new()
            }
        }
    }

    async fn write_posts(&self, posts: &[CommunityPost]) -> ApiResult<()> {
        // The data directory may have been removed since open
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(posts)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Prepend a post for `image_data_url` and persist the capped feed.
    pub async fn create(&self, image_data_url: &str) -> ApiResult<(CommunityPost, Vec<CommunityPost>)> {
        let _guard = self.write_lock.lock().await;

        let post = CommunityPost::new(image_data_url);
        let feed = self.read_posts().await;
        let posts = prepend_post(&feed, post.clone());
        self.write_posts(&posts).await?;

        debug!(feed_size = posts.len(), "Community post stored");
        Ok((post, posts))
    }
}
