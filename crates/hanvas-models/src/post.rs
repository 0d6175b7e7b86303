//! Community feed posts.

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of posts retained by any feed store.
pub const MAX_POSTS: usize = 50;

/// A shared drawing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    /// `data:` URI holding the encoded image.
    pub image_data_url: String,
    /// ISO-8601 timestamp, kept as the string the store holds.
    pub shared_at: String,
}

impl CommunityPost {
    /// Create a post stamped with the current time.
    pub fn new(image_data_url: impl Into<String>) -> Self {
        Self::new_at(image_data_url, Utc::now())
    }

    pub fn new_at(image_data_url: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            image_data_url: image_data_url.into(),
            shared_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Accept only entries whose payload and timestamp are both strings.
    fn from_value(value: &Value) -> Option<Self> {
        let image_data_url = value.get("imageDataUrl")?.as_str()?;
        let shared_at = value.get("sharedAt")?.as_str()?;
        Some(Self {
            image_data_url: image_data_url.to_string(),
            shared_at: shared_at.to_string(),
        })
    }
}

/// Filter a raw JSON feed down to well-formed posts, capped at [`MAX_POSTS`].
///
/// Anything that is not a JSON array yields an empty feed.
pub fn normalize_feed(raw: &Value) -> Vec<CommunityPost> {
    match raw.as_array() {
        Some(items) => items
            .iter()
            .filter_map(CommunityPost::from_value)
            .take(MAX_POSTS)
            .collect(),
        None => Vec::new(),
    }
}

/// Put `post` at the front of `feed` and drop whatever falls past the cap.
pub fn prepend_post(feed: &[CommunityPost], post: CommunityPost) -> Vec<CommunityPost> {
    std::iter::once(post)
        .chain(feed.iter().cloned())
        .take(MAX_POSTS)
        .collect()
}

// ============================================================================
// API Request/Response Types
// ============================================================================

/// `POST /api/community-posts` body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub image_data_url: String,
}

/// `GET /api/community-posts` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PostsResponse {
    pub posts: Vec<CommunityPost>,
}

/// `201` response for a created post.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreatePostResponse {
    pub post: CommunityPost,
    pub posts: Vec<CommunityPost>,
}
