//! Shared data models for the Hanvas backend and drawing pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Hand landmarks and per-frame hand observations
//! - Hand states and hand identities used to route trails
//! - Paint colors and blend modes
//! - Community feed posts and their wire envelopes

pub mod error;
pub mod hand;
pub mod landmark;
pub mod paint;
pub mod post;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use hand::{HandIdentity, HandState};
pub use landmark::{HandObservation, HandSide, Landmark, HAND_CONNECTIONS, LANDMARK_COUNT};
pub use paint::{BlendMode, PaintColor, DEFAULT_PAINT_COLOR};
pub use post::{
    normalize_feed, prepend_post, CommunityPost, CreatePostRequest, CreatePostResponse,
    PostsResponse, MAX_POSTS,
};
