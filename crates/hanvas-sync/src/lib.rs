//! Community feed synchronization.
//!
//! This crate provides:
//! - An HTTP client for the community feed server
//! - A JSON-file local feed store
//! - `CommunitySync`, which falls back to the local store for the rest of
//!   the session once the remote feed fails

pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod metrics;
pub mod sync;

pub use client::{FeedClient, RemoteFeed, POSTS_PATH};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use local::LocalFeedStore;
pub use sync::{
    CommunitySync, SyncMode, SyncReport, FETCH_FALLBACK_MESSAGE, PUBLISH_FALLBACK_MESSAGE,
};
