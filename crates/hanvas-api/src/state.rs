//! Application state.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::store::FilePostStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub posts: Arc<FilePostStore>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> ApiResult<Self> {
        let posts = FilePostStore::open(&config.data_dir).await?;
        Ok(Self {
            config,
            posts: Arc::new(posts),
        })
    }
}
