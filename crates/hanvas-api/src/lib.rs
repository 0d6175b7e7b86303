//! Community feed server.
//!
//! Serves the drawing page's static assets and the shared feed of drawing
//! snapshots at `/api/community-posts`, persisted as a JSON file.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::{FilePostStore, POSTS_FILE};
