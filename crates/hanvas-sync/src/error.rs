//! Community sync error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while reading or writing a feed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Feed server returned {0}: {1}")]
    HttpStatus(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed store error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the remote feed could not be used and the caller should
    /// fall back to the local store.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::HttpStatus(..) | SyncError::InvalidResponse(_)
        )
    }

    /// HTTP status code, when the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            SyncError::HttpStatus(status, _) => Some(*status),
            SyncError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
