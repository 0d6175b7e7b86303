//! Studio error types.

use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Canvas error: {0}")]
    Canvas(#[from] hanvas_canvas::CanvasError),

    #[error("Sync error: {0}")]
    Sync(#[from] hanvas_sync::SyncError),
}
