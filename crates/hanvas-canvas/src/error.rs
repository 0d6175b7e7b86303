//! Error types for the drawing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors raised at the pipeline's collaborator boundaries.
///
/// None of these end a running frame loop; the orchestrator turns them into
/// status messages and keeps going in a degraded mode where it can.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Hand detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Hand detection failed: {0}")]
    DetectionFailed(String),

    #[error("Nothing to export: {0}")]
    EmptySurface(String),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Invalid recording at line {line}: {message}")]
    InvalidRecording { line: usize, message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CanvasError {
    pub fn capture_unavailable(message: impl Into<String>) -> Self {
        Self::CaptureUnavailable(message.into())
    }

    pub fn detector_unavailable(message: impl Into<String>) -> Self {
        Self::DetectorUnavailable(message.into())
    }

    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    pub fn invalid_recording(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecording {
            line,
            message: message.into(),
        }
    }
}
