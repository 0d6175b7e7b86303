#![deny(unreachable_patterns)]
//! Gesture-to-drawing pipeline.
//!
//! This crate provides:
//! - Hand-state classification from finger extension
//! - Cursor extraction and per-hand ink trails with gap interpolation
//! - Raster compositing with blend modes and a skeleton overlay
//! - Detector and capture seams with GPU/CPU detector initialization
//! - The frame orchestrator and mirrored PNG snapshot export
//! - Recorded-session replay for running without a camera

pub mod capture;
pub mod compositor;
pub mod config;
pub mod detector;
pub mod error;
pub mod export;
pub mod gesture;
pub mod identity;
pub mod midpoint;
pub mod orchestrator;
pub mod replay;
pub mod session;
pub mod skeleton;
pub mod trail;

pub use capture::{CaptureDevice, Frame, FrameSource};
pub use compositor::{render_trails, CompositeOp, Surface, SurfaceSize};
pub use config::{CanvasConfig, IdentityStrategy, StampRadius};
pub use detector::{
    initialize_detector, Accelerator, Detection, DetectorInit, DetectorLoader, DetectorOptions,
    HandDetector, RunningMode,
};
pub use error::{CanvasError, CanvasResult};
pub use export::{snapshot_file_name, Snapshot, PNG_DATA_URL_PREFIX};
pub use gesture::{classify_hand, count_extended_fingers, EXTENSION_RATIO};
pub use identity::{label_identity, HandCandidate, IdentityResolver};
pub use midpoint::landmarks_midpoint;
pub use orchestrator::{CaptureState, FrameOrchestrator, StopHandle, TickOutcome};
pub use replay::{RecordedFrame, Recording, ReplayCapture, ReplayDetector, ReplayLoader};
pub use session::{describe_hands, DrawingSession, HandReport, NO_HAND_DETECTED};
pub use skeleton::{ConnectorPainter, SkeletonPainter, CONNECTOR_COLOR, LANDMARK_COLOR};
pub use trail::{AppendOutcome, Trail, TrailBuilder, TrailPoint, TrailSet};
