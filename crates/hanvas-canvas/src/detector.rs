//! Hand-landmark detector collaborator and its initialization.
//!
//! The detector itself is external. This module defines the seam it is
//! consumed through and the two-step accelerator fallback: try the GPU
//! delegate first, retry once on CPU, and report failure as a value so
//! the frame loop can keep running without landmarks.

use async_trait::async_trait;
use hanvas_models::HandObservation;
use tracing::{info, warn};

use crate::capture::Frame;
use crate::error::CanvasResult;

/// Detector operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningMode {
    /// Independent still images. Detectors are created in this mode.
    #[default]
    Image,
    /// Timestamped stream; required for per-frame detection.
    Video,
}

impl RunningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunningMode::Image => "IMAGE",
            RunningMode::Video => "VIDEO",
        }
    }
}

/// Compute delegate requested from the detector runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    Gpu,
    Cpu,
}

impl Accelerator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accelerator::Gpu => "GPU",
            Accelerator::Cpu => "CPU",
        }
    }
}

impl std::fmt::Display for Accelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options passed to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOptions {
    pub max_hands: usize,
    pub running_mode: RunningMode,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_hands: 2,
            running_mode: RunningMode::Image,
        }
    }
}

/// Hands found in one frame. Side labels ride on each observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub hands: Vec<HandObservation>,
}

impl Detection {
    pub fn new(hands: Vec<HandObservation>) -> Self {
        Self { hands }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// A loaded hand-landmark detector.
#[async_trait]
pub trait HandDetector: Send {
    async fn set_running_mode(&mut self, mode: RunningMode) -> CanvasResult<()>;

    /// Detect hands in `frame`. An empty result is normal.
    async fn detect(&mut self, frame: &Frame, timestamp_ms: f64) -> CanvasResult<Detection>;
}

/// Creates detectors for a given accelerator.
#[async_trait]
pub trait DetectorLoader: Send + Sync {
    async fn load(
        &self,
        accelerator: Accelerator,
        options: &DetectorOptions,
    ) -> CanvasResult<Box<dyn HandDetector>>;
}

/// Outcome of detector initialization.
pub enum DetectorInit {
    Ready {
        detector: Box<dyn HandDetector>,
        accelerator: Accelerator,
    },
    Failed {
        reason: String,
    },
}

impl DetectorInit {
    pub fn is_ready(&self) -> bool {
        matches!(self, DetectorInit::Ready { .. })
    }

    /// User-facing status line for this outcome.
    pub fn status_message(&self) -> &'static str {
        match self {
            DetectorInit::Ready { .. } => "Hand model ready.",
            DetectorInit::Failed { .. } => {
                "Hand model failed to load. Webcam can still open, but landmarks will not draw."
            }
        }
    }
}

impl std::fmt::Debug for DetectorInit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorInit::Ready { accelerator, .. } => f
                .debug_struct("Ready")
                .field("accelerator", accelerator)
                .finish_non_exhaustive(),
            DetectorInit::Failed { reason } => {
                f.debug_struct("Failed").field("reason", reason).finish()
            }
        }
    }
}

/// Load a detector, preferring GPU and retrying once on CPU.
pub async fn initialize_detector(loader: &dyn DetectorLoader, options: &DetectorOptions) -> DetectorInit {
    info!(max_hands = options.max_hands, "Loading hand model...");

    let gpu_error = match loader.load(Accelerator::Gpu, options).await {
        Ok(detector) => {
            info!(accelerator = %Accelerator::Gpu, "Hand model ready");
            return DetectorInit::Ready {
                detector,
                accelerator: Accelerator::Gpu,
            };
        }
        Err(e) => e,
    };

    warn!(error = %gpu_error, "GPU delegate failed, retrying on CPU");

    match loader.load(Accelerator::Cpu, options).await {
        Ok(detector) => {
            info!(accelerator = %Accelerator::Cpu, "Hand model ready");
            DetectorInit::Ready {
                detector,
                accelerator: Accelerator::Cpu,
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to initialize hand detector");
            DetectorInit::Failed {
                reason: e.to_string(),
            }
        }
    }
}
