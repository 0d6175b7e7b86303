//! Recorded-session replay.
//!
//! A recording is a JSON-lines file, one captured frame per line:
//!
//! ```text
//! {"timeMs": 0, "width": 640, "height": 480, "hands": [{"side": "Left", "landmarks": [[0.5, 0.5, 0.0], ...]}]}
//! ```
//!
//! [`ReplayCapture`] plays the frames back as a capture device and
//! [`ReplayLoader`] serves the recorded landmarks as a detector, so a full
//! session can be driven through the real orchestrator without a camera or
//! a model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use hanvas_models::{HandObservation, HandSide, Landmark};
use serde::Deserialize;
use tracing::{debug, info};

use crate::capture::{CaptureDevice, Frame, FrameSource};
use crate::detector::{Accelerator, Detection, DetectorLoader, DetectorOptions, HandDetector, RunningMode};
use crate::error::{CanvasError, CanvasResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    time_ms: f64,
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<RawHand>,
}

#[derive(Debug, Deserialize)]
struct RawHand {
    #[serde(default)]
    side: Option<String>,
    landmarks: Vec<Vec<f64>>,
}

/// One frame of a recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub time_ms: f64,
    pub width: u32,
    pub height: u32,
    pub hands: Vec<HandObservation>,
}

impl RecordedFrame {
    /// Media time in seconds, as reported by the replay capture.
    pub fn media_time(&self) -> f64 {
        self.time_ms / 1000.0
    }
}

/// A parsed recording.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames }
    }

    /// Parse JSON lines. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> CanvasResult<Self> {
        let mut frames = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let raw: RawFrame = serde_json::from_str(line)
                .map_err(|e| CanvasError::invalid_recording(line_no, e.to_string()))?;
            frames.push(convert_frame(raw, line_no)?);
        }
        Ok(Self { frames })
    }

    pub async fn load(path: &Path) -> CanvasResult<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Err(CanvasError::FileNotFound(path.to_path_buf()));
        }
        let text = tokio::fs::read_to_string(path).await?;
        let recording = Self::parse(&text)?;
        info!(path = %path.display(), frames = recording.len(), "Loaded recording");
        Ok(recording)
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn hands_at(&self, media_time: f64) -> Option<&[HandObservation]> {
        self.frames
            .iter()
            .find(|f| f.media_time() == media_time)
            .map(|f| f.hands.as_slice())
    }
}

fn convert_frame(raw: RawFrame, line_no: usize) -> CanvasResult<RecordedFrame> {
    let hands = raw
        .hands
        .into_iter()
        .map(|hand| {
            let landmarks = hand
                .landmarks
                .iter()
                .map(|coords| match coords.as_slice() {
                    [x, y] => Ok(Landmark::new(*x, *y, 0.0)),
                    [x, y, z] => Ok(Landmark::new(*x, *y, *z)),
                    other => Err(CanvasError::invalid_recording(
                        line_no,
                        format!("landmark must have 2 or 3 coordinates, got {}", other.len()),
                    )),
                })
                .collect::<CanvasResult<Vec<_>>>()?;

            let side = hand
                .side
                .as_deref()
                .map(HandSide::parse)
                .transpose()
                .map_err(|e| CanvasError::invalid_recording(line_no, e.to_string()))?;

            Ok(HandObservation { landmarks, side })
        })
        .collect::<CanvasResult<Vec<_>>>()?;

    Ok(RecordedFrame {
        time_ms: raw.time_ms,
        width: raw.width,
        height: raw.height,
        hands,
    })
}

// ============================================================================
// Capture
// ============================================================================

/// Plays a recording back as a capture device.
#[derive(Debug, Clone)]
pub struct ReplayCapture {
    recording: Arc<Recording>,
}

impl ReplayCapture {
    pub fn new(recording: Arc<Recording>) -> Self {
        Self { recording }
    }
}

#[async_trait]
impl CaptureDevice for ReplayCapture {
    async fn start(&self) -> CanvasResult<Box<dyn FrameSource>> {
        if self.recording.is_empty() {
            return Err(CanvasError::capture_unavailable("recording has no frames"));
        }
        Ok(Box::new(ReplaySource {
            recording: Arc::clone(&self.recording),
            next: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

struct ReplaySource {
    recording: Arc<Recording>,
    next: usize,
}

#[async_trait]
impl FrameSource for ReplaySource {
    async fn next_frame(&mut self) -> CanvasResult<Option<Frame>> {
        let Some(recorded) = self.recording.frames().get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        Ok(Some(Frame::new(recorded.media_time(), recorded.width, recorded.height)))
    }

    async fn stop(&mut self) {
        debug!(played = self.next, "Replay source stopped");
        self.next = self.recording.len();
    }
}

// ============================================================================
// Detector
// ============================================================================

/// Serves recorded landmarks for the frame's media time.
pub struct ReplayDetector {
    recording: Arc<Recording>,
    running_mode: RunningMode,
    max_hands: usize,
}

#[async_trait]
impl HandDetector for ReplayDetector {
    async fn set_running_mode(&mut self, mode: RunningMode) -> CanvasResult<()> {
        self.running_mode = mode;
        Ok(())
    }

    async fn detect(&mut self, frame: &Frame, _timestamp_ms: f64) -> CanvasResult<Detection> {
        if self.running_mode != RunningMode::Video {
            return Err(CanvasError::detection_failed(format!(
                "detector is in {} mode",
                self.running_mode.as_str()
            )));
        }

        let hands = self
            .recording
            .hands_at(frame.media_time)
            .map(|hands| hands.iter().take(self.max_hands).cloned().collect())
            .unwrap_or_default();
        Ok(Detection::new(hands))
    }
}

/// Loader for [`ReplayDetector`].
#[derive(Debug, Clone)]
pub struct ReplayLoader {
    recording: Arc<Recording>,
    gpu_available: bool,
}

impl ReplayLoader {
    pub fn new(recording: Arc<Recording>) -> Self {
        Self {
            recording,
            gpu_available: true,
        }
    }

    /// Make the GPU delegate fail so initialization falls back to CPU.
    pub fn without_gpu(mut self) -> Self {
        self.gpu_available = false;
        self
    }
}

#[async_trait]
impl DetectorLoader for ReplayLoader {
    async fn load(
        &self,
        accelerator: Accelerator,
        options: &DetectorOptions,
    ) -> CanvasResult<Box<dyn HandDetector>> {
        if accelerator == Accelerator::Gpu && !self.gpu_available {
            return Err(CanvasError::detector_unavailable("GPU delegate not available"));
        }
        Ok(Box::new(ReplayDetector {
            recording: Arc::clone(&self.recording),
            running_mode: options.running_mode,
            max_hands: options.max_hands,
        }))
    }
}
