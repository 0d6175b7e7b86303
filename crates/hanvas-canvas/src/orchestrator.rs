//! Frame orchestrator.
//!
//! Drives the per-frame loop: capture -> detection -> classification ->
//! trail update -> compositing -> skeleton overlay. The orchestrator owns
//! the drawing session and the surface; `tick` takes `&mut self`, so
//! iterations can never overlap.
//!
//! Cancellation is cooperative. A [`StopHandle`] clears the running flag,
//! which is checked before each frame and again after the detector returns,
//! so a result that arrives after stop is never drawn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::capture::{CaptureDevice, FrameSource};
use crate::compositor::{render_trails, Surface, SurfaceSize};
use crate::config::CanvasConfig;
use crate::detector::{
    initialize_detector, Detection, DetectorInit, DetectorLoader, DetectorOptions, HandDetector,
    RunningMode,
};
use crate::error::CanvasResult;
use crate::export::Snapshot;
use crate::session::{describe_hands, DrawingSession, NO_HAND_DETECTED};
use crate::skeleton::SkeletonPainter;

/// Capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Detecting,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was composited.
    Rendered { hands: usize },
    /// Not capturing.
    Idle,
    /// A stop request was honored during this tick.
    Stopped,
    /// The capture stream ran out of frames.
    CaptureEnded,
}

/// Cloneable handle to request a cooperative stop from another task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub struct FrameOrchestrator {
    config: CanvasConfig,
    session: DrawingSession,
    surface: Surface,
    capture: Box<dyn CaptureDevice>,
    source: Option<Box<dyn FrameSource>>,
    detector: Option<Box<dyn HandDetector>>,
    running_mode: RunningMode,
    /// Media time of the last frame sent to the detector
    last_media_time: Option<f64>,
    /// Detection reused while the media time is unchanged
    cached: Detection,
    painter: Option<Box<dyn SkeletonPainter>>,
    running: Arc<AtomicBool>,
    state: CaptureState,
    status: String,
    hand_state: String,
    clock: Instant,
}

impl FrameOrchestrator {
    /// Build around an already initialized detector.
    pub fn new(config: CanvasConfig, capture: Box<dyn CaptureDevice>, detector: DetectorInit) -> Self {
        let status = detector.status_message().to_string();
        let detector = match detector {
            DetectorInit::Ready { detector, accelerator } => {
                debug!(accelerator = %accelerator, "Orchestrator using hand detector");
                Some(detector)
            }
            DetectorInit::Failed { reason } => {
                warn!(reason = %reason, "Orchestrator running without hand detector");
                None
            }
        };

        Self {
            session: DrawingSession::new(&config),
            surface: Surface::new(SurfaceSize::default()),
            capture,
            source: None,
            detector,
            running_mode: RunningMode::Image,
            last_media_time: None,
            cached: Detection::default(),
            painter: None,
            running: Arc::new(AtomicBool::new(false)),
            state: CaptureState::Idle,
            status,
            hand_state: NO_HAND_DETECTED.to_string(),
            clock: Instant::now(),
            config,
        }
    }

    /// Initialize the detector through `loader` (GPU, then CPU) and build.
    pub async fn with_loader(
        config: CanvasConfig,
        capture: Box<dyn CaptureDevice>,
        loader: &dyn DetectorLoader,
    ) -> Self {
        let options = DetectorOptions {
            max_hands: config.max_hands,
            running_mode: RunningMode::Image,
        };
        let init = initialize_detector(loader, &options).await;
        Self::new(config, capture, init)
    }

    pub fn with_painter(mut self, painter: Box<dyn SkeletonPainter>) -> Self {
        self.painter = Some(painter);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DrawingSession {
        &mut self.session
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Text for the hand-state display.
    pub fn hand_state(&self) -> &str {
        &self.hand_state
    }

    pub fn detector_ready(&self) -> bool {
        self.detector.is_some()
    }

    pub fn running_mode(&self) -> RunningMode {
        self.running_mode
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        info!(device = self.capture.name(), "{}", self.status);
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Acquire the capture device and enter `Detecting`.
    ///
    /// On failure the orchestrator stays `Idle` and the status explains why.
    pub async fn start(&mut self) -> CanvasResult<()> {
        if self.state == CaptureState::Detecting {
            return Ok(());
        }

        self.set_status("Requesting webcam permission...");
        let started = self.capture.start().await;
        match started {
            Ok(source) => {
                self.source = Some(source);
                self.last_media_time = None;
                self.cached = Detection::default();
                self.running.store(true, Ordering::SeqCst);
                self.state = CaptureState::Detecting;
                if self.detector.is_some() {
                    self.set_status("Webcam active.");
                } else {
                    self.set_status("Webcam active, but landmarks will not draw.");
                }
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                self.state = CaptureState::Idle;
                self.set_status(format!("Unable to access webcam: {}. Check camera permissions.", e));
                Err(e)
            }
        }
    }

    /// Leave `Detecting` and release the capture source.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.finish_stop().await;
    }

    async fn finish_stop(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop().await;
        }
        self.state = CaptureState::Idle;
        self.last_media_time = None;
        self.cached = Detection::default();
        self.hand_state = NO_HAND_DETECTED.to_string();
        if self.config.clear_trail_on_stop {
            self.session.clear_trails();
        }
        self.set_status("Webcam stopped.");
    }

    /// Clear every trail.
    pub fn clear_trails(&mut self) {
        self.session.clear_trails();
    }

    /// Mirrored PNG of the current surface.
    pub fn export_snapshot(&mut self) -> CanvasResult<Snapshot> {
        match Snapshot::capture(&self.surface, Utc::now()) {
            Ok(snapshot) => {
                self.set_status("Exported drawing as PNG.");
                Ok(snapshot)
            }
            Err(e) => {
                self.set_status(e.to_string());
                Err(e)
            }
        }
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Process one frame.
    pub async fn tick(&mut self) -> CanvasResult<TickOutcome> {
        if self.state == CaptureState::Idle {
            return Ok(TickOutcome::Idle);
        }
        if !self.is_running() {
            self.finish_stop().await;
            return Ok(TickOutcome::Stopped);
        }

        let Some(source) = self.source.as_mut() else {
            return Ok(TickOutcome::Idle);
        };
        let next = source.next_frame().await;
        let frame = match next {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stop().await;
                return Ok(TickOutcome::CaptureEnded);
            }
            Err(e) => {
                warn!(error = %e, "Capture failed");
                self.stop().await;
                return Err(e);
            }
        };

        let size = frame.size();
        self.surface.resize(size);
        let now_ms = self.clock.elapsed().as_secs_f64() * 1000.0;

        if let Some(detector) = self.detector.as_mut() {
            if self.running_mode == RunningMode::Image {
                self.running_mode = RunningMode::Video;
                if let Err(e) = detector.set_running_mode(RunningMode::Video).await {
                    warn!(error = %e, "Failed to switch detector to video mode");
                }
            }

            if self.last_media_time != Some(frame.media_time) {
                self.last_media_time = Some(frame.media_time);
                self.cached = match detector.detect(&frame, now_ms).await {
                    Ok(detection) => detection,
                    Err(e) => {
                        warn!(error = %e, media_time = frame.media_time, "Hand detection failed");
                        Detection::default()
                    }
                };
            }
        }

        // Stop may have been requested while the detector was running.
        if !self.is_running() {
            self.finish_stop().await;
            return Ok(TickOutcome::Stopped);
        }

        let hands = std::mem::take(&mut self.cached.hands);
        let reports = self.session.ingest(&hands, size, now_ms);
        self.hand_state = describe_hands(&reports);

        render_trails(&mut self.surface, self.session.trails(), self.session.composite_op());
        if let Some(painter) = &self.painter {
            for hand in &hands {
                painter.paint(&mut self.surface, hand);
            }
        }

        let count = hands.len();
        self.cached.hands = hands;
        Ok(TickOutcome::Rendered { hands: count })
    }

    /// Run frame-paced ticks until stopped or the capture ends.
    ///
    /// Returns the number of frames rendered.
    pub async fn run(&mut self) -> CanvasResult<u64> {
        let mut interval = tokio::time::interval(self.config.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut rendered = 0u64;
        loop {
            interval.tick().await;
            match self.tick().await? {
                TickOutcome::Rendered { .. } => rendered += 1,
                outcome => {
                    debug!(?outcome, rendered, "Frame loop finished");
                    return Ok(rendered);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::error::CanvasError;
    use crate::gesture::tests::hand_with_extended;
    use crate::skeleton::ConnectorPainter;
    use async_trait::async_trait;
    use hanvas_models::HandObservation;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Frames to emit, by media time.
    struct ScriptedCapture {
        media_times: Vec<f64>,
        fail: bool,
        stops: Arc<AtomicUsize>,
    }

    impl ScriptedCapture {
        fn new(media_times: Vec<f64>) -> Self {
            Self {
                media_times,
                fail: false,
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct ScriptedSource {
        media_times: Vec<f64>,
        next: usize,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CaptureDevice for ScriptedCapture {
        async fn start(&self) -> CanvasResult<Box<dyn FrameSource>> {
            if self.fail {
                return Err(CanvasError::capture_unavailable("NotAllowedError"));
            }
            Ok(Box::new(ScriptedSource {
                media_times: self.media_times.clone(),
                next: 0,
                stops: Arc::clone(&self.stops),
            }))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        async fn next_frame(&mut self) -> CanvasResult<Option<Frame>> {
            let frame = self
                .media_times
                .get(self.next)
                .map(|t| Frame::new(*t, 200, 100));
            self.next += 1;
            Ok(frame)
        }

        async fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Calls {
        detect: AtomicUsize,
        modes: Mutex<Vec<RunningMode>>,
    }

    /// Returns the same hands every call and records what it was asked.
    struct ScriptedDetector {
        hands: Vec<HandObservation>,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl HandDetector for ScriptedDetector {
        async fn set_running_mode(&mut self, mode: RunningMode) -> CanvasResult<()> {
            self.calls.modes.lock().unwrap().push(mode);
            Ok(())
        }

        async fn detect(&mut self, _frame: &Frame, _timestamp_ms: f64) -> CanvasResult<Detection> {
            self.calls.detect.fetch_add(1, Ordering::SeqCst);
            Ok(Detection::new(self.hands.clone()))
        }
    }

    fn orchestrator(
        media_times: Vec<f64>,
        hands: Vec<HandObservation>,
        config: CanvasConfig,
    ) -> (FrameOrchestrator, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let detector = ScriptedDetector {
            hands,
            calls: Arc::clone(&calls),
        };
        let init = DetectorInit::Ready {
            detector: Box::new(detector),
            accelerator: crate::detector::Accelerator::Cpu,
        };
        let orch = FrameOrchestrator::new(config, Box::new(ScriptedCapture::new(media_times)), init);
        (orch, calls)
    }

    #[tokio::test]
    async fn test_tick_before_start_is_idle() {
        let (mut orch, calls) = orchestrator(vec![0.0], vec![], CanvasConfig::default());
        assert_eq!(orch.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(calls.detect.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_start_failure_stays_idle() {
        let capture = ScriptedCapture {
            fail: true,
            ..ScriptedCapture::new(vec![])
        };
        let init = DetectorInit::Failed {
            reason: "no model".into(),
        };
        let mut orch = FrameOrchestrator::new(CanvasConfig::default(), Box::new(capture), init);
        assert!(orch.start().await.is_err());
        assert_eq!(orch.state(), CaptureState::Idle);
        assert!(orch.status().starts_with("Unable to access webcam"));
    }

    #[tokio::test]
    async fn test_detector_skipped_for_repeated_media_time() {
        let (mut orch, calls) = orchestrator(vec![0.0, 0.0, 0.0, 0.5], vec![hand_with_extended(0)], CanvasConfig::default());
        orch.start().await.unwrap();
        for _ in 0..4 {
            assert_eq!(orch.tick().await.unwrap(), TickOutcome::Rendered { hands: 1 });
        }
        assert_eq!(calls.detect.load(Ordering::SeqCst), 2);
        assert_eq!(orch.hand_state(), "Fist");
    }

    #[tokio::test]
    async fn test_running_mode_switches_once() {
        let (mut orch, calls) = orchestrator(vec![0.0, 0.1, 0.2], vec![], CanvasConfig::default());
        assert_eq!(orch.running_mode(), RunningMode::Image);
        orch.start().await.unwrap();
        for _ in 0..3 {
            orch.tick().await.unwrap();
        }
        assert_eq!(*calls.modes.lock().unwrap(), vec![RunningMode::Video]);
        assert_eq!(orch.running_mode(), RunningMode::Video);
        assert_eq!(orch.hand_state(), NO_HAND_DETECTED);
    }

    #[tokio::test]
    async fn test_stale_result_after_stop_is_not_drawn() {
        let calls = Arc::new(Calls::default());
        let config = CanvasConfig {
            clear_trail_on_stop: false,
            ..CanvasConfig::default()
        };
        let capture = ScriptedCapture::new(vec![0.0, 0.1]);
        let stops = Arc::clone(&capture.stops);

        // The stop handle only exists once the orchestrator does, so wire
        // the detector up through a shared slot.
        let slot: Arc<Mutex<Option<StopHandle>>> = Arc::new(Mutex::new(None));
        struct StoppingDetector {
            slot: Arc<Mutex<Option<StopHandle>>>,
            calls: Arc<Calls>,
        }
        #[async_trait]
        impl HandDetector for StoppingDetector {
            async fn set_running_mode(&mut self, _mode: RunningMode) -> CanvasResult<()> {
                Ok(())
            }
            async fn detect(&mut self, _frame: &Frame, _timestamp_ms: f64) -> CanvasResult<Detection> {
                self.calls.detect.fetch_add(1, Ordering::SeqCst);
                if let Some(handle) = self.slot.lock().unwrap().as_ref() {
                    handle.stop();
                }
                Ok(Detection::new(vec![hand_with_extended(0)]))
            }
        }

        let init = DetectorInit::Ready {
            detector: Box::new(StoppingDetector {
                slot: Arc::clone(&slot),
                calls: Arc::clone(&calls),
            }),
            accelerator: crate::detector::Accelerator::Gpu,
        };
        let mut orch = FrameOrchestrator::new(config, Box::new(capture), init);
        *slot.lock().unwrap() = Some(orch.stop_handle());

        orch.start().await.unwrap();
        assert_eq!(orch.tick().await.unwrap(), TickOutcome::Stopped);
        assert_eq!(calls.detect.load(Ordering::SeqCst), 1);
        assert!(orch.session().trails().is_empty());
        assert_eq!(orch.state(), CaptureState::Idle);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(orch.tick().await.unwrap(), TickOutcome::Idle);
    }

    #[tokio::test]
    async fn test_stop_clears_trails_when_configured() {
        let (mut orch, _) = orchestrator(vec![0.0, 0.1], vec![hand_with_extended(0)], CanvasConfig::default());
        orch.start().await.unwrap();
        orch.tick().await.unwrap();
        assert_eq!(orch.session().trails().point_count(), 1);
        orch.stop().await;
        assert!(orch.session().trails().is_empty());
        assert_eq!(orch.status(), "Webcam stopped.");
        assert_eq!(orch.hand_state(), NO_HAND_DETECTED);
    }

    #[tokio::test]
    async fn test_stop_keeps_trails_when_configured() {
        let config = CanvasConfig {
            clear_trail_on_stop: false,
            ..CanvasConfig::default()
        };
        let (mut orch, _) = orchestrator(vec![0.0], vec![hand_with_extended(0)], config);
        orch.start().await.unwrap();
        orch.tick().await.unwrap();
        orch.stop().await;
        assert_eq!(orch.session().trails().point_count(), 1);
    }

    #[tokio::test]
    async fn test_open_hand_does_not_draw() {
        let (mut orch, _) = orchestrator(vec![0.0, 0.1], vec![hand_with_extended(5)], CanvasConfig::default());
        orch.start().await.unwrap();
        orch.tick().await.unwrap();
        orch.tick().await.unwrap();
        assert!(orch.session().trails().is_empty());
        assert_eq!(orch.hand_state(), "Open hand");
    }

    #[tokio::test]
    async fn test_failed_detector_still_composites() {
        let init = DetectorInit::Failed {
            reason: "no model".into(),
        };
        let mut orch = FrameOrchestrator::new(
            CanvasConfig::default(),
            Box::new(ScriptedCapture::new(vec![0.0, 0.1])),
            init,
        );
        assert!(!orch.detector_ready());
        orch.start().await.unwrap();
        assert!(orch.status().contains("landmarks will not draw"));
        assert_eq!(orch.tick().await.unwrap(), TickOutcome::Rendered { hands: 0 });
        assert_eq!(orch.surface().size(), SurfaceSize::new(200, 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_capture_ends() {
        let (mut orch, calls) = orchestrator(vec![0.0, 0.1, 0.2], vec![hand_with_extended(0)], CanvasConfig::default());
        orch = orch.with_painter(Box::new(ConnectorPainter::default()));
        orch.start().await.unwrap();
        let rendered = orch.run().await.unwrap();
        assert_eq!(rendered, 3);
        assert_eq!(calls.detect.load(Ordering::SeqCst), 3);
        assert_eq!(orch.state(), CaptureState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_handle_ends_run() {
        let (mut orch, _) = orchestrator(vec![0.0; 1000], vec![], CanvasConfig::default());
        orch.start().await.unwrap();
        let handle = orch.stop_handle();
        handle.stop();
        assert_eq!(orch.run().await.unwrap(), 0);
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_export_snapshot_after_render() {
        let (mut orch, _) = orchestrator(vec![0.0], vec![hand_with_extended(0)], CanvasConfig::default());
        assert!(orch.export_snapshot().is_err());
        orch.start().await.unwrap();
        orch.tick().await.unwrap();
        let snapshot = orch.export_snapshot().unwrap();
        assert_eq!((snapshot.width, snapshot.height), (200, 100));
        assert_eq!(orch.status(), "Exported drawing as PNG.");
    }
}
