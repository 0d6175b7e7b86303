//! Drawing session state.
//!
//! Everything the user can change while drawing lives here: paint color,
//! blend mode, the drawing and color-mixing toggles, and the trail set the
//! compositor repaints every frame.

use hanvas_models::{BlendMode, HandIdentity, HandObservation, HandState, PaintColor};
use tracing::debug;

use crate::compositor::{CompositeOp, SurfaceSize};
use crate::config::CanvasConfig;
use crate::gesture::classify_hand;
use crate::identity::{HandCandidate, IdentityResolver};
use crate::midpoint::landmarks_midpoint;
use crate::trail::{AppendOutcome, TrailBuilder, TrailSet};

/// Hand-state display text when no hand is in frame.
pub const NO_HAND_DETECTED: &str = "No hand detected";

/// Per-hand result of one ingest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandReport {
    pub identity: HandIdentity,
    pub state: HandState,
    /// `None` when the hand was gated off and nothing was fed to its trail.
    pub outcome: Option<AppendOutcome>,
}

/// Hand-state display text for one frame.
pub fn describe_hands(reports: &[HandReport]) -> String {
    match reports {
        [] => NO_HAND_DETECTED.to_string(),
        [only] => only.state.label().to_string(),
        many => many
            .iter()
            .map(|r| format!("{}: {}", r.identity, r.state.label()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[derive(Debug, Clone)]
pub struct DrawingSession {
    builder: TrailBuilder,
    resolver: IdentityResolver,
    trails: TrailSet,
    paint_color: PaintColor,
    blend_mode: BlendMode,
    drawing_enabled: bool,
    mixing_enabled: bool,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

impl DrawingSession {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            builder: TrailBuilder::from_config(config),
            resolver: IdentityResolver::new(config.identity_strategy, config.continuity_radius),
            trails: TrailSet::new(),
            paint_color: config.paint_color,
            blend_mode: BlendMode::default(),
            drawing_enabled: true,
            mixing_enabled: true,
        }
    }

    pub fn trails(&self) -> &TrailSet {
        &self.trails
    }

    pub fn paint_color(&self) -> PaintColor {
        self.paint_color
    }

    /// Applies to points added from now on; existing points keep theirs.
    pub fn set_paint_color(&mut self, color: PaintColor) {
        debug!(color = %color, "Paint color changed");
        self.paint_color = color;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Advance to the next blend mode and return it.
    pub fn cycle_blend_mode(&mut self) -> BlendMode {
        self.blend_mode = self.blend_mode.next();
        debug!(mode = %self.blend_mode, "Blend mode changed");
        self.blend_mode
    }

    pub fn drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    pub fn toggle_drawing(&mut self) -> bool {
        self.drawing_enabled = !self.drawing_enabled;
        self.drawing_enabled
    }

    pub fn mixing_enabled(&self) -> bool {
        self.mixing_enabled
    }

    pub fn toggle_mixing(&mut self) -> bool {
        self.mixing_enabled = !self.mixing_enabled;
        self.mixing_enabled
    }

    /// Compositing rule for the current toggles.
    pub fn composite_op(&self) -> CompositeOp {
        CompositeOp::for_session(self.mixing_enabled, self.blend_mode)
    }

    /// Clear every trail and forget identity history.
    pub fn clear_trails(&mut self) {
        self.trails.clear();
        self.resolver.reset();
    }

    /// Feed one frame's detected hands into the trail set.
    ///
    /// A hand only puts ink down when drawing is enabled and its pose is a
    /// fist or a partial hand. Identity resolution still runs for gated
    /// hands so continuity survives a pen-up.
    pub fn ingest(&mut self, hands: &[HandObservation], surface: SurfaceSize, now_ms: f64) -> Vec<HandReport> {
        let cursors: Vec<_> = hands.iter().map(landmarks_midpoint).collect();
        let candidates: Vec<HandCandidate> = hands
            .iter()
            .zip(cursors.iter())
            .map(|(hand, cursor)| HandCandidate {
                side: hand.side,
                cursor: *cursor,
            })
            .collect();
        let identities = self.resolver.resolve(&candidates);

        hands
            .iter()
            .zip(cursors)
            .zip(identities)
            .map(|((hand, cursor), identity)| {
                let state = classify_hand(hand);
                let outcome = match cursor {
                    Some(cursor) if self.drawing_enabled && state.is_drawing() => Some(self.builder.add_point(
                        &mut self.trails,
                        identity,
                        cursor,
                        self.paint_color,
                        surface,
                        now_ms,
                    )),
                    _ => None,
                };
                HandReport {
                    identity,
                    state,
                    outcome,
                }
            })
            .collect()
    }
}
