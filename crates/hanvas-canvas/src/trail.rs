//! Ink trails.
//!
//! Turns a jittery per-frame stream of cursor points (one stream per hand
//! identity) into visually continuous strokes:
//!
//! * a sample identical to the previous one is dropped, so a stationary
//!   hand does not pile up points;
//! * a small jump (up to `nearby_threshold_px`) is filled with points
//!   roughly `max_gap_px` apart;
//! * a large jump is a discontinuity (hand left and re-entered, detector
//!   glitch) and is left as a visible gap.
//!
//! Trails are append-only and are only ever cleared as a whole.

use std::collections::HashMap;

use hanvas_models::{HandIdentity, Landmark, PaintColor};
use serde::{Deserialize, Serialize};

use crate::compositor::SurfaceSize;
use crate::config::{CanvasConfig, StampRadius};

/// A drawable dot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub color: PaintColor,
}

impl TrailPoint {
    fn stamp(at: Landmark, radius: f64, color: PaintColor) -> Self {
        Self {
            x: at.x,
            y: at.y,
            z: at.z,
            radius_x: radius,
            radius_y: radius,
            color,
        }
    }

    pub fn position(&self) -> Landmark {
        Landmark::new(self.x, self.y, self.z)
    }
}

/// Insertion-ordered points owned by one hand identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    points: Vec<TrailPoint>,
}

impl Trail {
    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&TrailPoint> {
        self.points.last()
    }
}

/// Last accepted sample of an identity, used for speed.
#[derive(Debug, Clone, Copy)]
struct LastSample {
    point: Landmark,
    time_ms: f64,
}

/// All trails of a session, keyed by hand identity in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TrailSet {
    trails: Vec<(HandIdentity, Trail)>,
    last_samples: HashMap<HandIdentity, LastSample>,
}

impl TrailSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &HandIdentity) -> Option<&Trail> {
        self.trails
            .iter()
            .find(|(id, _)| id == identity)
            .map(|(_, trail)| trail)
    }

    /// Trails in the order their identities were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&HandIdentity, &Trail)> {
        self.trails.iter().map(|(id, trail)| (id, trail))
    }

    pub fn identities(&self) -> impl Iterator<Item = &HandIdentity> {
        self.trails.iter().map(|(id, _)| id)
    }

    /// Number of trails.
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// Total points across every trail.
    pub fn point_count(&self) -> usize {
        self.trails.iter().map(|(_, trail)| trail.len()).sum()
    }

    /// Drop every trail and forget all last-sample memory.
    pub fn clear(&mut self) {
        self.trails.clear();
        self.last_samples.clear();
    }

    fn trail_mut(&mut self, identity: &HandIdentity) -> Option<&mut Trail> {
        self.trails
            .iter_mut()
            .find(|(id, _)| id == identity)
            .map(|(_, trail)| trail)
    }
}

/// What happened to one cursor sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// First point of a new trail.
    Started,
    /// The sample did not move; nothing was appended.
    Suppressed,
    /// The sample was appended after `interpolated` gap-filling points.
    Appended { interpolated: usize },
}

/// Decides whether to append, interpolate or suppress each cursor sample.
#[derive(Debug, Clone)]
pub struct TrailBuilder {
    nearby_threshold_px: f64,
    max_gap_px: f64,
    stamp_radius: StampRadius,
}

impl Default for TrailBuilder {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl TrailBuilder {
    pub fn new(nearby_threshold_px: f64, max_gap_px: f64, stamp_radius: StampRadius) -> Self {
        Self {
            nearby_threshold_px,
            max_gap_px,
            stamp_radius,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.nearby_threshold_px, config.max_gap_px, config.stamp_radius)
    }

    /// Feed one cursor sample for `identity`.
    ///
    /// # Arguments
    /// * `cursor` - Normalized cursor position
    /// * `color` - Current paint color; every point added here carries it
    /// * `surface` - Pixel size used to measure the jump
    /// * `now_ms` - Monotonic sample time, only used by speed-scaled radii
    pub fn add_point(
        &self,
        trails: &mut TrailSet,
        identity: HandIdentity,
        cursor: Landmark,
        color: PaintColor,
        surface: SurfaceSize,
        now_ms: f64,
    ) -> AppendOutcome {
        let speed = trails
            .last_samples
            .get(&identity)
            .and_then(|last| {
                let elapsed_secs = (now_ms - last.time_ms) / 1000.0;
                (elapsed_secs > 0.0).then(|| cursor.distance(&last.point) / elapsed_secs)
            });
        let radius = self.stamp_radius.radius_for(speed);
        let point = TrailPoint::stamp(cursor, radius, color);

        let Some(trail) = trails.trail_mut(&identity) else {
            trails.trails.push((identity, Trail { points: vec![point] }));
            trails.last_samples.insert(identity, LastSample { point: cursor, time_ms: now_ms });
            return AppendOutcome::Started;
        };

        let Some(last) = trail.last().map(TrailPoint::position) else {
            trail.points.push(point);
            trails.last_samples.insert(identity, LastSample { point: cursor, time_ms: now_ms });
            return AppendOutcome::Started;
        };

        if cursor.distance(&last) <= 0.0 {
            return AppendOutcome::Suppressed;
        }

        let distance_px = surface.pixel_distance(&last, &cursor);
        let mut interpolated = 0;
        if distance_px > 0.0 && distance_px <= self.nearby_threshold_px && self.max_gap_px > 0.0 {
            let steps = (distance_px / self.max_gap_px).floor() as usize;
            for step in 1..=steps {
                let t = step as f64 / (steps + 1) as f64;
                let between = Landmark::new(
                    last.x + (cursor.x - last.x) * t,
                    last.y + (cursor.y - last.y) * t,
                    last.z + (cursor.z - last.z) * t,
                );
                trail.points.push(TrailPoint::stamp(between, radius, color));
            }
            interpolated = steps;
        }

        trail.points.push(point);
        trails.last_samples.insert(identity, LastSample { point: cursor, time_ms: now_ms });
        AppendOutcome::Appended { interpolated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanvas_models::HandSide;

    const SURFACE: SurfaceSize = SurfaceSize { width: 1000, height: 1000 };
    const LEFT: HandIdentity = HandIdentity::Side(HandSide::Left);

    fn color() -> PaintColor {
        PaintColor::default()
    }

    #[test]
    fn test_first_point_starts_trail() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        let outcome = builder.add_point(&mut trails, LEFT, Landmark::new(0.5, 0.5, 0.0), color(), SURFACE, 0.0);
        assert_eq!(outcome, AppendOutcome::Started);
        assert_eq!(trails.get(&LEFT).unwrap().len(), 1);
    }

    #[test]
    fn test_stationary_sample_is_suppressed() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        let p = Landmark::new(0.3, 0.3, 0.01);
        builder.add_point(&mut trails, LEFT, p, color(), SURFACE, 0.0);
        for i in 1..10 {
            let outcome = builder.add_point(&mut trails, LEFT, p, color(), SURFACE, i as f64 * 16.0);
            assert_eq!(outcome, AppendOutcome::Suppressed);
        }
        assert_eq!(trails.get(&LEFT).unwrap().len(), 1);
    }

    #[test]
    fn test_no_consecutive_duplicates() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        let samples = [0.1, 0.1, 0.12, 0.12, 0.5, 0.5, 0.51];
        for (i, x) in samples.iter().enumerate() {
            builder.add_point(&mut trails, LEFT, Landmark::new(*x, 0.2, 0.0), color(), SURFACE, i as f64);
        }
        let points = trails.get(&LEFT).unwrap().points();
        for pair in points.windows(2) {
            assert!(pair[0].position().distance(&pair[1].position()) > 0.0);
        }
    }

    #[test]
    fn test_nearby_jump_is_interpolated() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        // 45px jump on a 1000px surface
        builder.add_point(&mut trails, LEFT, Landmark::new(0.10, 0.5, 0.0), color(), SURFACE, 0.0);
        let outcome =
            builder.add_point(&mut trails, LEFT, Landmark::new(0.145, 0.5, 0.0), color(), SURFACE, 16.0);
        assert_eq!(outcome, AppendOutcome::Appended { interpolated: 4 });

        let points = trails.get(&LEFT).unwrap().points();
        assert_eq!(points.len(), 6);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        for pair in xs.windows(2) {
            assert!(pair[1] > pair[0], "points must progress monotonically: {xs:?}");
        }
        for x in &xs[1..5] {
            assert!(*x > 0.10 && *x < 0.145);
        }
        assert_eq!(xs[5], 0.145);
    }

    #[test]
    fn test_forty_pixel_jump_fills_four_points() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        builder.add_point(&mut trails, LEFT, Landmark::new(0.10, 0.5, 0.0), color(), SURFACE, 0.0);
        let outcome =
            builder.add_point(&mut trails, LEFT, Landmark::new(0.14, 0.5, 0.0), color(), SURFACE, 16.0);
        assert_eq!(outcome, AppendOutcome::Appended { interpolated: 4 });
        assert_eq!(trails.get(&LEFT).unwrap().len(), 6);
    }

    #[test]
    fn test_far_jump_leaves_gap() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        // 200px jump
        builder.add_point(&mut trails, LEFT, Landmark::new(0.1, 0.5, 0.0), color(), SURFACE, 0.0);
        let outcome =
            builder.add_point(&mut trails, LEFT, Landmark::new(0.3, 0.5, 0.0), color(), SURFACE, 16.0);
        assert_eq!(outcome, AppendOutcome::Appended { interpolated: 0 });
        assert_eq!(trails.get(&LEFT).unwrap().len(), 2);
    }

    #[test]
    fn test_depth_only_motion_appends_without_interpolation() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        builder.add_point(&mut trails, LEFT, Landmark::new(0.5, 0.5, 0.0), color(), SURFACE, 0.0);
        let outcome =
            builder.add_point(&mut trails, LEFT, Landmark::new(0.5, 0.5, 0.2), color(), SURFACE, 16.0);
        assert_eq!(outcome, AppendOutcome::Appended { interpolated: 0 });
    }

    #[test]
    fn test_points_carry_current_color() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        let red = PaintColor::rgb(255, 0, 0);
        let green = PaintColor::rgb(0, 255, 0);
        builder.add_point(&mut trails, LEFT, Landmark::new(0.10, 0.5, 0.0), red, SURFACE, 0.0);
        builder.add_point(&mut trails, LEFT, Landmark::new(0.13, 0.5, 0.0), green, SURFACE, 16.0);
        let points = trails.get(&LEFT).unwrap().points();
        assert_eq!(points[0].color, red);
        assert!(points[1..].iter().all(|p| p.color == green));
    }

    #[test]
    fn test_identities_get_separate_trails() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        let right = HandIdentity::Side(HandSide::Right);
        builder.add_point(&mut trails, LEFT, Landmark::new(0.1, 0.1, 0.0), color(), SURFACE, 0.0);
        builder.add_point(&mut trails, right, Landmark::new(0.9, 0.9, 0.0), color(), SURFACE, 0.0);
        assert_eq!(trails.len(), 2);
        assert_eq!(trails.identities().copied().collect::<Vec<_>>(), vec![LEFT, right]);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let builder = TrailBuilder::default();
        let mut trails = TrailSet::new();
        builder.add_point(&mut trails, LEFT, Landmark::new(0.1, 0.1, 0.0), color(), SURFACE, 0.0);
        builder.add_point(&mut trails, LEFT, Landmark::new(0.12, 0.1, 0.0), color(), SURFACE, 16.0);
        trails.clear();
        assert!(trails.is_empty());
        assert_eq!(trails.point_count(), 0);

        let outcome = builder.add_point(&mut trails, LEFT, Landmark::new(0.12, 0.1, 0.0), color(), SURFACE, 32.0);
        assert_eq!(outcome, AppendOutcome::Started);
        assert_eq!(trails.get(&LEFT).unwrap().len(), 1);
    }

    #[test]
    fn test_speed_scaled_radius_thins_fast_strokes() {
        let builder = TrailBuilder::new(80.0, 10.0, StampRadius::speed_scaled(4.0, 14.0));
        let mut trails = TrailSet::new();
        builder.add_point(&mut trails, LEFT, Landmark::new(0.1, 0.5, 0.0), color(), SURFACE, 0.0);
        // 0.3 units in 100ms = 3 units/s, well past the max speed
        builder.add_point(&mut trails, LEFT, Landmark::new(0.4, 0.5, 0.0), color(), SURFACE, 100.0);
        let points = trails.get(&LEFT).unwrap().points();
        assert_eq!(points[0].radius_x, 14.0);
        assert_eq!(points[1].radius_x, 4.0);
        assert_eq!(points[1].radius_y, 4.0);
    }
}
