//! Configuration for the drawing pipeline.

use std::time::Duration;

use hanvas_models::PaintColor;
use serde::{Deserialize, Serialize};

/// How the stamp radius of new trail points is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StampRadius {
    /// Every point gets the same radius (pixels).
    Fixed(f64),
    /// Radius shrinks linearly from `max` at rest to `min` once the hand
    /// moves at `max_speed` normalized units per second or faster.
    SpeedScaled { min: f64, max: f64, max_speed: f64 },
}

impl Default for StampRadius {
    fn default() -> Self {
        StampRadius::Fixed(10.0)
    }
}

impl StampRadius {
    /// Speed-scaled radius over speeds from 0 to 1.2 units/s.
    pub fn speed_scaled(min: f64, max: f64) -> Self {
        StampRadius::SpeedScaled {
            min,
            max,
            max_speed: 1.2,
        }
    }

    /// Radius for a sample moving at `speed` (None for the first sample of
    /// a trail, which is treated as stationary).
    pub fn radius_for(&self, speed: Option<f64>) -> f64 {
        match *self {
            StampRadius::Fixed(radius) => radius,
            StampRadius::SpeedScaled { min, max, max_speed } => {
                let speed = speed.unwrap_or(0.0).max(0.0);
                let t = if max_speed > 0.0 {
                    (speed / max_speed).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                max + (min - max) * t
            }
        }
    }
}

/// How detected hands are mapped to trail identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStrategy {
    /// Mirrored side label, else detection index.
    #[default]
    SideLabel,
    /// Match cursors to the previous frame's identities by distance first,
    /// falling back to the side label rule.
    NearestTrail,
}

/// Drawing pipeline configuration.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Pixel jump at or below which a gap is filled by interpolation (default: 80)
    pub nearby_threshold_px: f64,
    /// Target spacing of interpolated points in pixels (default: 10)
    pub max_gap_px: f64,
    /// Stamp radius policy (default: fixed 10px)
    pub stamp_radius: StampRadius,
    /// Whether stopping capture also clears the trail set (default: true)
    pub clear_trail_on_stop: bool,
    /// Frame pacing for the run loop (default: 16ms)
    pub frame_interval: Duration,
    /// Identity resolution strategy
    pub identity_strategy: IdentityStrategy,
    /// Maximum normalized distance for a nearest-trail match (default: 0.15)
    pub continuity_radius: f64,
    /// Initial paint color
    pub paint_color: PaintColor,
    /// Hands requested from the detector (default: 2)
    pub max_hands: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            nearby_threshold_px: 80.0,
            max_gap_px: 10.0,
            stamp_radius: StampRadius::default(),
            clear_trail_on_stop: true,
            frame_interval: Duration::from_millis(16), // ~60fps
            identity_strategy: IdentityStrategy::default(),
            continuity_radius: 0.15,
            paint_color: PaintColor::default(),
            max_hands: 2,
        }
    }
}

impl CanvasConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let stamp_radius = match std::env::var("HANVAS_SPEED_RADIUS").ok() {
            Some(range) => parse_radius_range(&range)
                .map(|(min, max)| StampRadius::speed_scaled(min, max))
                .unwrap_or(defaults.stamp_radius),
            None => std::env::var("HANVAS_STAMP_RADIUS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(StampRadius::Fixed)
                .unwrap_or(defaults.stamp_radius),
        };

        let identity_strategy = match std::env::var("HANVAS_IDENTITY").as_deref() {
            Ok("nearest") | Ok("nearest_trail") => IdentityStrategy::NearestTrail,
            _ => IdentityStrategy::SideLabel,
        };

        Self {
            nearby_threshold_px: std::env::var("HANVAS_NEARBY_THRESHOLD_PX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.nearby_threshold_px),
            max_gap_px: std::env::var("HANVAS_MAX_GAP_PX")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|gap: &f64| *gap > 0.0)
                .unwrap_or(defaults.max_gap_px),
            stamp_radius,
            clear_trail_on_stop: std::env::var("HANVAS_CLEAR_ON_STOP")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.clear_trail_on_stop),
            frame_interval: Duration::from_millis(
                std::env::var("HANVAS_FRAME_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(16),
            ),
            identity_strategy,
            continuity_radius: std::env::var("HANVAS_CONTINUITY_RADIUS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.continuity_radius),
            paint_color: std::env::var("HANVAS_PAINT_COLOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.paint_color),
            max_hands: std::env::var("HANVAS_MAX_HANDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_hands),
        }
    }
}

/// Parse `"min,max"`.
fn parse_radius_range(value: &str) -> Option<(f64, f64)> {
    let (min, max) = value.split_once(',')?;
    let min: f64 = min.trim().parse().ok()?;
    let max: f64 = max.trim().parse().ok()?;
    (min > 0.0 && max >= min).then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert_eq!(config.nearby_threshold_px, 80.0);
        assert_eq!(config.max_gap_px, 10.0);
        assert_eq!(config.stamp_radius, StampRadius::Fixed(10.0));
        assert!(config.clear_trail_on_stop);
    }

    #[test]
    fn test_fixed_radius_ignores_speed() {
        let radius = StampRadius::Fixed(10.0);
        assert_eq!(radius.radius_for(None), 10.0);
        assert_eq!(radius.radius_for(Some(5.0)), 10.0);
    }

    #[test]
    fn test_speed_scaled_radius_is_clamped() {
        let radius = StampRadius::speed_scaled(4.0, 14.0);
        assert_eq!(radius.radius_for(None), 14.0);
        assert_eq!(radius.radius_for(Some(0.0)), 14.0);
        assert!((radius.radius_for(Some(0.6)) - 9.0).abs() < 1e-9);
        assert_eq!(radius.radius_for(Some(1.2)), 4.0);
        assert_eq!(radius.radius_for(Some(50.0)), 4.0);
    }

    #[test]
    fn test_parse_radius_range() {
        assert_eq!(parse_radius_range("4, 14"), Some((4.0, 14.0)));
        assert_eq!(parse_radius_range("14,4"), None);
        assert_eq!(parse_radius_range("nope"), None);
    }
}
