//! Hand skeleton overlay.

use hanvas_models::{HandObservation, PaintColor, HAND_CONNECTIONS};

use crate::compositor::Surface;

/// Connector line color.
pub const CONNECTOR_COLOR: PaintColor = PaintColor::rgb(0x9c, 0xc2, 0xee);

/// Landmark dot color.
pub const LANDMARK_COLOR: PaintColor = PaintColor::rgb(0x4f, 0x89, 0xc6);

/// Paints a visual of the detected hand on top of the trails.
///
/// Purely cosmetic: painters never touch trail state.
pub trait SkeletonPainter: Send + Sync {
    fn paint(&self, surface: &mut Surface, hand: &HandObservation);
}

/// Draws the hand topology as lines and the landmarks as dots.
#[derive(Debug, Clone)]
pub struct ConnectorPainter {
    pub connector_color: PaintColor,
    pub connector_width: f64,
    pub landmark_color: PaintColor,
    pub landmark_width: f64,
}

impl Default for ConnectorPainter {
    fn default() -> Self {
        Self {
            connector_color: CONNECTOR_COLOR,
            connector_width: 5.0,
            landmark_color: LANDMARK_COLOR,
            landmark_width: 2.0,
        }
    }
}

impl SkeletonPainter for ConnectorPainter {
    fn paint(&self, surface: &mut Surface, hand: &HandObservation) {
        let size = surface.size();

        for (a, b) in HAND_CONNECTIONS {
            if let (Some(a), Some(b)) = (hand.get(a), hand.get(b)) {
                surface.stroke_line(
                    size.to_pixels(a),
                    size.to_pixels(b),
                    self.connector_width,
                    self.connector_color,
                );
            }
        }

        // Dots are a short stroke so they share the connector rasterizer.
        for landmark in &hand.landmarks {
            let center = size.to_pixels(landmark);
            surface.stroke_line(center, center, self.landmark_width * 2.0, self.landmark_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::SurfaceSize;
    use hanvas_models::{Landmark, LANDMARK_COUNT};

    #[test]
    fn test_connectors_and_landmarks_are_drawn() {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        landmarks[1] = Landmark::new(0.1, 0.5, 0.0);
        let hand = HandObservation::new(landmarks);

        let mut surface = Surface::new(SurfaceSize::new(100, 100));
        ConnectorPainter::default().paint(&mut surface, &hand);

        // Midway along the wrist -> thumb connector.
        assert_eq!(surface.pixel(30, 50), Some(CONNECTOR_COLOR.to_array()));
        // Landmark dots are drawn last.
        assert_eq!(surface.pixel(50, 50), Some(LANDMARK_COLOR.to_array()));
        assert_eq!(surface.pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_short_observation_does_not_panic() {
        let hand = HandObservation::new(vec![Landmark::new(0.5, 0.5, 0.0); 3]);
        let mut surface = Surface::new(SurfaceSize::new(10, 10));
        ConnectorPainter::default().paint(&mut surface, &hand);
    }
}
