//! Drawing cursor extraction.

use hanvas_models::{HandObservation, Landmark};

/// Centroid of all landmarks, or `None` for an empty observation.
pub fn landmarks_midpoint(hand: &HandObservation) -> Option<Landmark> {
    if hand.is_empty() {
        return None;
    }

    let n = hand.landmarks.len() as f64;
    let (sx, sy, sz) = hand
        .landmarks
        .iter()
        .fold((0.0, 0.0, 0.0), |(sx, sy, sz), lm| (sx + lm.x, sy + lm.y, sz + lm.z));

    Some(Landmark::new(sx / n, sy / n, sz / n))
}
