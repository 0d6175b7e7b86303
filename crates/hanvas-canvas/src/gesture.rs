//! Hand-state classification from finger extension.
//!
//! A finger counts as extended when its tip is clearly farther from the
//! wrist than its knuckle is. Four or more extended fingers is an open hand
//! (pen up), one or none is a fist, anything else is a partial hand.

use hanvas_models::landmark::{FINGER_BASES, FINGER_TIPS, WRIST};
use hanvas_models::{HandObservation, HandState};

/// Tip-to-wrist must exceed base-to-wrist by this factor.
pub const EXTENSION_RATIO: f64 = 1.15;

/// Count fingers whose tip is extended past its knuckle.
///
/// Fingers whose landmarks are missing are not counted.
pub fn count_extended_fingers(hand: &HandObservation) -> usize {
    let Some(wrist) = hand.get(WRIST) else {
        return 0;
    };

    FINGER_TIPS
        .iter()
        .zip(FINGER_BASES.iter())
        .filter(|(&tip, &base)| match (hand.get(tip), hand.get(base)) {
            (Some(tip), Some(base)) => tip.distance(wrist) > base.distance(wrist) * EXTENSION_RATIO,
            _ => false,
        })
        .count()
}

/// Classify one hand observation.
pub fn classify_hand(hand: &HandObservation) -> HandState {
    match count_extended_fingers(hand) {
        n if n >= 4 => HandState::Open,
        n if n <= 1 => HandState::Fist,
        _ => HandState::Partial,
    }
}
