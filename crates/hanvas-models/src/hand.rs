//! Hand state and hand identity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::landmark::HandSide;

/// Discrete pose derived from finger extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandState {
    /// Four or more fingers extended. Acts as "pen up".
    Open,
    /// At most one finger extended.
    Fist,
    /// Anything in between.
    Partial,
}

impl HandState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandState::Open => "open",
            HandState::Fist => "fist",
            HandState::Partial => "partial",
        }
    }

    /// Text shown in the hand-state display.
    pub fn label(&self) -> &'static str {
        match self {
            HandState::Open => "Open hand",
            HandState::Fist => "Fist",
            HandState::Partial => "Partial hand",
        }
    }

    /// Whether this pose puts ink down.
    pub fn is_drawing(&self) -> bool {
        matches!(self, HandState::Fist | HandState::Partial)
    }
}

impl std::fmt::Display for HandState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Key that routes a detected hand's cursor to its own trail.
///
/// Derived from the (mirrored) side label when the detector reports one,
/// else from the hand's position in the detection list. This is not real
/// tracking: a side misclassification or a change in hand count can hand a
/// trail to the other hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandIdentity {
    Side(HandSide),
    /// Zero-based detection index.
    Positional(usize),
}

impl HandIdentity {
    pub fn positional(index: usize) -> Self {
        HandIdentity::Positional(index)
    }
}

impl std::fmt::Display for HandIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandIdentity::Side(side) => f.write_str(side.as_str()),
            HandIdentity::Positional(index) => write!(f, "Hand {}", index + 1),
        }
    }
}
