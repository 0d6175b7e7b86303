//! Hand identity resolution.
//!
//! Maps each detected hand in a frame to the key of the trail it draws
//! into. The default rule uses the mirrored side label and falls back to
//! the hand's detection index. The optional nearest-trail rule first
//! matches cursors to the identities seen on the previous frame, greedily
//! by distance, so a momentary side-label flip does not hand a stroke to
//! the other hand.

use hanvas_models::{HandIdentity, HandSide, Landmark};

use crate::config::IdentityStrategy;

/// One detected hand as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandCandidate {
    pub side: Option<HandSide>,
    /// Cursor for the hand, if one could be computed.
    pub cursor: Option<Landmark>,
}

/// Identity from the side label alone.
///
/// The feed is shown mirrored, so the detector's "Left" is drawn as the
/// user's right and keyed accordingly.
pub fn label_identity(index: usize, side: Option<HandSide>) -> HandIdentity {
    match side {
        Some(side) => HandIdentity::Side(side.mirrored()),
        None => HandIdentity::Positional(index),
    }
}

/// Stateful resolver for the per-frame identity assignment.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    strategy: IdentityStrategy,
    /// Maximum normalized distance for a continuity match
    continuity_radius: f64,
    /// Identities and cursors from the previous resolved frame
    previous: Vec<(HandIdentity, Landmark)>,
}

impl IdentityResolver {
    pub fn new(strategy: IdentityStrategy, continuity_radius: f64) -> Self {
        Self {
            strategy,
            continuity_radius,
            previous: Vec::new(),
        }
    }

    /// Assign an identity to every candidate, in candidate order.
    pub fn resolve(&mut self, hands: &[HandCandidate]) -> Vec<HandIdentity> {
        let identities = match self.strategy {
            IdentityStrategy::SideLabel => assign_labels(hands, vec![None; hands.len()]),
            IdentityStrategy::NearestTrail => self.resolve_nearest(hands),
        };

        self.previous = hands
            .iter()
            .zip(identities.iter())
            .filter_map(|(hand, identity)| hand.cursor.map(|cursor| (*identity, cursor)))
            .collect();

        identities
    }

    /// Forget the previous frame.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    fn resolve_nearest(&self, hands: &[HandCandidate]) -> Vec<HandIdentity> {
        let mut assigned: Vec<Option<HandIdentity>> = vec![None; hands.len()];
        let mut unmatched_previous: Vec<usize> = (0..self.previous.len()).collect();

        // Greedy matching by cursor distance
        for (hand_idx, hand) in hands.iter().enumerate() {
            let Some(cursor) = hand.cursor else {
                continue;
            };

            let mut best_distance = self.continuity_radius;
            let mut best: Option<usize> = None;
            for &prev_idx in &unmatched_previous {
                let distance = cursor.distance(&self.previous[prev_idx].1);
                if distance <= best_distance {
                    best_distance = distance;
                    best = Some(prev_idx);
                }
            }

            if let Some(prev_idx) = best {
                assigned[hand_idx] = Some(self.previous[prev_idx].0);
                unmatched_previous.retain(|&idx| idx != prev_idx);
            }
        }

        assign_labels(hands, assigned)
    }
}

/// Fill unassigned slots with the label rule. A label already in use this
/// frame falls back to the first free positional identity, so two hands
/// never share a trail.
fn assign_labels(hands: &[HandCandidate], mut assigned: Vec<Option<HandIdentity>>) -> Vec<HandIdentity> {
    let mut taken: Vec<HandIdentity> = assigned.iter().flatten().copied().collect();
    for (hand_idx, hand) in hands.iter().enumerate() {
        if assigned[hand_idx].is_some() {
            continue;
        }

        let mut identity = label_identity(hand_idx, hand.side);
        if taken.contains(&identity) {
            identity = (hand_idx..)
                .map(HandIdentity::Positional)
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or(HandIdentity::Positional(hand_idx));
        }
        taken.push(identity);
        assigned[hand_idx] = Some(identity);
    }

    assigned
        .into_iter()
        .enumerate()
        .map(|(index, identity)| identity.unwrap_or(HandIdentity::Positional(index)))
        .collect()
}
