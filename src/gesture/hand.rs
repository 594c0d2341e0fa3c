//! Hand landmarks as produced by the tracker.
//!
//! Coordinates are normalized image coordinates: `x` grows to the right of
//! the camera image, `y` grows downward, both in `[0, 1]`.

use std::time::Duration;

use glam::Vec2;

/// The landmarks the gesture derivation needs from one detected hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    pub wrist: Vec2,
    pub thumb_tip: Vec2,
    pub index_tip: Vec2,
    pub middle_tip: Vec2,
    pub ring_tip: Vec2,
    pub pinky_tip: Vec2,
}

impl Hand {
    /// Mean distance of the four fingertips from the wrist.
    ///
    /// Large for an open palm, small for a fist.
    pub fn openness(&self) -> f32 {
        let tips = [self.index_tip, self.middle_tip, self.ring_tip, self.pinky_tip];
        tips.iter().map(|tip| tip.distance(self.wrist)).sum::<f32>() / tips.len() as f32
    }

    /// Thumb-tip to index-tip distance.
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip.distance(self.index_tip)
    }

    /// A synthetic hand whose [`openness`](Self::openness) equals `spread`.
    ///
    /// Fingertips fan upward from `wrist`; with `pinched` the thumb tip
    /// touches the index tip. Used by the scripted tracker and in tests.
    pub fn synthetic(wrist: Vec2, spread: f32, pinched: bool) -> Self {
        let tip = |angle_deg: f32| {
            let a = angle_deg.to_radians();
            wrist + Vec2::new(a.sin(), -a.cos()) * spread
        };
        let index_tip = tip(-20.0);
        let thumb_tip = if pinched {
            index_tip + Vec2::new(0.005, 0.0)
        } else {
            tip(-70.0)
        };
        Self {
            wrist,
            thumb_tip,
            index_tip,
            middle_tip: tip(-5.0),
            ring_tip: tip(10.0),
            pinky_tip: tip(25.0),
        }
    }
}

/// One tracker result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandFrame {
    /// Capture time relative to the tracker's start.
    pub timestamp: Duration,
    /// Detected hands; empty when no hand is visible.
    pub hands: Vec<Hand>,
}

impl HandFrame {
    pub fn new(timestamp: Duration, hands: Vec<Hand>) -> Self {
        Self { timestamp, hands }
    }

    /// A frame in which nothing was detected.
    pub fn empty(timestamp: Duration) -> Self {
        Self { timestamp, hands: Vec::new() }
    }

    /// The hand that drives the gestures.
    pub fn primary(&self) -> Option<&Hand> {
        self.hands.first()
    }
}
