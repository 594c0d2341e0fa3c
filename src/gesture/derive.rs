//! Landmarks to interaction intents.
//!
//! - openness: open palm asks for `Chaos`, a fist asks for `Formed`
//! - pinch: two thumb-index pinch edges within the double-pinch window fire
//!   the focus trigger once
//! - wrist x: rotation velocity outside a centre dead zone (mirrored, like a
//!   selfie camera)
//! - wrist y: zoom in above the upper band, zoom out below the lower band

use std::time::Duration;

use crate::config::GestureConfig;
use crate::gesture::hand::{Hand, HandFrame};
use crate::signal::InteractionSignal;
use crate::transition::Mode;

/// What one frame of landmarks means.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureReading {
    pub mode: Option<Mode>,
    pub rotation_velocity: f32,
    pub zoom_velocity: f32,
    /// Pinch edges counted so far in the current window; 2 on a double pinch.
    pub pinch_count: u32,
    /// Whether this frame completed a double pinch.
    pub focus: bool,
}

/// Stateful gesture classifier.
#[derive(Debug, Clone)]
pub struct GestureDeriver {
    config: GestureConfig,
    pinching: bool,
    pinch_count: u32,
    last_pinch: Option<Duration>,
}

impl GestureDeriver {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            pinching: false,
            pinch_count: 0,
            last_pinch: None,
        }
    }

    /// Pinch edges counted in the current window.
    pub fn pinch_count(&self) -> u32 {
        self.pinch_count
    }

    /// Classify a frame without touching any signal.
    pub fn derive(&mut self, frame: &HandFrame) -> GestureReading {
        let Some(hand) = frame.primary() else {
            // A vanished hand releases any pinch in progress.
            self.pinching = false;
            return GestureReading {
                pinch_count: self.pinch_count,
                ..GestureReading::default()
            };
        };

        let (pinch_count, focus) = self.track_pinch(hand, frame.timestamp);
        GestureReading {
            mode: self.classify_mode(hand),
            rotation_velocity: self.rotation_velocity(hand),
            zoom_velocity: self.zoom_velocity(hand),
            pinch_count,
            focus,
        }
    }

    /// Classify a frame and post the result to `signal`.
    ///
    /// Continuous fields are overwritten; the focus trigger is only ever set.
    pub fn apply(&mut self, frame: &HandFrame, signal: &mut InteractionSignal) -> GestureReading {
        let reading = self.derive(frame);
        signal.post_motion(reading.rotation_velocity, reading.zoom_velocity);
        signal.post_mode(reading.mode);
        if reading.focus {
            signal.fire_focus();
        }
        reading
    }

    fn classify_mode(&self, hand: &Hand) -> Option<Mode> {
        let openness = hand.openness();
        if openness >= self.config.open_threshold {
            Some(Mode::Chaos)
        } else if openness <= self.config.closed_threshold {
            Some(Mode::Formed)
        } else {
            None
        }
    }

    fn track_pinch(&mut self, hand: &Hand, now: Duration) -> (u32, bool) {
        let pinched = hand.pinch_distance() < self.config.pinch_distance;
        let rising = pinched && !self.pinching;
        self.pinching = pinched;
        if !rising {
            return (self.pinch_count, false);
        }

        let window = Duration::from_millis(self.config.double_pinch_window_ms);
        match self.last_pinch {
            Some(last) if self.pinch_count == 1 && now.saturating_sub(last) <= window => {
                log::debug!("double pinch after {:?}", now.saturating_sub(last));
                self.pinch_count = 0;
                self.last_pinch = None;
                (2, true)
            }
            _ => {
                log::debug!("pinch at {:?}", now);
                self.pinch_count = 1;
                self.last_pinch = Some(now);
                (1, false)
            }
        }
    }

    fn rotation_velocity(&self, hand: &Hand) -> f32 {
        let offset = 0.5 - hand.wrist.x;
        if offset.abs() <= self.config.rotation_dead_zone {
            0.0
        } else {
            offset * self.config.rotation_gain
        }
    }

    fn zoom_velocity(&self, hand: &Hand) -> f32 {
        let y = hand.wrist.y;
        if y < self.config.zoom_in_below {
            -self.config.zoom_speed
        } else if y > self.config.zoom_out_above {
            self.config.zoom_speed
        } else {
            0.0
        }
    }
}
