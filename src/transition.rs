//! Damped scatter/formed transition.
//!
//! A single `progress` scalar per tree approaches its binary target with
//! frame-rate independent exponential decay. Spatial interpolation uses the
//! smoothstep of `progress`, so motion starts and stops with zero velocity.

use serde::{Deserialize, Serialize};

/// The tree's binary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Particles gather into the tree shape.
    Formed,
    /// Particles drift in the scatter volume.
    Chaos,
}

impl Mode {
    /// Target value of `progress` for this mode.
    #[inline]
    pub fn target(self) -> f32 {
        match self {
            Mode::Formed => 1.0,
            Mode::Chaos => 0.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Formed => Mode::Chaos,
            Mode::Chaos => Mode::Formed,
        }
    }
}

/// Smoothstep easing: `t² (3 - 2t)`, with `t` clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// One exponential-approach step: `target - (target - current) * exp(-rate * dt)`.
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    target - (target - current) * (-rate * dt).exp()
}

/// Per-tree transition state.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionState {
    progress: f32,
    target: f32,
    rate: f32,
    rotation: f32,
}

impl TransitionState {
    /// Start fully scattered, heading for `mode`.
    pub fn new(mode: Mode, rate: f32) -> Self {
        Self {
            progress: 0.0,
            target: mode.target(),
            rate,
            rotation: 0.0,
        }
    }

    /// Point the transition at `mode`. Progress is untouched.
    pub fn set_mode(&mut self, mode: Mode) {
        self.target = mode.target();
    }

    /// Advance one frame.
    ///
    /// `spin` is the total angular velocity (gesture rotation plus ambient
    /// auto-rotation) added to the rotation accumulator.
    pub fn advance(&mut self, dt: f32, spin: f32) {
        let dt = dt.max(0.0);
        self.progress = damp(self.progress, self.target, self.rate, dt).clamp(0.0, 1.0);
        self.rotation += spin * dt;
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Eased blend factor used for all spatial interpolation.
    #[inline]
    pub fn ease(&self) -> f32 {
        smoothstep(self.progress)
    }

    /// Accumulated tree rotation about the vertical axis, in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
}
