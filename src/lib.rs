//! # yuletree
//!
//! An interactive 3D holiday tree made of particles.
//!
//! Thousands of particles in a handful of categories (foliage, ornaments,
//! hanging hats and socks, photo cards, dust, sparks) blend between a
//! scattered cloud and a cone-shaped tree. Hand gestures or UI controls drive
//! the blend, spin the tree, zoom the camera and pull a random photo up for a
//! closer look.
//!
//! ## Quick Start
//!
//! ```ignore
//! use yuletree::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     yuletree::app::run(SceneConfig::default(), GestureMode::Demo)
//! }
//! ```
//!
//! ## Headless use
//!
//! The simulation has no GPU dependency. Drive a [`Scene`] directly and hand
//! its output to any [`InstanceSink`]:
//!
//! ```ignore
//! let mut scene = Scene::new(SceneConfig::default())?;
//! scene.upload_colors(&mut sink);
//! loop {
//!     scene.signal_mut().post_mode(Some(Mode::Chaos));
//!     scene.frame(dt, time);
//!     scene.submit(&mut sink);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Transition
//!
//! A single progress value in `[0, 1]` is damped toward the committed mode
//! (`Formed` = 1, `Chaos` = 0) and smoothstepped before every particle blends
//! `scatter + (formed - scatter) * ease`. See [`transition`].
//!
//! ### Interaction signal
//!
//! [`InteractionSignal`] carries latest-value-wins velocities and target mode
//! plus a one-shot focus trigger. Gesture modes are debounced by
//! [`ModeConfirmer`]; UI toggles commit immediately.
//!
//! ### Gestures
//!
//! A [`gesture::HandTracker`] runs on its own thread. The render loop drains
//! its frames without blocking and the [`gesture::GestureDeriver`] turns
//! landmarks into intents. Tracker failures degrade to UI-only control.

pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod focus;
pub mod generators;
pub mod gesture;
pub mod gpu;
pub mod input;
pub mod motion;
pub mod particle;
pub mod picking;
pub mod scene;
pub mod signal;
pub mod sink;
pub mod transition;

pub use camera::OrbitCamera;
pub use config::SceneConfig;
pub use error::{AppError, ConfigError, GestureError, GpuError};
pub use focus::{FocusController, FocusState};
pub use glam::{Quat, Vec2, Vec3};
pub use particle::{Category, HangingKind, Particle, ParticleGroup, ParticleId};
pub use scene::{FrameEvents, Scene};
pub use signal::{InteractionSignal, ModeConfirmer};
pub use sink::{InstanceColor, InstanceSink, InstanceTransform, Overlay, OverlayItem, Shape};
pub use transition::{Mode, TransitionState};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use yuletree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::GestureMode;
    pub use crate::config::SceneConfig;
    pub use crate::error::AppError;
    pub use crate::gesture::{GesturePipeline, GestureStatus, HandTracker, ScriptedTracker};
    pub use crate::input::{Input, KeyCode, MouseButton};
    pub use crate::scene::Scene;
    pub use crate::sink::InstanceSink;
    pub use crate::transition::Mode;
    pub use crate::{Vec2, Vec3};
}
