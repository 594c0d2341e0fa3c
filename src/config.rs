//! Scene configuration.
//!
//! Every tunable of the display lives here and can be loaded from JSON.
//! All sections default, so an empty object (or no file at all) yields the
//! full tree.
//!
//! ```ignore
//! let config = SceneConfig::load("tree.json")?;
//! let scene = Scene::new(config);
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particle::{Category, HangingKind};

/// Root configuration for a [`Scene`](crate::scene::Scene).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub groups: Vec<GroupConfig>,
    pub transition: TransitionConfig,
    pub motion: MotionConfig,
    pub dust: DustConfig,
    pub focus: FocusConfig,
    pub gesture: GestureConfig,
    pub camera: CameraConfig,
    /// How often the mode confirmation step polls the gesture's target mode.
    pub mode_poll_interval_ms: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            transition: TransitionConfig::default(),
            motion: MotionConfig::default(),
            dust: DustConfig::default(),
            focus: FocusConfig::default(),
            gesture: GestureConfig::default(),
            camera: CameraConfig::default(),
            mode_poll_interval_ms: 100,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject configs the simulation cannot run sensibly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for group in &self.groups {
            group.validate()?;
        }
        if !(self.transition.rate > 0.0) {
            return Err(invalid("transition.rate must be positive"));
        }
        if !(self.focus.smoothing > 0.0) {
            return Err(invalid("focus.smoothing must be positive"));
        }
        if !(self.focus.view_scale > 0.0) {
            return Err(invalid("focus.view_scale must be positive"));
        }
        if self.dust.formed_radius < 0.0 || self.dust.chaos_radius < 0.0 {
            return Err(invalid("dust target radii must not be negative"));
        }
        if !(self.dust.stiffness > 0.0) {
            return Err(invalid("dust.stiffness must be positive"));
        }
        if !(self.dust.min_radius >= 0.0) {
            return Err(invalid("dust.min_radius must not be negative"));
        }
        let g = &self.gesture;
        if g.closed_threshold >= g.open_threshold {
            return Err(invalid("gesture.closed_threshold must be below open_threshold"));
        }
        if g.zoom_in_below >= g.zoom_out_above {
            return Err(invalid("gesture zoom band is inverted"));
        }
        if self.camera.min_distance > self.camera.max_distance {
            return Err(invalid("camera distance range is inverted"));
        }
        if self.mode_poll_interval_ms == 0 {
            return Err(invalid("mode_poll_interval_ms must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// One particle group: a category plus its count, shapes and palette.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    pub name: String,
    pub category: Category,
    pub count: u32,
    pub formed: ConeShape,
    pub scatter_radius: f32,
    /// Baseline scale is drawn uniformly from `[min, max)`.
    pub scale_range: [f32; 2],
    pub palette: Vec<[f32; 3]>,
}

impl GroupConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.formed.height > 0.0) {
            return Err(invalid(format!("group '{}': cone height must be positive", self.name)));
        }
        if self.formed.radius < 0.0 || self.scatter_radius < 0.0 {
            return Err(invalid(format!("group '{}': radii must not be negative", self.name)));
        }
        if !(0.0..=1.0).contains(&self.formed.shell) {
            return Err(invalid(format!("group '{}': shell must be within [0, 1]", self.name)));
        }
        let [lo, hi] = self.scale_range;
        if !(lo > 0.0 && lo <= hi) {
            return Err(invalid(format!("group '{}': scale_range must be positive and ordered", self.name)));
        }
        if self.palette.is_empty() {
            return Err(invalid(format!("group '{}': palette is empty", self.name)));
        }
        Ok(())
    }
}

/// Cone used for the formed (tree) configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConeShape {
    pub height: f32,
    /// Radius at the base; shrinks linearly to zero at the apex.
    pub radius: f32,
    pub y_offset: f32,
    /// Extra angle in radians per unit of height.
    pub twist: f32,
    /// Constrain points to a thin shell at the cone's skin.
    pub surface_only: bool,
    /// Shell thickness as a fraction of the local radius.
    pub shell: f32,
}

impl Default for ConeShape {
    fn default() -> Self {
        Self {
            height: 14.0,
            radius: 5.5,
            y_offset: -7.0,
            twist: 1.6,
            surface_only: false,
            shell: 0.12,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    /// Exponential approach rate of `progress` toward its target, per second.
    pub rate: f32,
    /// Ambient tree spin in radians per second.
    pub auto_rotate: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self { rate: 2.5, auto_rotate: 0.12 }
    }
}

/// Amplitudes and rates of the per-category secondary motion.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    pub foliage_bob: f32,
    pub ornament_bob: f32,
    pub ornament_pulse: f32,
    pub pulse_rate: f32,
    pub sway_amplitude: f32,
    pub sway_rate: f32,
    pub photo_bob: f32,
    pub twinkle_rate: f32,
    pub shimmer: f32,
    pub shimmer_rate: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            foliage_bob: 0.35,
            ornament_bob: 0.08,
            ornament_pulse: 0.06,
            pulse_rate: 2.0,
            sway_amplitude: 0.35,
            sway_rate: 1.8,
            photo_bob: 0.05,
            twinkle_rate: 6.0,
            shimmer: 0.15,
            shimmer_rate: 0.6,
        }
    }
}

/// Radial spring for the ambient dust group.
///
/// The two target radii are tuned separately from the main transition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DustConfig {
    pub formed_radius: f32,
    pub chaos_radius: f32,
    pub stiffness: f32,
    /// Base angular rate about the vertical axis, scaled per particle by `speed`.
    pub orbit_rate: f32,
    pub jitter: f32,
    /// Below this radius the spring is skipped.
    pub min_radius: f32,
}

impl Default for DustConfig {
    fn default() -> Self {
        Self {
            formed_radius: 8.0,
            chaos_radius: 16.0,
            stiffness: 1.2,
            orbit_rate: 0.25,
            jitter: 0.4,
            min_radius: 1e-3,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FocusConfig {
    /// Smoothing constant `k` in `1 - exp(-k * dt)`.
    pub smoothing: f32,
    /// Distance in front of the camera where the focused photo settles.
    pub view_distance: f32,
    pub view_scale: f32,
    pub hover_scale: f32,
    /// Pointer pick radius in NDC units.
    pub pick_radius: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            smoothing: 6.0,
            view_distance: 6.0,
            view_scale: 3.2,
            hover_scale: 1.15,
            pick_radius: 0.05,
        }
    }
}

/// Thresholds applied to normalized hand landmarks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    /// Mean fingertip-to-wrist distance at or above which the hand is open.
    pub open_threshold: f32,
    /// Mean fingertip-to-wrist distance at or below which the hand is a fist.
    pub closed_threshold: f32,
    pub pinch_distance: f32,
    pub double_pinch_window_ms: u64,
    pub rotation_gain: f32,
    /// Half-width of the neutral band around the image centre.
    pub rotation_dead_zone: f32,
    pub zoom_in_below: f32,
    pub zoom_out_above: f32,
    pub zoom_speed: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_threshold: 0.3,
            closed_threshold: 0.18,
            pinch_distance: 0.05,
            double_pinch_window_ms: 500,
            rotation_gain: 3.0,
            rotation_dead_zone: 0.1,
            zoom_in_below: 0.3,
            zoom_out_above: 0.7,
            zoom_speed: 8.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub pitch: f32,
    pub target: Vec3,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 28.0,
            min_distance: 10.0,
            max_distance: 60.0,
            pitch: 0.15,
            target: Vec3::ZERO,
            fov_degrees: 45.0,
        }
    }
}

fn default_groups() -> Vec<GroupConfig> {
    let tree = ConeShape::default();
    let skin = ConeShape { surface_only: true, ..tree };
    vec![
        GroupConfig {
            name: "foliage".into(),
            category: Category::Foliage,
            count: 3000,
            formed: tree,
            scatter_radius: 18.0,
            scale_range: [0.08, 0.2],
            palette: vec![[0.02, 0.35, 0.12], [0.05, 0.45, 0.18], [0.1, 0.55, 0.22], [0.75, 0.62, 0.2]],
        },
        GroupConfig {
            name: "ornaments".into(),
            category: Category::Ornament,
            count: 160,
            formed: skin,
            scatter_radius: 16.0,
            scale_range: [0.25, 0.45],
            palette: vec![[0.85, 0.08, 0.1], [0.95, 0.75, 0.2], [0.75, 0.78, 0.82], [0.1, 0.3, 0.8]],
        },
        GroupConfig {
            name: "hats".into(),
            category: Category::Hanging(HangingKind::Hat),
            count: 20,
            formed: ConeShape { height: 12.0, radius: 5.0, ..skin },
            scatter_radius: 16.0,
            scale_range: [0.4, 0.55],
            palette: vec![[0.8, 0.05, 0.08], [0.9, 0.9, 0.9]],
        },
        GroupConfig {
            name: "socks".into(),
            category: Category::Hanging(HangingKind::Sock),
            count: 20,
            formed: ConeShape { height: 12.0, radius: 5.0, ..skin },
            scatter_radius: 16.0,
            scale_range: [0.4, 0.55],
            palette: vec![[0.75, 0.05, 0.1], [0.05, 0.45, 0.15], [0.95, 0.95, 0.95]],
        },
        GroupConfig {
            name: "photos".into(),
            category: Category::Photo,
            count: 24,
            formed: ConeShape { height: 11.0, radius: 5.2, y_offset: -6.0, ..skin },
            scatter_radius: 14.0,
            scale_range: [0.9, 1.1],
            palette: vec![[0.98, 0.95, 0.88], [0.95, 0.9, 0.8]],
        },
        GroupConfig {
            name: "dust".into(),
            category: Category::Dust,
            count: 600,
            formed: ConeShape { height: 16.0, radius: 9.0, y_offset: -8.0, ..tree },
            scatter_radius: 20.0,
            scale_range: [0.03, 0.08],
            palette: vec![[1.0, 0.95, 0.8], [0.9, 0.85, 1.0]],
        },
        GroupConfig {
            name: "sparks".into(),
            category: Category::Spark,
            count: 300,
            formed: skin,
            scatter_radius: 18.0,
            scale_range: [0.06, 0.12],
            palette: vec![[1.0, 0.85, 0.45], [1.0, 0.95, 0.7], [0.7, 0.85, 1.0]],
        },
    ]
}
