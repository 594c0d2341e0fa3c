//! The scene coordinator.
//!
//! [`Scene`] owns everything that changes per frame: the particle groups, the
//! transition, the interaction signal, mode confirmation, focus/hover and the
//! camera. One call to [`Scene::frame`] runs the whole update in a fixed
//! order; [`Scene::submit`] then hands the results to a render backend.
//!
//! Frame order:
//!
//! 1. poll the gesture's target mode and commit it if it changed
//! 2. consume the one-shot focus trigger and toggle focus
//! 3. advance the transition progress and the tree rotation
//! 4. integrate camera zoom
//! 5. update every particle group
//! 6. glide the focus visual toward its viewing pose

use std::time::Duration;

use glam::{Mat3, Quat, Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::camera::OrbitCamera;
use crate::config::SceneConfig;
use crate::engine::{self, PhotoSelection};
use crate::error::ConfigError;
use crate::focus::{FocusController, FocusState};
use crate::motion::FrameContext;
use crate::particle::{Category, ParticleGroup, ParticleId};
use crate::picking;
use crate::signal::{InteractionSignal, ModeConfirmer};
use crate::sink::{InstanceColor, InstanceSink, InstanceTransform, Overlay, OverlayItem, Shape};
use crate::transition::{Mode, TransitionState};

/// Outline color around a hovered photo.
const HOVER_RING_COLOR: Vec3 = Vec3::new(1.0, 0.84, 0.35);
/// Ring size relative to the hovered photo.
const HOVER_RING_SCALE: f32 = 1.12;

/// What changed during one [`Scene::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    /// Mode committed from the gesture this frame.
    pub committed: Option<Mode>,
    /// New focus state if the focus trigger was consumed this frame.
    pub focus: Option<FocusState>,
}

/// The whole display.
pub struct Scene {
    config: SceneConfig,
    groups: Vec<ParticleGroup>,
    photo_group: Option<usize>,
    mode: Mode,
    transition: TransitionState,
    signal: InteractionSignal,
    confirmer: ModeConfirmer,
    focus: FocusController,
    camera: OrbitCamera,
    rng: SmallRng,
    elapsed: f32,
}

impl Scene {
    /// Build the scene with fresh entropy.
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Build the scene with a fixed seed, for reproducible runs.
    pub fn with_seed(config: SceneConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: SceneConfig, mut rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let groups: Vec<ParticleGroup> = config
            .groups
            .iter()
            .map(|g| ParticleGroup::generate(&mut rng, g))
            .collect();
        let photo_group = groups.iter().position(|g| g.category() == Category::Photo);
        let total: usize = groups.iter().map(ParticleGroup::len).sum();
        log::info!("generated {} particles in {} groups", total, groups.len());

        let mode = Mode::Formed;
        Ok(Self {
            transition: TransitionState::new(mode, config.transition.rate),
            confirmer: ModeConfirmer::new(Duration::from_millis(config.mode_poll_interval_ms)),
            focus: FocusController::new(config.focus),
            camera: OrbitCamera::new(&config.camera),
            signal: InteractionSignal::new(),
            mode,
            groups,
            photo_group,
            rng,
            elapsed: 0.0,
            config,
        })
    }

    /// Run one frame. `dt` and `time` are in seconds.
    pub fn frame(&mut self, dt: f32, time: f32) -> FrameEvents {
        let dt = dt.max(0.0);
        self.elapsed = time;
        let mut events = FrameEvents::default();

        events.committed = self
            .confirmer
            .update(Duration::from_secs_f32(dt), &self.signal, &mut self.mode);

        if self.signal.take_focus_trigger() {
            events.focus = Some(self.toggle_focus());
        }

        self.transition.set_mode(self.mode);
        let spin = self.signal.rotation_velocity() + self.config.transition.auto_rotate;
        self.transition.advance(dt, spin);

        self.camera.advance_zoom(self.signal.zoom_velocity(), dt);

        let ctx = FrameContext {
            time,
            dt,
            ease: self.transition.ease(),
            mode: self.mode,
            motion: &self.config.motion,
            dust: &self.config.dust,
        };
        let selection = PhotoSelection {
            focused: self.focus.focused(),
            hovered: self.focus.hovered(),
        };
        engine::update_all(
            &mut self.groups,
            &ctx,
            self.photo_group,
            selection,
            self.config.focus.hover_scale,
        );

        let target = self.focus_target();
        self.focus.animate(dt, &target);

        events
    }

    fn toggle_focus(&mut self) -> FocusState {
        let tree = self.tree_rotation();
        match self.photo_group {
            Some(index) => self.focus.toggle(&mut self.rng, &self.groups[index], tree),
            None => {
                log::info!("focus trigger ignored: no photo group");
                self.focus.state()
            }
        }
    }

    /// Viewing pose in front of the camera, card facing the viewer.
    fn focus_target(&self) -> InstanceTransform {
        let forward = self.camera.forward();
        let back = -forward;
        let right = Vec3::Y.cross(back).normalize_or_zero();
        let rotation = if right == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_mat3(&Mat3::from_cols(right, back.cross(right), back))
        };
        InstanceTransform {
            position: self.camera.position() + forward * self.config.focus.view_distance,
            rotation,
            scale: self.config.focus.view_scale,
        }
    }

    /// Flip the committed mode from a UI control.
    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled())
    }

    /// Commit `mode` directly, bypassing gesture confirmation.
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        if mode != self.mode {
            log::info!("mode set: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.transition.set_mode(mode);
        }
        self.mode
    }

    /// Update hover from a pointer position in NDC, or clear it with `None`.
    pub fn hover_at(&mut self, pointer: Option<Vec2>, aspect: f32) -> Option<ParticleId> {
        let hovered = match (pointer, self.photo_group) {
            (Some(pointer), Some(index)) => picking::pick_photo(
                &self.camera,
                aspect,
                &self.groups[index],
                self.tree_rotation(),
                pointer,
                self.config.focus.pick_radius,
            ),
            _ => None,
        };
        self.focus.set_hovered(hovered);
        hovered
    }

    pub fn set_hovered(&mut self, id: Option<ParticleId>) {
        self.focus.set_hovered(id);
    }

    /// Push every group's colors. Call once after the backend is created.
    pub fn upload_colors(&self, sink: &mut dyn InstanceSink) {
        for (index, group) in self.groups.iter().enumerate() {
            sink.write_colors(index, &group.colors());
        }
    }

    /// Push this frame's transforms and overlay.
    pub fn submit(&self, sink: &mut dyn InstanceSink) {
        for (index, group) in self.groups.iter().enumerate() {
            sink.write_transforms(index, group.transforms());
        }
        sink.write_overlay(&self.overlay());
    }

    /// Focus card and hover ring for this frame, in world space.
    pub fn overlay(&self) -> Overlay {
        let Some(photos) = self.photo_group.map(|i| &self.groups[i]) else {
            return Overlay::default();
        };
        let tree = self.tree_rotation();

        let focus = self.focus.focused().and_then(|id| photos.get(id)).map(|p| OverlayItem {
            transform: *self.focus.visual(),
            color: InstanceColor { rgb: p.color, shape: Shape::Card },
        });

        let hover = self
            .focus
            .hovered()
            .filter(|id| self.focus.focused() != Some(*id))
            .and_then(|id| photos.transform(id))
            .filter(|t| t.scale > 0.0)
            .map(|t| OverlayItem {
                transform: InstanceTransform {
                    position: tree * t.position,
                    rotation: tree * t.rotation,
                    scale: t.scale * HOVER_RING_SCALE,
                },
                color: InstanceColor { rgb: HOVER_RING_COLOR, shape: Shape::Ring },
            });

        Overlay { focus, hover }
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    /// Index of the photo group, if the scene has one.
    pub fn photo_group(&self) -> Option<usize> {
        self.photo_group
    }

    /// Committed binary mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn transition(&self) -> &TransitionState {
        &self.transition
    }

    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    pub fn signal(&self) -> &InteractionSignal {
        &self.signal
    }

    /// Producer access for gestures and UI controls.
    pub fn signal_mut(&mut self) -> &mut InteractionSignal {
        &mut self.signal
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// World rotation applied to every group.
    pub fn tree_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.transition.rotation())
    }

    /// `time` passed to the last frame.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn particle_count(&self) -> usize {
        self.groups.iter().map(ParticleGroup::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::with_seed(SceneConfig::default(), 7).unwrap()
    }

    fn run(scene: &mut Scene, frames: usize, dt: f32) {
        for _ in 0..frames {
            let t = scene.elapsed() + dt;
            scene.frame(dt, t);
        }
    }

    #[test]
    fn test_starts_formed_from_scatter() {
        let s = scene();
        assert_eq!(s.mode(), Mode::Formed);
        assert_eq!(s.transition().progress(), 0.0);
        assert_eq!(s.particle_count(), 3000 + 160 + 20 + 20 + 24 + 600 + 300);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SceneConfig::default();
        config.groups[0].palette.clear();
        assert!(Scene::new(config).is_err());
    }

    #[test]
    fn test_converges_to_tree() {
        let mut s = scene();
        run(&mut s, 50, 0.1);
        assert!(s.transition().progress() > 0.9);
    }

    #[test]
    fn test_gesture_mode_commits_after_poll() {
        let mut s = scene();
        s.signal_mut().post_mode(Some(Mode::Chaos));
        let events = s.frame(0.06, 0.06);
        assert_eq!(events.committed, None);
        assert_eq!(s.mode(), Mode::Formed);
        let events = s.frame(0.06, 0.12);
        assert_eq!(events.committed, Some(Mode::Chaos));
        assert_eq!(s.transition().target(), 0.0);
    }

    #[test]
    fn test_focus_trigger_consumed_once() {
        let mut s = scene();
        s.signal_mut().fire_focus();
        let first = s.frame(0.016, 0.016);
        assert!(matches!(first.focus, Some(FocusState::Focused(_))));
        let second = s.frame(0.016, 0.032);
        assert_eq!(second.focus, None);
        assert!(s.focus().focused().is_some());
    }

    #[test]
    fn test_focused_photo_hidden_and_overlay_shown() {
        let mut s = scene();
        s.signal_mut().fire_focus();
        s.frame(0.016, 0.016);
        let id = s.focus().focused().unwrap();
        let photos = &s.groups()[s.photo_group().unwrap()];
        assert_eq!(photos.transform(id).unwrap().scale, 0.0);
        let overlay = s.overlay();
        assert_eq!(overlay.focus.map(|i| i.color.shape), Some(Shape::Card));
    }

    #[test]
    fn test_focus_visual_approaches_camera() {
        let mut s = scene();
        s.signal_mut().fire_focus();
        run(&mut s, 240, 1.0 / 60.0);
        let target = s.focus_target();
        assert!((s.focus().visual().position - target.position).length() < 0.05);
    }

    #[test]
    fn test_hover_ring_skips_focused_photo() {
        let mut s = scene();
        s.signal_mut().fire_focus();
        s.frame(0.016, 0.016);
        let id = s.focus().focused().unwrap();
        s.set_hovered(Some(id));
        assert!(s.overlay().hover.is_none());

        let other = (id + 1) % 24;
        s.set_hovered(Some(other));
        s.frame(0.016, 0.032);
        assert_eq!(s.overlay().hover.map(|i| i.color.shape), Some(Shape::Ring));
    }

    #[test]
    fn test_rotation_velocity_spins_tree() {
        let mut s = scene();
        s.signal_mut().post_motion(1.0, 0.0);
        run(&mut s, 10, 0.1);
        let expected = (1.0 + s.config().transition.auto_rotate) * 1.0;
        assert!((s.transition().rotation() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_velocity_moves_camera() {
        let mut s = scene();
        let start = s.camera().distance;
        s.signal_mut().post_motion(0.0, -8.0);
        run(&mut s, 5, 0.1);
        assert!(s.camera().distance < start);
    }

    #[test]
    fn test_ui_toggle_immediate() {
        let mut s = scene();
        assert_eq!(s.toggle_mode(), Mode::Chaos);
        assert_eq!(s.transition().target(), 0.0);
        assert_eq!(s.toggle_mode(), Mode::Formed);
    }
}
