//! Photo focus and hover selection.
//!
//! Focus is a two-state toggle driven only by the one-shot focus trigger.
//! Entering focus picks a random photo; its instanced copy is hidden while a
//! standalone visual glides to a fixed viewing pose in front of the camera.
//! Hover is independent and set from pointer picking.

use glam::Quat;
use rand::Rng;

use crate::config::FocusConfig;
use crate::particle::{ParticleGroup, ParticleId};
use crate::sink::InstanceTransform;

/// Focus state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Idle,
    Focused(ParticleId),
}

/// Focus/hover selection plus the animated focus visual.
#[derive(Debug, Clone)]
pub struct FocusController {
    state: FocusState,
    hovered: Option<ParticleId>,
    visual: InstanceTransform,
    config: FocusConfig,
}

impl FocusController {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            state: FocusState::Idle,
            hovered: None,
            visual: InstanceTransform::IDENTITY,
            config,
        }
    }

    #[inline]
    pub fn state(&self) -> FocusState {
        self.state
    }

    /// Currently focused photo id.
    #[inline]
    pub fn focused(&self) -> Option<ParticleId> {
        match self.state {
            FocusState::Idle => None,
            FocusState::Focused(id) => Some(id),
        }
    }

    #[inline]
    pub fn hovered(&self) -> Option<ParticleId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<ParticleId>) {
        if self.hovered != id {
            log::debug!("hover {:?} -> {:?}", self.hovered, id);
            self.hovered = id;
        }
    }

    /// World-space pose of the focus visual.
    pub fn visual(&self) -> &InstanceTransform {
        &self.visual
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    /// Flip between idle and focused.
    ///
    /// Entering focus picks a photo uniformly at random and starts the visual
    /// at that photo's world pose (`tree` is the tree's world rotation). With
    /// no photos the trigger is a no-op.
    pub fn toggle<R: Rng + ?Sized>(&mut self, rng: &mut R, photos: &ParticleGroup, tree: Quat) -> FocusState {
        self.state = match self.state {
            FocusState::Focused(id) => {
                log::info!("focus released (photo {id})");
                FocusState::Idle
            }
            FocusState::Idle if photos.is_empty() => {
                log::info!("focus trigger ignored: no photos");
                FocusState::Idle
            }
            FocusState::Idle => {
                let id = rng.gen_range(0..photos.len()) as ParticleId;
                if let Some(t) = photos.transform(id) {
                    self.visual = InstanceTransform {
                        position: tree * t.position,
                        rotation: tree * t.rotation,
                        scale: t.scale,
                    };
                }
                log::info!("focused photo {id}");
                FocusState::Focused(id)
            }
        };
        self.state
    }

    /// Move the visual toward `target` with `1 - exp(-k * dt)` smoothing.
    ///
    /// Does nothing while idle.
    pub fn animate(&mut self, dt: f32, target: &InstanceTransform) {
        if self.state == FocusState::Idle {
            return;
        }
        let alpha = 1.0 - (-self.config.smoothing * dt.max(0.0)).exp();
        self.visual.position = self.visual.position.lerp(target.position, alpha);
        self.visual.rotation = self.visual.rotation.slerp(target.rotation, alpha);
        self.visual.scale += (target.scale - self.visual.scale) * alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::particle::Category;
    use glam::Vec3;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn photos(count: u32) -> ParticleGroup {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut config = SceneConfig::default()
            .groups
            .into_iter()
            .find(|g| g.category == Category::Photo)
            .unwrap();
        config.count = count;
        ParticleGroup::generate(&mut rng, &config)
    }

    #[test]
    fn test_toggle_enters_and_leaves() {
        let group = photos(8);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut focus = FocusController::new(FocusConfig::default());

        let state = focus.toggle(&mut rng, &group, Quat::IDENTITY);
        let id = match state {
            FocusState::Focused(id) => id,
            FocusState::Idle => panic!("expected focus"),
        };
        assert!(id < 8);
        assert_eq!(focus.focused(), Some(id));

        assert_eq!(focus.toggle(&mut rng, &group, Quat::IDENTITY), FocusState::Idle);
        assert_eq!(focus.focused(), None);
    }

    #[test]
    fn test_visual_starts_at_photo_pose() {
        let group = photos(4);
        let mut rng = SmallRng::seed_from_u64(2);
        let mut focus = FocusController::new(FocusConfig::default());
        let tree = Quat::from_rotation_y(0.7);
        let id = focus.toggle(&mut rng, &group, tree);
        let FocusState::Focused(id) = id else { panic!("expected focus") };
        let photo = group.transform(id).unwrap();
        assert!((focus.visual().position - tree * photo.position).length() < 1e-4);
    }

    #[test]
    fn test_empty_photo_group_is_noop() {
        let group = photos(0);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut focus = FocusController::new(FocusConfig::default());
        assert_eq!(focus.toggle(&mut rng, &group, Quat::IDENTITY), FocusState::Idle);
    }

    #[test]
    fn test_animate_converges_without_overshoot() {
        let group = photos(4);
        let mut rng = SmallRng::seed_from_u64(4);
        let mut focus = FocusController::new(FocusConfig::default());
        focus.toggle(&mut rng, &group, Quat::IDENTITY);

        let target = InstanceTransform {
            position: Vec3::new(0.0, 2.0, 20.0),
            rotation: Quat::IDENTITY,
            scale: 3.0,
        };
        let mut prev = (focus.visual().position - target.position).length();
        for _ in 0..240 {
            focus.animate(1.0 / 60.0, &target);
            let dist = (focus.visual().position - target.position).length();
            assert!(dist <= prev + 1e-5);
            prev = dist;
        }
        assert!(prev < 1e-2);
        assert!((focus.visual().scale - 3.0).abs() < 1e-2);
    }

    #[test]
    fn test_animate_idle_is_noop() {
        let mut focus = FocusController::new(FocusConfig::default());
        let before = *focus.visual();
        let target = InstanceTransform { position: Vec3::splat(5.0), ..InstanceTransform::IDENTITY };
        focus.animate(1.0, &target);
        assert_eq!(*focus.visual(), before);
    }

    #[test]
    fn test_hover_independent_of_focus() {
        let group = photos(4);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut focus = FocusController::new(FocusConfig::default());
        focus.set_hovered(Some(2));
        focus.toggle(&mut rng, &group, Quat::IDENTITY);
        assert_eq!(focus.hovered(), Some(2));
        focus.set_hovered(None);
        assert!(focus.focused().is_some());
    }
}
