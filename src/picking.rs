//! Pointer picking against the photo group.

use glam::{Quat, Vec2};

use crate::camera::OrbitCamera;
use crate::particle::{ParticleGroup, ParticleId};

/// Nearest photo under `pointer` (NDC, y up) within `radius`.
///
/// Distances are measured in NDC with x stretched by `aspect` so the pick
/// area is round on screen. Hidden photos (zero scale) and photos behind the
/// camera never match.
pub fn pick_photo(
    camera: &OrbitCamera,
    aspect: f32,
    photos: &ParticleGroup,
    tree: Quat,
    pointer: Vec2,
    radius: f32,
) -> Option<ParticleId> {
    let stretch = Vec2::new(aspect.max(1e-3), 1.0);
    let mut best: Option<(ParticleId, f32)> = None;

    for (p, t) in photos.particles().iter().zip(photos.transforms()) {
        if t.scale <= 0.0 {
            continue;
        }
        let Some(ndc) = camera.project(tree * t.position, aspect) else {
            continue;
        };
        let dist = ((ndc - pointer) * stretch).length();
        if dist <= radius && best.map_or(true, |(_, d)| dist < d) {
            best = Some((p.id, dist));
        }
    }

    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, SceneConfig};
    use crate::particle::Category;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn photos() -> ParticleGroup {
        let mut rng = SmallRng::seed_from_u64(21);
        let config = SceneConfig::default()
            .groups
            .into_iter()
            .find(|g| g.category == Category::Photo)
            .unwrap();
        ParticleGroup::generate(&mut rng, &config)
    }

    #[test]
    fn test_pick_hits_projected_photo() {
        let camera = OrbitCamera::new(&CameraConfig::default());
        let group = photos();
        let target = group.transform(5).unwrap().position;
        let ndc = camera.project(target, 1.5).unwrap();
        let hit = pick_photo(&camera, 1.5, &group, Quat::IDENTITY, ndc, 0.05);
        // Another photo could overlap on screen; whatever wins sits at the pointer.
        let id = hit.expect("pointer on a photo");
        let at = camera.project(group.transform(id).unwrap().position, 1.5).unwrap();
        assert!(((at - ndc) * Vec2::new(1.5, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let camera = OrbitCamera::new(&CameraConfig::default());
        let group = photos();
        // Far outside the viewport.
        assert_eq!(pick_photo(&camera, 1.0, &group, Quat::IDENTITY, Vec2::new(5.0, 5.0), 0.05), None);
    }

    #[test]
    fn test_pick_respects_tree_rotation() {
        let camera = OrbitCamera::new(&CameraConfig::default());
        let group = photos();
        let tree = Quat::from_rotation_y(1.3);
        let ndc = camera.project(tree * group.transform(2).unwrap().position, 1.0).unwrap();
        assert!(pick_photo(&camera, 1.0, &group, tree, ndc, 0.05).is_some());
    }

    #[test]
    fn test_empty_group_picks_nothing() {
        let camera = OrbitCamera::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut config = SceneConfig::default()
            .groups
            .into_iter()
            .find(|g| g.category == Category::Photo)
            .unwrap();
        config.count = 0;
        let group = ParticleGroup::generate(&mut rng, &config);
        assert_eq!(pick_photo(&camera, 1.0, &group, Quat::IDENTITY, Vec2::ZERO, 1.0), None);
    }
}
