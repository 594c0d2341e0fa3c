//! Particle records and fixed-size particle groups.
//!
//! Groups are generated exactly once. After that the particle records never
//! change; only the parallel transform buffer is rewritten each frame.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GroupConfig;
use crate::generators;
use crate::sink::{InstanceColor, InstanceTransform, Shape};

/// Which hanging decoration a [`Category::Hanging`] group holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangingKind {
    Hat,
    Sock,
}

/// Closed set of particle behaviors.
///
/// Selects the secondary-motion function in [`crate::motion`] and the shape
/// the renderer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Needle-like tree body.
    Foliage,
    /// Baubles on the tree's skin.
    Ornament,
    /// Hats and socks that sway like pendulums.
    Hanging(HangingKind),
    /// Photo cards; the only focusable/hoverable category.
    Photo,
    /// Ambient motes held on an orbit by a radial spring.
    Dust,
    /// Twinkling point lights.
    Spark,
}

impl Category {
    pub fn shape(self) -> Shape {
        match self {
            Category::Photo | Category::Hanging(_) => Shape::Card,
            _ => Shape::Glow,
        }
    }
}

/// Index of a particle within its group.
pub type ParticleId = u32;

/// One particle. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub scatter: Vec3,
    pub formed: Vec3,
    pub scale: f32,
    pub color: Vec3,
    /// Oscillator phase in `[0, TAU)`.
    pub phase: f32,
    /// Oscillator rate multiplier in `[0.5, 1.5)`.
    pub speed: f32,
}

impl Particle {
    /// Build particle `id` for `config`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, id: ParticleId, config: &GroupConfig) -> Self {
        let [lo, hi] = config.scale_range;
        let scale = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let color = config.palette[rng.gen_range(0..config.palette.len())];

        Self {
            id,
            scatter: generators::scatter_point(rng, config.scatter_radius),
            formed: generators::cone_point(rng, &config.formed),
            scale,
            color: Vec3::from_array(color),
            phase: rng.gen_range(0.0..TAU),
            speed: rng.gen_range(0.5..1.5),
        }
    }
}

/// A fixed-size arena of particles plus their output transforms.
#[derive(Debug, Clone)]
pub struct ParticleGroup {
    name: String,
    category: Category,
    particles: Vec<Particle>,
    transforms: Vec<InstanceTransform>,
}

impl ParticleGroup {
    /// Generate `config.count` particles. Transforms start at the scatter points.
    ///
    /// # Panics
    ///
    /// Panics if `config.palette` is empty; [`SceneConfig::validate`](crate::config::SceneConfig::validate)
    /// rejects such configs.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &GroupConfig) -> Self {
        let particles: Vec<Particle> = (0..config.count)
            .map(|id| Particle::generate(rng, id, config))
            .collect();
        let transforms = particles
            .iter()
            .map(|p| InstanceTransform {
                position: p.scatter,
                scale: p.scale,
                ..InstanceTransform::IDENTITY
            })
            .collect();

        Self {
            name: config.name.clone(),
            category: config.category,
            particles,
            transforms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Particle by id, `None` if out of range.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id as usize)
    }

    /// Current transform by id, `None` if out of range.
    pub fn transform(&self, id: ParticleId) -> Option<&InstanceTransform> {
        self.transforms.get(id as usize)
    }

    /// Records and output buffer together, for the update engine.
    pub(crate) fn split_mut(&mut self) -> (&[Particle], &mut [InstanceTransform]) {
        (&self.particles, &mut self.transforms)
    }

    /// One-time color payload for the render backend.
    pub fn colors(&self) -> Vec<InstanceColor> {
        let shape = self.category.shape();
        self.particles
            .iter()
            .map(|p| InstanceColor { rgb: p.color, shape })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_group_has_configured_count() {
        let mut rng = SmallRng::seed_from_u64(1);
        for config in SceneConfig::default().groups {
            let group = ParticleGroup::generate(&mut rng, &config);
            assert_eq!(group.len(), config.count as usize);
            assert_eq!(group.transforms().len(), config.count as usize);
        }
    }

    #[test]
    fn test_ids_are_indices() {
        let mut rng = SmallRng::seed_from_u64(2);
        let config = &SceneConfig::default().groups[1];
        let group = ParticleGroup::generate(&mut rng, config);
        for (i, p) in group.particles().iter().enumerate() {
            assert_eq!(p.id as usize, i);
        }
    }

    #[test]
    fn test_attribute_ranges() {
        let mut rng = SmallRng::seed_from_u64(3);
        let config = &SceneConfig::default().groups[0];
        let group = ParticleGroup::generate(&mut rng, config);
        let palette: Vec<Vec3> = config.palette.iter().map(|c| Vec3::from_array(*c)).collect();
        for p in group.particles() {
            assert!(p.scale >= config.scale_range[0] && p.scale < config.scale_range[1]);
            assert!((0.0..TAU).contains(&p.phase));
            assert!((0.5..1.5).contains(&p.speed));
            assert!(palette.contains(&p.color));
            assert!(p.scatter.length() <= config.scatter_radius + 1e-4);
        }
    }

    #[test]
    fn test_out_of_range_lookup_is_none() {
        let mut rng = SmallRng::seed_from_u64(4);
        let config = &SceneConfig::default().groups[4];
        let group = ParticleGroup::generate(&mut rng, config);
        assert!(group.get(config.count).is_none());
        assert!(group.transform(u32::MAX).is_none());
    }

    #[test]
    fn test_colors_carry_category_shape() {
        let mut rng = SmallRng::seed_from_u64(5);
        let config = SceneConfig::default();
        let photos = config.groups.iter().find(|g| g.category == Category::Photo).unwrap();
        let group = ParticleGroup::generate(&mut rng, photos);
        assert!(group.colors().iter().all(|c| c.shape == Shape::Card));
    }
}
