//! Spatial generators for the two particle configurations.
//!
//! Pure functions over an RNG: a volume-uniform sphere for the scattered
//! configuration and a spiral-twisted cone for the formed tree. No seeding
//! requirement; callers pass whatever RNG they like (tests pass a seeded one).

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::ConeShape;

/// Heights below this are treated as a degenerate cone.
const MIN_HEIGHT: f32 = 1e-4;

/// Random point inside a solid sphere of given radius, centered at origin.
///
/// Distribution is uniform throughout the volume: the radius is scaled by a
/// cube root and the direction is uniform on the sphere (uniform `cos(phi)`,
/// not uniform `phi`, which would cluster at the poles).
pub fn scatter_point<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let cos_phi: f32 = rng.gen_range(-1.0..=1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r = radius * rng.gen::<f32>().cbrt();

    Vec3::new(r * sin_phi * theta.cos(), r * cos_phi, r * sin_phi * theta.sin())
}

/// Random point in (or on the skin of) a cone.
///
/// Height above the base is uniform in `[0, height)`. The local radius shrinks
/// linearly from `radius` at the base to zero at the apex, and the angle gains
/// `twist * height` so points wrap the cone in a spiral.
pub fn cone_point<R: Rng + ?Sized>(rng: &mut R, shape: &ConeShape) -> Vec3 {
    if shape.height < MIN_HEIGHT {
        return Vec3::new(0.0, shape.y_offset, 0.0);
    }

    let h = rng.gen_range(0.0..shape.height);
    let max_r = shape.radius * (1.0 - h / shape.height).max(0.0);

    let r = if shape.surface_only {
        let shell = shape.shell.clamp(0.0, 1.0);
        max_r * (1.0 - shell * rng.gen::<f32>())
    } else {
        // sqrt for uniform disk
        max_r * rng.gen::<f32>().sqrt()
    };

    let angle = rng.gen_range(0.0..TAU) + h * shape.twist;
    Vec3::new(r * angle.cos(), h + shape.y_offset, r * angle.sin())
}

/// Exactly `count` scatter points.
pub fn scatter_points<R: Rng + ?Sized>(rng: &mut R, count: usize, radius: f32) -> Vec<Vec3> {
    (0..count).map(|_| scatter_point(rng, radius)).collect()
}

/// Exactly `count` formed points.
pub fn cone_points<R: Rng + ?Sized>(rng: &mut R, count: usize, shape: &ConeShape) -> Vec<Vec3> {
    (0..count).map(|_| cone_point(rng, shape)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_scatter_within_sphere() {
        let mut rng = rng();
        for p in scatter_points(&mut rng, 2000, 5.0) {
            assert!(p.length() <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_scatter_is_volume_uniform() {
        // Half the volume of a sphere lies outside 0.7937 * R.
        let mut rng = rng();
        let points = scatter_points(&mut rng, 20_000, 1.0);
        let outer = points.iter().filter(|p| p.length() > 0.7937).count();
        let fraction = outer as f32 / points.len() as f32;
        assert!((fraction - 0.5).abs() < 0.03, "outer fraction {fraction}");
    }

    #[test]
    fn test_scatter_hemispheres_balanced() {
        let mut rng = rng();
        let points = scatter_points(&mut rng, 20_000, 1.0);
        let upper = points.iter().filter(|p| p.y > 0.0).count() as f32 / points.len() as f32;
        assert!((upper - 0.5).abs() < 0.03);
    }

    #[test]
    fn test_cone_bounds() {
        let mut rng = rng();
        let shape = ConeShape { height: 10.0, radius: 4.0, y_offset: -5.0, twist: 2.0, surface_only: false, shell: 0.1 };
        for p in cone_points(&mut rng, 5000, &shape) {
            let h = p.y - shape.y_offset;
            assert!(h >= -1e-4 && h < shape.height + 1e-4, "height {h}");
            let radial = Vec3::new(p.x, 0.0, p.z).length();
            assert!(radial <= shape.radius * (1.0 - h / shape.height) + 1e-4);
        }
    }

    #[test]
    fn test_surface_only_stays_in_shell() {
        let mut rng = rng();
        let shape = ConeShape { height: 8.0, radius: 3.0, y_offset: 0.0, twist: 1.0, surface_only: true, shell: 0.1 };
        for p in cone_points(&mut rng, 5000, &shape) {
            let max_r = shape.radius * (1.0 - p.y / shape.height);
            let radial = Vec3::new(p.x, 0.0, p.z).length();
            assert!(radial <= max_r + 1e-4);
            assert!(radial >= max_r * (1.0 - shape.shell) - 1e-4);
        }
    }

    #[test]
    fn test_zero_height_cone_is_degenerate_not_nan() {
        let mut rng = rng();
        let shape = ConeShape { height: 0.0, ..ConeShape::default() };
        let p = cone_point(&mut rng, &shape);
        assert!(p.is_finite());
        assert_eq!(p, Vec3::new(0.0, shape.y_offset, 0.0));
    }

    #[test]
    fn test_exact_counts() {
        let mut rng = rng();
        assert_eq!(scatter_points(&mut rng, 0, 1.0).len(), 0);
        assert_eq!(scatter_points(&mut rng, 37, 1.0).len(), 37);
        assert_eq!(cone_points(&mut rng, 41, &ConeShape::default()).len(), 41);
    }
}
