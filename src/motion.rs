//! Per-category secondary motion.
//!
//! Each function writes one particle's transform. Oscillators are seeded by
//! the particle's own `phase`/`speed` and driven by wall-clock `time`, so no
//! two particles move in lockstep and motion does not depend on frame rate.
//! Dust is the only stateful category: it integrates from its previous
//! transform.

use glam::{EulerRot, Quat, Vec3};

use crate::config::{DustConfig, MotionConfig};
use crate::particle::{Category, Particle};
use crate::sink::InstanceTransform;
use crate::transition::Mode;

/// Everything the motion functions read for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Seconds since start.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Smoothstepped transition progress.
    pub ease: f32,
    /// Committed binary mode.
    pub mode: Mode,
    pub motion: &'a MotionConfig,
    pub dust: &'a DustConfig,
}

/// Interpolated base position: `scatter + (formed - scatter) * ease`.
#[inline]
pub fn blend(p: &Particle, ease: f32) -> Vec3 {
    p.scatter + (p.formed - p.scatter) * ease
}

/// Dispatch to the category's motion function.
#[inline]
pub fn apply(category: Category, p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    match category {
        Category::Foliage => foliage(p, ctx, out),
        Category::Ornament => ornament(p, ctx, out),
        Category::Hanging(_) => hanging(p, ctx, out),
        Category::Photo => photo(p, ctx, out),
        Category::Dust => dust(p, ctx, out),
        Category::Spark => spark(p, ctx, out),
    }
}

/// Bob that calms as the tree forms; orientation turns outward and upward.
pub fn foliage(p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    let bob = (ctx.time * p.speed + p.phase).sin() * ctx.motion.foliage_bob * (1.0 - ctx.ease);
    out.position = blend(p, ctx.ease) + Vec3::Y * bob;
    out.rotation = tumble(p).slerp(outward_up(p.formed), ctx.ease);
    out.scale = p.scale;
}

/// Small bob, slow spin and a scale pulse keyed on the id.
pub fn ornament(p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    let m = ctx.motion;
    let bob = (ctx.time * p.speed * 1.5 + p.phase).sin() * m.ornament_bob;
    out.position = blend(p, ctx.ease) + Vec3::Y * bob;
    out.rotation = Quat::from_rotation_y(ctx.time * 0.3 * p.speed + p.phase);
    out.scale = p.scale * (1.0 + m.ornament_pulse * (ctx.time * m.pulse_rate + p.id as f32).sin());
}

/// Hats and socks: small bob plus a pendulum sway about the facing axis.
pub fn hanging(p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    let m = ctx.motion;
    let bob = (ctx.time * p.speed + p.phase).sin() * m.ornament_bob;
    let sway = (ctx.time * m.sway_rate + p.phase).sin() * m.sway_amplitude;
    out.position = blend(p, ctx.ease) + Vec3::Y * bob;
    out.rotation = tumble(p).slerp(facing(p.formed), ctx.ease) * Quat::from_rotation_z(sway);
    out.scale = p.scale;
}

/// Photo cards face outward once formed and bob gently.
pub fn photo(p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    let bob = (ctx.time * p.speed + p.phase).sin() * ctx.motion.photo_bob;
    out.position = blend(p, ctx.ease) + Vec3::Y * bob;
    out.rotation = tumble(p).slerp(facing(p.formed), ctx.ease);
    out.scale = p.scale;
}

/// Radial spring toward a mode-dependent radius, slow orbit about Y, and a
/// little vertical jitter. Reads the previous position from `out`.
pub fn dust(p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    let d = ctx.dust;
    let target = match ctx.mode {
        Mode::Formed => d.formed_radius,
        Mode::Chaos => d.chaos_radius,
    };

    let mut pos = out.position;
    let r = pos.length();
    if r > d.min_radius {
        let pull = (target - r) * (d.stiffness * ctx.dt).min(1.0);
        pos += pos / r * pull;
    }

    pos = Quat::from_rotation_y(d.orbit_rate * p.speed * ctx.dt) * pos;
    pos.y += (ctx.time * p.speed * 2.0 + p.phase).sin() * d.jitter * ctx.dt;

    out.position = pos;
    out.rotation = Quat::IDENTITY;
    out.scale = p.scale;
}

/// Twinkling scale and a low-frequency shimmer on every axis.
pub fn spark(p: &Particle, ctx: &FrameContext, out: &mut InstanceTransform) {
    let m = ctx.motion;
    let t = ctx.time * m.shimmer_rate;
    let shimmer = Vec3::new(
        (t + p.phase).sin(),
        (t * 1.3 + p.phase * 1.7).cos(),
        (t * 0.7 + p.phase * 0.5).sin(),
    ) * m.shimmer;

    out.position = blend(p, ctx.ease) + shimmer;
    out.rotation = Quat::IDENTITY;
    out.scale = p.scale * (1.0 + (ctx.time * m.twinkle_rate * p.speed + p.phase).sin());
}

/// Arbitrary but stable orientation for the scattered state.
fn tumble(p: &Particle) -> Quat {
    Quat::from_euler(EulerRot::XYZ, p.phase, p.phase * 1.7 + p.speed, p.speed * 3.0)
}

/// Local +Y tilted away from the trunk.
fn outward_up(formed: Vec3) -> Quat {
    let horizontal = Vec3::new(formed.x, 0.0, formed.z);
    if horizontal.length_squared() < 1e-8 {
        return Quat::IDENTITY;
    }
    let dir = (horizontal.normalize() + Vec3::Y).normalize();
    Quat::from_rotation_arc(Vec3::Y, dir)
}

/// Local +Z pointing away from the trunk.
fn facing(formed: Vec3) -> Quat {
    if formed.x.abs() < 1e-6 && formed.z.abs() < 1e-6 {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(formed.x.atan2(formed.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle() -> Particle {
        Particle {
            id: 3,
            scatter: Vec3::new(10.0, 2.0, -4.0),
            formed: Vec3::new(2.0, 1.0, 1.0),
            scale: 0.5,
            color: Vec3::ONE,
            phase: 1.1,
            speed: 0.9,
        }
    }

    fn ctx<'a>(motion: &'a MotionConfig, dust: &'a DustConfig, ease: f32, mode: Mode) -> FrameContext<'a> {
        FrameContext { time: 3.7, dt: 1.0 / 60.0, ease, mode, motion, dust }
    }

    #[test]
    fn test_blend_endpoints() {
        let p = particle();
        assert_eq!(blend(&p, 0.0), p.scatter);
        assert!((blend(&p, 1.0) - p.formed).length() < 1e-5);
    }

    #[test]
    fn test_foliage_settles_when_formed() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let mut out = InstanceTransform::IDENTITY;
        foliage(&p, &ctx(&m, &d, 1.0, Mode::Formed), &mut out);
        assert!((out.position - p.formed).length() < 1e-5);
        assert_eq!(out.scale, p.scale);
    }

    #[test]
    fn test_foliage_bobs_when_scattered() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let mut out = InstanceTransform::IDENTITY;
        let c = ctx(&m, &d, 0.0, Mode::Chaos);
        foliage(&p, &c, &mut out);
        let expected = (c.time * p.speed + p.phase).sin() * m.foliage_bob;
        assert!((out.position.y - (p.scatter.y + expected)).abs() < 1e-5);
    }

    #[test]
    fn test_ornament_pulse_bounded() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let mut out = InstanceTransform::IDENTITY;
        ornament(&p, &ctx(&m, &d, 0.5, Mode::Formed), &mut out);
        assert!(out.scale >= p.scale * (1.0 - m.ornament_pulse) - 1e-6);
        assert!(out.scale <= p.scale * (1.0 + m.ornament_pulse) + 1e-6);
    }

    #[test]
    fn test_hanging_sway_is_bounded_rotation() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let mut out = InstanceTransform::IDENTITY;
        hanging(&p, &ctx(&m, &d, 1.0, Mode::Formed), &mut out);
        let rest = facing(p.formed);
        assert!(rest.angle_between(out.rotation) <= m.sway_amplitude + 1e-3);
    }

    #[test]
    fn test_spark_twinkle_range() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let mut out = InstanceTransform::IDENTITY;
        spark(&p, &ctx(&m, &d, 0.3, Mode::Formed), &mut out);
        assert!(out.scale >= 0.0 && out.scale <= 2.0 * p.scale + 1e-6);
        assert!((out.position - blend(&p, 0.3)).length() <= m.shimmer * 3f32.sqrt() + 1e-5);
    }

    #[test]
    fn test_dust_settles_on_target_radius() {
        let (m, d) = (MotionConfig::default(), DustConfig { jitter: 0.0, ..DustConfig::default() });
        let p = particle();
        let mut out = InstanceTransform { position: Vec3::new(20.0, 0.0, 0.0), ..InstanceTransform::IDENTITY };
        let mut c = ctx(&m, &d, 1.0, Mode::Formed);
        for i in 0..2000 {
            c.time = i as f32 / 60.0;
            dust(&p, &c, &mut out);
        }
        assert!((out.position.length() - d.formed_radius).abs() < 0.05);

        c.mode = Mode::Chaos;
        for _ in 0..2000 {
            dust(&p, &c, &mut out);
        }
        assert!((out.position.length() - d.chaos_radius).abs() < 0.05);
    }

    #[test]
    fn test_dust_at_origin_does_not_blow_up() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let mut out = InstanceTransform::IDENTITY;
        dust(&p, &ctx(&m, &d, 0.0, Mode::Formed), &mut out);
        assert!(out.position.is_finite());
        assert!(out.position.length() < 1e-2);
    }

    #[test]
    fn test_dust_ignores_ease() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let start = InstanceTransform { position: Vec3::new(5.0, 1.0, 2.0), ..InstanceTransform::IDENTITY };
        let (mut a, mut b) = (start, start);
        dust(&p, &ctx(&m, &d, 0.0, Mode::Formed), &mut a);
        dust(&p, &ctx(&m, &d, 1.0, Mode::Formed), &mut b);
        assert_eq!(a.position, b.position);
    }

    #[test]
    fn test_apply_dispatch_matches_direct_call() {
        let (m, d) = (MotionConfig::default(), DustConfig::default());
        let p = particle();
        let c = ctx(&m, &d, 0.4, Mode::Formed);
        let (mut a, mut b) = (InstanceTransform::IDENTITY, InstanceTransform::IDENTITY);
        apply(Category::Spark, &p, &c, &mut a);
        spark(&p, &c, &mut b);
        assert_eq!(a, b);
    }
}
