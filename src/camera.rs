//! Orbit camera with gesture-driven zoom.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;

/// Orbit camera looking at the tree.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    fov_y: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: config.pitch,
            distance: config.distance.clamp(config.min_distance, config.max_distance),
            target: config.target,
            fov_y: config.fov_degrees.to_radians(),
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Unit vector from the camera toward its target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), 0.1, 200.0)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// Project a world point to NDC. `None` if it is behind the camera.
    pub fn project(&self, world: Vec3, aspect: f32) -> Option<Vec2> {
        let clip = self.view_proj(aspect) * world.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        Some(Vec2::new(clip.x, clip.y) / clip.w)
    }

    /// Integrate a zoom velocity (positive moves away) and clamp the distance.
    pub fn advance_zoom(&mut self, zoom_velocity: f32, dt: f32) {
        self.set_distance(self.distance + zoom_velocity * dt);
    }

    /// Orbit by a mouse drag, in pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-1.5, 1.5);
    }

    /// Dolly by a wheel delta (positive moves closer).
    pub fn scroll(&mut self, delta: f32) {
        self.set_distance(self.distance - delta);
    }

    fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
