//! The seam between the simulation and whatever draws it.
//!
//! The scene hands each group's instance data to an [`InstanceSink`]: colors
//! exactly once, transforms every frame, plus the two overlay visuals. The wgpu
//! renderer implements it; tests implement it with a recorder.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Position, orientation and uniform scale of one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl InstanceTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    /// Model matrix for this transform.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    /// GPU layout of this transform.
    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.matrix().to_cols_array_2d(),
        }
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How an instance's quad is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Shape {
    /// Round, camera-facing glow.
    Glow = 0,
    /// Oriented square card.
    Card = 1,
    /// Camera-facing ring, used for the hover outline.
    Ring = 2,
}

/// Color and shape of one instance. Written once per group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceColor {
    pub rgb: Vec3,
    pub shape: Shape,
}

impl InstanceColor {
    pub fn to_raw(&self) -> ColorRaw {
        ColorRaw {
            rgb: self.rgb.to_array(),
            shape: self.shape as u32,
        }
    }
}

/// Per-instance model matrix as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

/// Per-instance color as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ColorRaw {
    pub rgb: [f32; 3],
    pub shape: u32,
}

/// A single standalone visual drawn on top of the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayItem {
    /// World-space transform (tree rotation already applied).
    pub transform: InstanceTransform,
    pub color: InstanceColor,
}

/// Visuals that are not part of any instanced group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlay {
    /// The enlarged photo while a focus session is active.
    pub focus: Option<OverlayItem>,
    /// Outline around the hovered photo.
    pub hover: Option<OverlayItem>,
}

impl Overlay {
    /// Items to draw, focus first.
    pub fn items(&self) -> impl Iterator<Item = &OverlayItem> {
        self.focus.iter().chain(self.hover.iter())
    }
}

/// Receives instance data from the scene.
pub trait InstanceSink {
    /// One-time per-instance colors for `group`.
    fn write_colors(&mut self, group: usize, colors: &[InstanceColor]);
    /// Per-frame transforms for `group`, in tree-local space.
    fn write_transforms(&mut self, group: usize, transforms: &[InstanceTransform]);
    /// Per-frame overlay visuals, in world space.
    fn write_overlay(&mut self, overlay: &Overlay);
}
