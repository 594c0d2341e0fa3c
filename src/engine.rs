//! Per-frame update of every particle in every group.
//!
//! For each particle: blend scatter to formed with the eased progress, add the
//! category's secondary motion, then apply the photo focus/hover rules, and
//! write the result into the group's transform buffer. One scratch transform
//! is reused for the whole loop; nothing is allocated per frame.

use crate::motion::{self, FrameContext};
use crate::particle::{Category, ParticleGroup, ParticleId};
use crate::sink::InstanceTransform;

/// Photo selection as seen by the update loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhotoSelection {
    pub focused: Option<ParticleId>,
    pub hovered: Option<ParticleId>,
}

/// Update one group for this frame.
///
/// `hover_scale` multiplies a hovered (and not focused) photo's scale. Ids
/// outside the group are ignored.
pub fn update_group(group: &mut ParticleGroup, ctx: &FrameContext, selection: PhotoSelection, hover_scale: f32) {
    let category = group.category();
    let (particles, transforms) = group.split_mut();
    let mut scratch = InstanceTransform::IDENTITY;

    for (p, out) in particles.iter().zip(transforms.iter_mut()) {
        // Dust integrates from where it was last frame.
        scratch.position = out.position;
        motion::apply(category, p, ctx, &mut scratch);

        if category == Category::Photo {
            if selection.focused == Some(p.id) {
                scratch.scale = 0.0;
            } else if selection.hovered == Some(p.id) {
                scratch.scale *= hover_scale;
            }
        }

        *out = scratch;
    }
}

/// Update every group.
///
/// `selection` applies to the group at `photo_group` only. Other photo groups
/// are drawn without focus or hover.
pub fn update_all(
    groups: &mut [ParticleGroup],
    ctx: &FrameContext,
    photo_group: Option<usize>,
    selection: PhotoSelection,
    hover_scale: f32,
) {
    for (index, group) in groups.iter_mut().enumerate() {
        let selection = if photo_group == Some(index) {
            selection
        } else {
            PhotoSelection::default()
        };
        update_group(group, ctx, selection, hover_scale);
    }
}
