//! Skeleton transform system
//!
//! Composes joint transforms over the bone hierarchy. Each walk is an
//! explicit pre-order traversal with a work stack; the state a child needs
//! from its parent is carried on the stack instead of being read back from
//! the arena, so a bone is always processed after its parent.
//!
//! # Composition order
//!
//! ```text
//! C                   = R_n · … · R_2 · R_1          (axis rotations, R_1 added first)
//! prev_to_current     = C⁻¹(parent) · C              (root: C)
//! without_dofs        = prev_to_current · T(parent)  (root: prev_to_current)
//! with_dofs           = prev_to_current · D_0 · D_1 · … · T(parent)
//! world               = world(parent) · local
//! ```
//!
//! where `T(parent)` is the parent's translation-to-next-joint transform and
//! `D_i` are the DOF matrices in DOF-list order (translations first).
//!
//! `T(parent)` is a world-space offset but sits to the right of the bone's
//! relative orientation. The accumulated matrices are a true bind pose only
//! when all bone frames are aligned with the world axes; a rotated frame
//! also rotates the offset to its parent's tip.

use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use crate::settings::SkeletonSettings;
use crate::skeleton::BoneHandle;
use crate::skeleton::bone::Bone;

/// Which local transform a world-space walk accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoseMode {
    /// Bind pose plus the current DOF values.
    #[default]
    Animated,
    /// Bind pose only.
    Bind,
}

/// Parent state consumed by the bind-pose pass.
#[derive(Debug, Clone, Copy)]
struct ParentFrame {
    orientation_local_to_global: Mat4,
    translation_current_to_next: Mat4,
    binding_pose: Mat4,
}

/// Recomputes the cached bind-pose matrices of `root` and its subtree.
/// Returns the number of bones visited.
pub fn calculate_bind_pose(
    bones: &mut SlotMap<BoneHandle, Bone>,
    root: BoneHandle,
    settings: &SkeletonSettings,
) -> usize {
    let mut visited = 0;
    let mut stack: Vec<(BoneHandle, Option<ParentFrame>)> = Vec::with_capacity(32);
    stack.push((root, None));

    while let Some((handle, parent)) = stack.pop() {
        let Some(bone) = bones.get_mut(handle) else {
            continue;
        };

        // Later rotations are applied on the left.
        let global_to_local = bone
            .orientation()
            .iter()
            .fold(Mat4::IDENTITY, |acc, r| r.calculate_matrix(settings.angle_unit) * acc);
        bone.orientation_global_to_local = global_to_local;
        bone.orientation_local_to_global = global_to_local.inverse();

        let offset: Vec3 = bone.direction_in_world_space() * bone.length() * settings.length_scale;
        bone.translation_current_to_next = Mat4::from_translation(offset);

        bone.orientation_prev_to_current = match parent {
            Some(p) => p.orientation_local_to_global * global_to_local,
            None => global_to_local,
        };

        let without_dofs = prev_to_current_without_dofs(bone, parent.map(|p| p.translation_current_to_next));
        bone.binding_pose = match parent {
            Some(p) => p.binding_pose * without_dofs,
            None => without_dofs,
        };
        bone.dirty = false;
        visited += 1;

        let frame = ParentFrame {
            orientation_local_to_global: bone.orientation_local_to_global,
            translation_current_to_next: bone.translation_current_to_next,
            binding_pose: bone.binding_pose,
        };
        for &child in bone.children.iter().rev() {
            stack.push((child, Some(frame)));
        }
    }

    visited
}

/// Bind-pose transform from the parent joint frame to `bone`.
#[must_use]
pub fn prev_to_current_without_dofs(bone: &Bone, parent_translation: Option<Mat4>) -> Mat4 {
    match parent_translation {
        Some(t) => bone.orientation_prev_to_current * t,
        None => bone.orientation_prev_to_current,
    }
}

/// Animated transform from the parent joint frame to `bone`.
#[must_use]
pub fn prev_to_current_with_dofs(
    bone: &Bone,
    parent_translation: Option<Mat4>,
    settings: &SkeletonSettings,
) -> Mat4 {
    let mut t = bone.orientation_prev_to_current;
    for dof in bone.dofs() {
        t *= dof.calculate_matrix(settings.angle_unit);
    }
    if let Some(parent_translation) = parent_translation {
        t *= parent_translation;
    }
    t
}

/// Accumulates world-space joint matrices from `root` down, in pre-order.
pub fn accumulate_world(
    bones: &SlotMap<BoneHandle, Bone>,
    root: BoneHandle,
    mode: PoseMode,
    settings: &SkeletonSettings,
) -> Vec<(BoneHandle, Mat4)> {
    let mut out = Vec::with_capacity(bones.len());
    // (bone, parent world matrix, parent translation-to-next)
    let mut stack: Vec<(BoneHandle, Mat4, Option<Mat4>)> = vec![(root, Mat4::IDENTITY, None)];

    while let Some((handle, parent_world, parent_translation)) = stack.pop() {
        let Some(bone) = bones.get(handle) else {
            continue;
        };

        let local = match mode {
            PoseMode::Animated => prev_to_current_with_dofs(bone, parent_translation, settings),
            PoseMode::Bind => prev_to_current_without_dofs(bone, parent_translation),
        };
        let world = parent_world * local;
        out.push((handle, world));

        for &child in bone.children.iter().rev() {
            stack.push((child, world, Some(bone.translation_current_to_next)));
        }
    }

    out
}
