use glam::{Mat4, Vec3, Vec4};
use smallvec::SmallVec;

use crate::errors::{BonefieldError, Result};
use crate::skeleton::BoneHandle;
use crate::skeleton::atomic::{AtomicTransform, DofKind};

/// One joint of an articulated skeleton.
///
/// # Hierarchy
///
/// Bones live in a [`Skeleton`](crate::skeleton::Skeleton) arena:
/// - `parent`: non-owning handle, `None` for the root
/// - `children`: handles of the owned child bones
///
/// # Cached matrices
///
/// Filled by [`Skeleton::calculate_matrices`](crate::skeleton::Skeleton::calculate_matrices)
/// and invalidated by every structural edit (length, direction, axis
/// rotations, re-parenting). DOF values are not structural.
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    length: f32,
    direction_in_world_space: Vec3,

    /// Bind-pose axis rotations in insertion order.
    orientation: SmallVec<[AtomicTransform; 3]>,
    /// Translations first, then rotations.
    dofs: SmallVec<[AtomicTransform; 6]>,
    translation_dofs: usize,

    // === Hierarchy ===
    pub(crate) parent: Option<BoneHandle>,
    pub(crate) children: Vec<BoneHandle>,

    // === Cached bind-pose matrices ===
    pub(crate) orientation_global_to_local: Mat4,
    pub(crate) orientation_local_to_global: Mat4,
    pub(crate) translation_current_to_next: Mat4,
    pub(crate) orientation_prev_to_current: Mat4,
    pub(crate) binding_pose: Mat4,
    pub(crate) dirty: bool,
}

impl Bone {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: 0.0,
            direction_in_world_space: Vec3::ZERO,
            orientation: SmallVec::new(),
            dofs: SmallVec::new(),
            translation_dofs: 0,
            parent: None,
            children: Vec::new(),
            orientation_global_to_local: Mat4::IDENTITY,
            orientation_local_to_global: Mat4::IDENTITY,
            translation_current_to_next: Mat4::IDENTITY,
            orientation_prev_to_current: Mat4::IDENTITY,
            binding_pose: Mat4::IDENTITY,
            dirty: true,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: f32) -> Self {
        self.set_length(length);
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.set_direction_in_world_space(direction);
        self
    }

    // ========================================================================
    // Structural attributes
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn set_length(&mut self, length: f32) {
        self.length = length;
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn direction_in_world_space(&self) -> Vec3 {
        self.direction_in_world_space
    }

    pub fn set_direction_in_world_space(&mut self, direction: Vec3) {
        self.direction_in_world_space = direction;
        self.dirty = true;
    }

    /// Appends an axis rotation to the bind-pose frame. The first rotation
    /// added is applied first.
    pub fn add_axis_rotation(&mut self, rotation: AtomicTransform) {
        self.orientation.push(rotation);
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn orientation(&self) -> &[AtomicTransform] {
        &self.orientation
    }

    // ========================================================================
    // Degrees of freedom
    // ========================================================================

    /// Inserts a DOF. Translations go to the front of the list, so they
    /// end up ahead of every rotation and in reverse insertion order.
    /// Rotations are appended and keep their insertion order.
    ///
    /// The DOF is stamped with the number of DOFs present before the
    /// insertion, which is its motion-capture channel slot. Stamps of
    /// existing DOFs never change. Returns the stamp.
    pub fn add_dof(&mut self, mut dof: AtomicTransform) -> usize {
        let slot = self.dofs.len();
        dof.set_index_in_amc(slot);
        match dof.kind() {
            DofKind::Translation => {
                self.dofs.insert(0, dof);
                self.translation_dofs += 1;
            }
            DofKind::Rotation => self.dofs.push(dof),
        }
        slot
    }

    #[inline]
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.dofs.len()
    }

    #[inline]
    #[must_use]
    pub fn translation_dof_count(&self) -> usize {
        self.translation_dofs
    }

    #[inline]
    #[must_use]
    pub fn dofs(&self) -> &[AtomicTransform] {
        &self.dofs
    }

    pub fn dof(&self, index: usize) -> Result<&AtomicTransform> {
        self.dofs
            .get(index)
            .ok_or_else(|| BonefieldError::out_of_range("bone dof", index, self.dofs.len()))
    }

    /// Mutable DOF access for animation. Changing a DOF value does not
    /// invalidate the bind-pose matrices.
    pub fn dof_mut(&mut self, index: usize) -> Result<&mut AtomicTransform> {
        let len = self.dofs.len();
        self.dofs
            .get_mut(index)
            .ok_or_else(|| BonefieldError::out_of_range("bone dof", index, len))
    }

    /// Writes one frame of channel values: DOF `d` takes
    /// `values[d.index_in_amc()]`. Every slot is checked before any value
    /// is written.
    pub fn set_channel_values(&mut self, values: &[f32]) -> Result<()> {
        for dof in &self.dofs {
            let slot = dof.index_in_amc().unwrap_or_default();
            if slot >= values.len() {
                return Err(BonefieldError::out_of_range("channel value", slot, values.len()));
            }
        }
        for dof in &mut self.dofs {
            let slot = dof.index_in_amc().unwrap_or_default();
            dof.set_value(values[slot]);
        }
        Ok(())
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<BoneHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BoneHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child_at(&self, index: usize) -> Result<BoneHandle> {
        self.children
            .get(index)
            .copied()
            .ok_or_else(|| BonefieldError::out_of_range("bone child", index, self.children.len()))
    }

    // ========================================================================
    // Cached matrices
    // ========================================================================

    /// Product of the axis rotations (local frame axes to global axes).
    #[inline]
    #[must_use]
    pub fn orientation_transform_global_to_local(&self) -> &Mat4 {
        &self.orientation_global_to_local
    }

    #[inline]
    #[must_use]
    pub fn orientation_transform_local_to_global(&self) -> &Mat4 {
        &self.orientation_local_to_global
    }

    #[inline]
    #[must_use]
    pub fn translation_transform_current_joint_to_next(&self) -> &Mat4 {
        &self.translation_current_to_next
    }

    #[inline]
    #[must_use]
    pub fn orientation_transform_prev_joint_to_current(&self) -> &Mat4 {
        &self.orientation_prev_to_current
    }

    /// Product of the DOF-free transforms along the joint chain.
    ///
    /// This is the bind pose only when every bone frame lines up with the
    /// world axes. The parent's translation is world-space but is applied
    /// after the bone's own frame rotation, so a bone rotated against its
    /// parent lands off the parent's tip (a child with `Rz(90°)` under an
    /// unrotated unit X bone sits at `(0, 1, 0)`, not `(1, 0, 0)`).
    #[inline]
    #[must_use]
    pub fn binding_pose_matrix(&self) -> &Mat4 {
        &self.binding_pose
    }

    #[inline]
    #[must_use]
    pub fn bone_local_root_position(&self) -> Vec4 {
        Vec4::W
    }

    #[inline]
    #[must_use]
    pub fn bone_local_tip_position(&self) -> Vec4 {
        self.translation_current_to_next * Vec4::W
    }
}
