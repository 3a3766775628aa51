use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{BonefieldError, Result};
use crate::settings::SkeletonSettings;
use crate::skeleton::BoneHandle;
use crate::skeleton::atomic::AtomicTransform;
use crate::skeleton::bone::Bone;
use crate::skeleton::transform_system::{self, PoseMode};

/// Bone arena plus hierarchy.
///
/// # Ownership
///
/// The skeleton owns every bone. A bone's `children` are the bones it owns
/// in the tree; `parent` is a plain handle that never decides lifetimes.
/// Removing a bone removes its whole subtree, top-down.
///
/// # Matrices
///
/// [`calculate_matrices`](Self::calculate_matrices) fills the bind-pose
/// caches. Until then, and after any structural edit, the transform
/// queries fail with [`BonefieldError::MatricesNotComputed`].
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: SlotMap<BoneHandle, Bone>,
    by_name: FxHashMap<String, BoneHandle>,
    root: Option<BoneHandle>,
    settings: SkeletonSettings,
    computed: bool,
}

impl Skeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: SkeletonSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SkeletonSettings {
        &self.settings
    }

    /// Replaces the settings. Angle unit and length scale feed the bind
    /// pass, so the cached matrices become stale.
    pub fn set_settings(&mut self, settings: SkeletonSettings) {
        self.settings = settings;
        self.computed = false;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Inserts a detached bone. The first bone inserted becomes the root.
    ///
    /// Bone names are lookup keys; inserting a second bone with an existing
    /// name redirects the name to the new bone.
    pub fn add_bone(&mut self, mut bone: Bone) -> BoneHandle {
        bone.parent = None;
        bone.children.clear();
        let name = bone.name().to_string();
        let handle = self.bones.insert(bone);
        if let Some(previous) = self.by_name.insert(name, handle) {
            log::warn!("bone name reused, {previous:?} is no longer reachable by name");
        }
        if self.root.is_none() {
            self.root = Some(handle);
        }
        self.computed = false;
        handle
    }

    /// Makes `child` a child of `parent`. A bone's parent is set exactly once.
    pub fn add_child(&mut self, parent: BoneHandle, child: BoneHandle) -> Result<()> {
        let child_bone = self.get(child)?;
        if child_bone.parent.is_some() {
            return Err(BonefieldError::AlreadyParented(child_bone.name().to_string()));
        }
        self.get(parent)?;

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(BonefieldError::Cycle(self.bones[child].name().to_string()));
            }
            cursor = self.bones[current].parent;
        }

        self.bones[child].parent = Some(parent);
        self.bones[parent].children.push(child);
        self.computed = false;
        Ok(())
    }

    /// Same as [`add_child`](Self::add_child) with the arguments swapped.
    pub fn set_parent(&mut self, child: BoneHandle, parent: BoneHandle) -> Result<()> {
        self.add_child(parent, child)
    }

    /// Designates the root bone.
    pub fn set_root(&mut self, root: BoneHandle) -> Result<()> {
        self.get(root)?;
        self.root = Some(root);
        self.computed = false;
        Ok(())
    }

    /// Root of the tree containing the designated root bone.
    #[must_use]
    pub fn root(&self) -> Option<BoneHandle> {
        let mut current = self.root?;
        while let Some(parent) = self.bones.get(current)?.parent {
            current = parent;
        }
        Some(current)
    }

    /// Removes `handle` and its subtree. Returns the removed bones.
    pub fn remove_bone(&mut self, handle: BoneHandle) -> Vec<Bone> {
        let Some(bone) = self.bones.get(handle) else {
            log::warn!("remove_bone: {handle:?} is not part of this skeleton");
            return Vec::new();
        };

        let parent = bone.parent;
        if let Some(parent) = parent.and_then(|p| self.bones.get_mut(p)) {
            parent.children.retain(|c| *c != handle);
        }

        let mut removed = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Some(bone) = self.bones.remove(current) else {
                continue;
            };
            stack.extend(bone.children.iter().rev().copied());
            if self.by_name.get(bone.name()) == Some(&current) {
                self.by_name.remove(bone.name());
            }
            if self.root == Some(current) {
                self.root = None;
            }
            removed.push(bone);
        }

        self.computed = false;
        log::debug!("removed {} bone(s)", removed.len());
        removed
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn bone(&self, handle: BoneHandle) -> Option<&Bone> {
        self.bones.get(handle)
    }

    /// Mutable access to a bone. Structural setters on the bone mark it
    /// dirty; DOF value changes do not.
    #[inline]
    pub fn bone_mut(&mut self, handle: BoneHandle) -> Option<&mut Bone> {
        self.bones.get_mut(handle)
    }

    pub fn get(&self, handle: BoneHandle) -> Result<&Bone> {
        self.bones.get(handle).ok_or(BonefieldError::InvalidHandle)
    }

    pub fn get_mut(&mut self, handle: BoneHandle) -> Result<&mut Bone> {
        self.bones.get_mut(handle).ok_or(BonefieldError::InvalidHandle)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<BoneHandle> {
        self.by_name.get(name).copied()
    }

    pub fn bone_by_name(&self, name: &str) -> Result<&Bone> {
        let handle = self
            .find(name)
            .ok_or_else(|| BonefieldError::BoneNotFound(name.to_string()))?;
        self.get(handle)
    }

    pub fn child_at(&self, handle: BoneHandle, index: usize) -> Result<BoneHandle> {
        self.get(handle)?.child_at(index)
    }

    pub fn child_count(&self, handle: BoneHandle) -> Result<usize> {
        Ok(self.get(handle)?.child_count())
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneHandle, &Bone)> {
        self.bones.iter()
    }

    /// Bones of the root's tree in depth-first pre-order.
    #[must_use]
    pub fn pre_order(&self) -> Vec<BoneHandle> {
        let mut order = Vec::with_capacity(self.bones.len());
        let Some(root) = self.root() else {
            return order;
        };
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.bones[current].children.iter().rev().copied());
        }
        order
    }

    // ========================================================================
    // Bone decoration
    // ========================================================================

    /// Appends a bind-pose axis rotation to `handle`.
    pub fn add_axis_rotation(&mut self, handle: BoneHandle, rotation: AtomicTransform) -> Result<()> {
        self.get_mut(handle)?.add_axis_rotation(rotation);
        Ok(())
    }

    /// Inserts a DOF into `handle`. Returns its channel slot.
    pub fn add_dof(&mut self, handle: BoneHandle, dof: AtomicTransform) -> Result<usize> {
        Ok(self.get_mut(handle)?.add_dof(dof))
    }

    /// Total number of DOFs across all bones.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.bones.values().map(Bone::dof_count).sum()
    }

    /// Writes one frame of motion-capture channel values to the named bone.
    pub fn apply_channels(&mut self, bone: &str, values: &[f32]) -> Result<()> {
        let handle = self
            .find(bone)
            .ok_or_else(|| BonefieldError::BoneNotFound(bone.to_string()))?;
        self.get_mut(handle)?.set_channel_values(values)
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Runs the bind-pose pass over the whole tree, root to leaves.
    pub fn calculate_matrices(&mut self) {
        let Some(root) = self.root() else {
            self.computed = true;
            return;
        };
        let visited = transform_system::calculate_bind_pose(&mut self.bones, root, &self.settings);
        if visited < self.bones.len() {
            log::warn!(
                "{} bone(s) are not attached to the root and keep stale matrices",
                self.bones.len() - visited
            );
        }
        log::debug!("calculated bind-pose matrices for {visited} bone(s)");
        self.computed = true;
    }

    /// Whether the bind-pose caches of `handle` and its ancestors are current.
    #[must_use]
    pub fn matrices_current(&self, handle: BoneHandle) -> bool {
        if !self.computed {
            return false;
        }
        let mut cursor = Some(handle);
        while let Some(current) = cursor {
            match self.bones.get(current) {
                Some(bone) if !bone.dirty => cursor = bone.parent,
                _ => return false,
            }
        }
        true
    }

    fn ensure_current(&self, handle: BoneHandle) -> Result<&Bone> {
        let bone = self.get(handle)?;
        if !self.matrices_current(handle) {
            return Err(BonefieldError::MatricesNotComputed);
        }
        Ok(bone)
    }

    fn parent_translation(&self, bone: &Bone) -> Option<Mat4> {
        bone.parent
            .and_then(|p| self.bones.get(p))
            .map(|p| p.translation_current_to_next)
    }

    /// Live transform from the parent joint frame to `handle`'s current frame.
    pub fn calculate_transform_prev_to_current_with_dofs(&self, handle: BoneHandle) -> Result<Mat4> {
        let bone = self.ensure_current(handle)?;
        Ok(transform_system::prev_to_current_with_dofs(
            bone,
            self.parent_translation(bone),
            &self.settings,
        ))
    }

    /// Bind-pose transform from the parent joint frame to `handle`.
    pub fn calculate_transform_prev_to_current_without_dofs(&self, handle: BoneHandle) -> Result<Mat4> {
        let bone = self.ensure_current(handle)?;
        Ok(transform_system::prev_to_current_without_dofs(
            bone,
            self.parent_translation(bone),
        ))
    }

    /// Bind-pose world matrix of `handle`.
    pub fn binding_pose_matrix(&self, handle: BoneHandle) -> Result<Mat4> {
        Ok(*self.ensure_current(handle)?.binding_pose_matrix())
    }

    /// World-space joint matrices of the root's tree, in pre-order.
    pub fn world_transforms(&self, mode: PoseMode) -> Result<Vec<(BoneHandle, Mat4)>> {
        let Some(root) = self.root() else {
            return Ok(Vec::new());
        };
        let stale = !self.computed || self.pre_order().iter().any(|h| self.bones[*h].dirty);
        if stale {
            return Err(BonefieldError::MatricesNotComputed);
        }
        Ok(transform_system::accumulate_world(&self.bones, root, mode, &self.settings))
    }
}
