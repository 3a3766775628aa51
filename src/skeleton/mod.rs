//! Skeleton Transform Graph
//!
//! Articulated skeleton made of [`Bone`]s stored in a [`Skeleton`] arena:
//! - `atomic`: single-axis rotations/translations (bind frame and DOFs)
//! - `bone`: per-joint data and cached bind-pose matrices
//! - `skeleton`: hierarchy, name lookup, DOF binding, transform queries
//! - `transform_system`: pre-order walks composing joint transforms

pub mod atomic;
pub mod bone;
#[allow(clippy::module_inception)]
pub mod skeleton;
pub mod transform_system;

pub use atomic::{AtomicTransform, DofKind};
pub use bone::Bone;
pub use skeleton::Skeleton;
pub use transform_system::PoseMode;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a bone inside its [`Skeleton`].
    pub struct BoneHandle;
}
