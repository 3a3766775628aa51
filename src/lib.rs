#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Implicit-surface evaluation and articulated skeleton transforms.
//!
//! Two independent engines sharing one shape: a tree of nodes, each with
//! a pure evaluation function, composed recursively.
//!
//! - [`implicit`]: signed scalar fields and gradients over a CSG tree of
//!   boxes and distance surfaces.
//! - [`skeleton`]: bone hierarchy with bind-pose frames and animatable
//!   degrees of freedom, composed into joint matrices.

pub mod errors;
pub mod implicit;
pub mod settings;
pub mod skeleton;

pub use errors::{BonefieldError, Result};
pub use implicit::{
    BoxNode, DifferenceNode, DistanceSurface, ImplicitDesc, ImplicitNode, IntersectionNode,
    NodeRegistry, UnionNode,
};
pub use settings::{AngleUnit, FieldSettings, Settings, SkeletonSettings};
pub use skeleton::{AtomicTransform, Bone, BoneHandle, DofKind, PoseMode, Skeleton};
