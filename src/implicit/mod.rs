//! Implicit Field Tree
//!
//! A tree of implicit nodes evaluated by recursive dispatch:
//! - Leaves: [`BoxNode`], [`DistanceSurface`]
//! - Operators: [`UnionNode`], [`IntersectionNode`], [`DifferenceNode`]
//!
//! Every node maps a query point to a signed scalar (zero on the surface,
//! negative inside, positive outside) and to an outward gradient. Operator
//! nodes never blend gradients; they delegate to the child that wins the
//! value selection.
//!
//! Evaluation is read-only (`&self`), so an immutable tree can be shared
//! across threads. Skeleton edits on a distance surface take `&mut self`
//! and therefore cannot interleave with evaluation.

pub mod control_skeleton;
pub mod csg;
pub mod description;
pub mod distance_surface;
pub mod primitive;
pub mod registry;

pub use control_skeleton::{ControlSkeleton, Edge, SkeletonObserver};
pub use csg::{CsgGroup, DifferenceNode, IntersectionNode, UnionNode};
pub use description::{ImplicitDesc, load_scene};
pub use distance_surface::DistanceSurface;
pub use primitive::BoxNode;
pub use registry::NodeRegistry;

use std::fmt::Debug;

use glam::DVec3;

use crate::errors::{BonefieldError, Result};

/// Owned node in an implicit tree.
pub type NodeBox = Box<dyn ImplicitNode>;

/// Common capability of every node in the field tree.
pub trait ImplicitNode: Debug + Send + Sync {
    /// Registered type name (e.g. `"box"`, `"union"`).
    fn type_name(&self) -> &'static str;

    /// Field value at `p`.
    fn evaluate(&self, p: DVec3) -> Result<f64>;

    /// Outward gradient at `p`.
    fn evaluate_gradient(&self, p: DVec3) -> Result<DVec3>;

    /// Child list of a composite node, `None` for leaves.
    fn group(&self) -> Option<&CsgGroup> {
        None
    }

    fn group_mut(&mut self) -> Option<&mut CsgGroup> {
        None
    }

    /// Appends a child to a composite node.
    fn push_child(&mut self, child: NodeBox) -> Result<()> {
        let name = self.type_name();
        let group = self.group_mut().ok_or(BonefieldError::NotAGroup(name))?;
        group.push_child(child);
        Ok(())
    }

    /// Serializable description of this node and its subtree.
    fn describe(&self) -> ImplicitDesc;
}
