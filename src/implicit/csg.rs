//! CSG (Constructive Solid Geometry) operator nodes.
//!
//! - union:        minimum over all children
//! - intersection: maximum over all children
//! - difference:   child 0 minus the remaining children
//!
//! Each operator first selects a winning child index for the query point
//! (`eval_and_get_index`). The value comes from that selection and the
//! gradient is delegated entirely to the selected child. For a difference
//! won by a subtrahend this is the subtrahend's own gradient, unnegated.
//!
//! # Difference with several subtrahends
//!
//! The difference node compares the base value `a` against every
//! subtrahend `bᵢ` separately and keeps the largest `max(a, -bᵢ)`. Since
//! `maxᵢ max(a, -bᵢ) = max(a, -minᵢ bᵢ)`, the value equals the base minus
//! the union of the remaining children. Only the selected index is
//! specific to the per-subtrahend scan: ties between the base and a
//! subtrahend go to the subtrahend, ties between subtrahends to the first.

use glam::DVec3;

use crate::errors::{BonefieldError, Result};
use crate::implicit::{ImplicitDesc, ImplicitNode, NodeBox};

/// Ordered, exclusively owned child list of an operator node.
#[derive(Debug, Default)]
pub struct CsgGroup {
    children: Vec<NodeBox>,
}

impl CsgGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_children(children: Vec<NodeBox>) -> Self {
        Self { children }
    }

    pub fn push_child(&mut self, child: NodeBox) {
        self.children.push(child);
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeBox] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn nr_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Result<&dyn ImplicitNode> {
        self.children
            .get(index)
            .map(|child| &**child)
            .ok_or_else(|| BonefieldError::out_of_range("implicit child", index, self.children.len()))
    }

    pub fn child_mut(&mut self, index: usize) -> Result<&mut NodeBox> {
        let len = self.children.len();
        self.children
            .get_mut(index)
            .ok_or_else(|| BonefieldError::out_of_range("implicit child", index, len))
    }

    /// Removes and returns the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Result<NodeBox> {
        if index >= self.children.len() {
            return Err(BonefieldError::out_of_range("implicit child", index, self.children.len()));
        }
        Ok(self.children.remove(index))
    }

    fn require(&self, node: &'static str, required: usize) -> Result<()> {
        let found = self.children.len();
        if found < required {
            return Err(BonefieldError::InvalidTopology {
                node,
                required,
                found,
            });
        }
        Ok(())
    }

    fn describe_children(&self) -> Vec<ImplicitDesc> {
        self.children.iter().map(|c| c.describe()).collect()
    }
}

/// Value selection shared by the three operators.
trait Selector {
    fn eval_and_get_index(&self, p: DVec3) -> Result<(f64, usize)>;
}

macro_rules! impl_csg_node {
    ($ty:ident, $name:literal, $min_children:literal, $desc:ident) => {
        impl $ty {
            /// Minimum number of children required for evaluation.
            pub const MIN_CHILDREN: usize = $min_children;

            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn from_children(children: Vec<NodeBox>) -> Self {
                Self {
                    group: CsgGroup::from_children(children),
                }
            }

            /// Checks the child count against [`Self::MIN_CHILDREN`].
            pub fn validate(&self) -> Result<()> {
                self.group.require($name, Self::MIN_CHILDREN)
            }

            /// Evaluates the operator and reports the index of the child
            /// that determines the value at `p`.
            pub fn eval_and_get_index(&self, p: DVec3) -> Result<(f64, usize)> {
                self.validate()?;
                Selector::eval_and_get_index(self, p)
            }
        }

        impl ImplicitNode for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn evaluate(&self, p: DVec3) -> Result<f64> {
                Ok(self.eval_and_get_index(p)?.0)
            }

            fn evaluate_gradient(&self, p: DVec3) -> Result<DVec3> {
                let (_, index) = self.eval_and_get_index(p)?;
                self.group.child(index)?.evaluate_gradient(p)
            }

            fn group(&self) -> Option<&CsgGroup> {
                Some(&self.group)
            }

            fn group_mut(&mut self) -> Option<&mut CsgGroup> {
                Some(&mut self.group)
            }

            fn describe(&self) -> ImplicitDesc {
                ImplicitDesc::$desc {
                    children: self.group.describe_children(),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct UnionNode {
    group: CsgGroup,
}

impl Selector for UnionNode {
    fn eval_and_get_index(&self, p: DVec3) -> Result<(f64, usize)> {
        let mut value = f64::INFINITY;
        let mut selected = 0;
        for (i, child) in self.group.children().iter().enumerate() {
            let current = child.evaluate(p)?;
            if current < value {
                value = current;
                selected = i;
            }
        }
        Ok((value, selected))
    }
}

impl_csg_node!(UnionNode, "union", 1, Union);

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct IntersectionNode {
    group: CsgGroup,
}

impl Selector for IntersectionNode {
    fn eval_and_get_index(&self, p: DVec3) -> Result<(f64, usize)> {
        let mut value = f64::NEG_INFINITY;
        let mut selected = 0;
        for (i, child) in self.group.children().iter().enumerate() {
            let current = child.evaluate(p)?;
            if current > value {
                value = current;
                selected = i;
            }
        }
        Ok((value, selected))
    }
}

impl_csg_node!(IntersectionNode, "intersection", 1, Intersection);

// ---------------------------------------------------------------------------
// Difference
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DifferenceNode {
    group: CsgGroup,
}

impl Selector for DifferenceNode {
    fn eval_and_get_index(&self, p: DVec3) -> Result<(f64, usize)> {
        let children = self.group.children();
        let first = children[0].evaluate(p)?;

        let mut value = f64::NEG_INFINITY;
        let mut selected = 0;
        for (i, child) in children.iter().enumerate().skip(1) {
            let negated = -child.evaluate(p)?;
            let candidate = first.max(negated);
            if candidate > value {
                value = candidate;
                // ties go to the subtrahend
                selected = if first > negated { 0 } else { i };
            }
        }
        Ok((value, selected))
    }
}

impl_csg_node!(DifferenceNode, "difference", 2, Difference);
