//! Serializable scene descriptions of implicit trees.
//!
//! A description names each node by its registered type and carries the
//! node's reflected fields:
//!
//! | type               | fields                         |
//! |--------------------|--------------------------------|
//! | `box`              | none                           |
//! | `distance_surface` | `r`, `points`, `edges`         |
//! | `union`            | `children`                     |
//! | `intersection`     | `children`                     |
//! | `difference`       | `children` (first is the base) |
//!
//! ```json
//! { "type": "difference", "children": [
//!     { "type": "box" },
//!     { "type": "distance_surface", "r": 0.25,
//!       "points": [[0, 0, -2], [0, 0, 2]], "edges": [[0, 1]] }
//! ] }
//! ```

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::implicit::control_skeleton::Edge;
use crate::implicit::csg::{DifferenceNode, IntersectionNode, UnionNode};
use crate::implicit::distance_surface::DistanceSurface;
use crate::implicit::primitive::BoxNode;
use crate::implicit::NodeBox;
use crate::settings::FieldSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImplicitDesc {
    Box,
    DistanceSurface {
        /// Falls back to [`FieldSettings::default_radius`] when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        r: Option<f64>,
        #[serde(default)]
        points: Vec<DVec3>,
        #[serde(default)]
        edges: Vec<Edge>,
    },
    Union {
        children: Vec<ImplicitDesc>,
    },
    Intersection {
        children: Vec<ImplicitDesc>,
    },
    Difference {
        children: Vec<ImplicitDesc>,
    },
}

impl ImplicitDesc {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the node tree described by `self`.
    ///
    /// Operator child counts are validated here, so a built tree never
    /// reports `InvalidTopology` at evaluation time unless it is edited
    /// afterwards. Edge endpoints are validated as well.
    pub fn build(&self, settings: &FieldSettings) -> Result<NodeBox> {
        let node: NodeBox = match self {
            Self::Box => Box::new(BoxNode::new()),
            Self::DistanceSurface { r, points, edges } => {
                let mut surface = DistanceSurface::with_settings(settings);
                if let Some(r) = r {
                    surface.set_radius(*r);
                }
                for &p in points {
                    surface.add_point(p);
                }
                for &(first, second) in edges {
                    surface.add_edge(first, second)?;
                }
                Box::new(surface)
            }
            Self::Union { children } => {
                let node = UnionNode::from_children(build_children(children, settings)?);
                node.validate()?;
                Box::new(node)
            }
            Self::Intersection { children } => {
                let node = IntersectionNode::from_children(build_children(children, settings)?);
                node.validate()?;
                Box::new(node)
            }
            Self::Difference { children } => {
                let node = DifferenceNode::from_children(build_children(children, settings)?);
                node.validate()?;
                Box::new(node)
            }
        };
        log::debug!("built implicit node '{}'", node.type_name());
        Ok(node)
    }

    /// Number of nodes in the described tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Box | Self::DistanceSurface { .. } => 1,
            Self::Union { children } | Self::Intersection { children } | Self::Difference { children } => {
                1 + children.iter().map(Self::node_count).sum::<usize>()
            }
        }
    }
}

fn build_children(children: &[ImplicitDesc], settings: &FieldSettings) -> Result<Vec<NodeBox>> {
    children.iter().map(|c| c.build(settings)).collect()
}

/// Parses a JSON scene description and builds its tree.
pub fn load_scene(json: &str, settings: &FieldSettings) -> Result<NodeBox> {
    ImplicitDesc::from_json_str(json)?.build(settings)
}
