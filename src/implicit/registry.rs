//! Node registry: maps type names and shortcuts to default constructors.
//!
//! Entries are registered with a `"name;shortcut"` key string, so
//! `"union;+"` makes a union reachable as both `"union"` and `"+"`.

use rustc_hash::FxHashMap;

use crate::errors::{BonefieldError, Result};
use crate::implicit::csg::{DifferenceNode, IntersectionNode, UnionNode};
use crate::implicit::distance_surface::DistanceSurface;
use crate::implicit::primitive::BoxNode;
use crate::implicit::NodeBox;

/// Default constructor of a node kind.
pub type Constructor = fn() -> NodeBox;

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    constructors: FxHashMap<String, Constructor>,
    // Full names in registration order
    names: Vec<String>,
}

impl NodeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in node kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("box;B", || Box::new(BoxNode::new()));
        registry.register("union;+", || Box::new(UnionNode::new()));
        registry.register("intersection;*", || Box::new(IntersectionNode::new()));
        registry.register("difference;-", || Box::new(DifferenceNode::new()));
        registry.register("distance_surface;D", || Box::new(DistanceSurface::new()));
        registry
    }

    /// Registers `constructor` under every `;`-separated key of `entry`.
    /// The first key is the full type name. Later registrations replace
    /// earlier ones for the same key.
    pub fn register(&mut self, entry: &str, constructor: Constructor) {
        let mut keys = entry.split(';').map(str::trim).filter(|k| !k.is_empty());
        let Some(name) = keys.next() else {
            log::warn!("ignoring node registration without a name");
            return;
        };
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        self.constructors.insert(name.to_string(), constructor);
        for shortcut in keys {
            self.constructors.insert(shortcut.to_string(), constructor);
        }
    }

    /// Constructs a default node by full name or shortcut.
    pub fn create(&self, key: &str) -> Result<NodeBox> {
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| BonefieldError::UnknownNodeType(key.to_string()))?;
        Ok(constructor())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Full type names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_resolve_to_the_same_kind() {
        let registry = NodeRegistry::with_defaults();
        for (name, shortcut) in [
            ("box", "B"),
            ("union", "+"),
            ("intersection", "*"),
            ("difference", "-"),
            ("distance_surface", "D"),
        ] {
            let a = registry.create(name).unwrap();
            let b = registry.create(shortcut).unwrap();
            assert_eq!(a.type_name(), name);
            assert_eq!(b.type_name(), name);
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        let registry = NodeRegistry::with_defaults();
        let err = registry.create("sphere").unwrap_err();
        assert!(matches!(err, BonefieldError::UnknownNodeType(ref k) if k == "sphere"));
    }

    #[test]
    fn names_keep_registration_order() {
        let registry = NodeRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["box", "union", "intersection", "difference", "distance_surface"]);
    }
}
