//! Distance surface around a point/edge skeleton.
//!
//! The field is the minimum distance from the query point to the skeleton
//! edges, minus `r`.
//!
//! # Unclamped projection
//!
//! Each edge is measured as an infinite line through its two endpoints:
//! `t = dot(p - a, b - a) / |b - a|²`, distance vector `(p - a) - t (b - a)`.
//! `t` is never clamped to `[0, 1]`, so a point beyond an endpoint is
//! measured against the extension of the segment, not against the endpoint.
//! This differs from the textbook distance-to-segment and is kept as is;
//! the regression tests pin the resulting values.

use glam::DVec3;

use crate::errors::{BonefieldError, Result};
use crate::implicit::control_skeleton::{ControlSkeleton, Edge, SkeletonObserver};
use crate::implicit::{ImplicitDesc, ImplicitNode};
use crate::settings::FieldSettings;

/// Per-edge helper vectors, kept in sync through [`SkeletonObserver`].
#[derive(Debug, Clone, Default, PartialEq)]
struct EdgeCache {
    /// `b - a` for every edge.
    edge_vector: Vec<DVec3>,
    /// `(b - a) / |b - a|²`; non-finite for degenerate edges.
    edge_vector_inv_length: Vec<DVec3>,
}

impl EdgeCache {
    fn update(&mut self, skeleton: &ControlSkeleton, edge: usize) {
        let (first, second) = skeleton.edges()[edge];
        let points = skeleton.points();
        let v = points[second] - points[first];
        self.edge_vector[edge] = v;
        self.edge_vector_inv_length[edge] = v * (1.0 / v.length_squared());
        log::trace!("distance surface: refreshed edge {edge} -> {v}");
    }
}

impl SkeletonObserver for EdgeCache {
    fn edge_appended(&mut self, skeleton: &ControlSkeleton, edge: usize) {
        self.edge_vector.push(DVec3::ZERO);
        self.edge_vector_inv_length.push(DVec3::ZERO);
        self.update(skeleton, edge);
    }

    fn edge_changed(&mut self, skeleton: &ControlSkeleton, edge: usize) {
        self.update(skeleton, edge);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceSurface {
    skeleton: ControlSkeleton,
    cache: EdgeCache,
    /// Offset subtracted from the skeleton distance (`r`).
    radius: f64,
    degenerate_epsilon: f64,
}

impl Default for DistanceSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceSurface {
    /// Empty skeleton with the default radius of `0.5`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(&FieldSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: &FieldSettings) -> Self {
        Self {
            skeleton: ControlSkeleton::new(),
            cache: EdgeCache::default(),
            radius: settings.default_radius,
            degenerate_epsilon: settings.degenerate_edge_epsilon,
        }
    }

    /// Builds a surface from a point list and an edge list.
    pub fn from_skeleton(points: &[DVec3], edges: &[Edge], radius: f64) -> Result<Self> {
        let mut surface = Self::new();
        surface.radius = radius;
        for &p in points {
            surface.add_point(p);
        }
        for &(first, second) in edges {
            surface.add_edge(first, second)?;
        }
        Ok(surface)
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &ControlSkeleton {
        &self.skeleton
    }

    /// Cached `b - a` per edge.
    #[inline]
    #[must_use]
    pub fn edge_vectors(&self) -> &[DVec3] {
        &self.cache.edge_vector
    }

    // ========================================================================
    // Skeleton editing
    // ========================================================================

    pub fn add_point(&mut self, position: DVec3) -> usize {
        self.skeleton.add_point(position)
    }

    /// Moves a point and refreshes the cache of the edges touching it.
    pub fn set_point(&mut self, index: usize, position: DVec3) -> Result<()> {
        self.skeleton.set_point(index, position, &mut self.cache)
    }

    pub fn add_edge(&mut self, first: usize, second: usize) -> Result<usize> {
        self.skeleton.add_edge(first, second, &mut self.cache)
    }

    pub fn set_edge(&mut self, index: usize, first: usize, second: usize) -> Result<()> {
        self.skeleton.set_edge(index, first, second, &mut self.cache)
    }

    // ========================================================================
    // Distance queries
    // ========================================================================

    /// Vector from the line through edge `index` to `p`.
    pub fn edge_distance_vector(&self, index: usize, p: DVec3) -> Result<DVec3> {
        let (first, _) = self.skeleton.edge(index)?;
        let edge = self.cache.edge_vector[index];
        if edge.length_squared() <= self.degenerate_epsilon {
            return Err(BonefieldError::DegenerateEdge { edge: index });
        }

        let p_rel = p - self.skeleton.points()[first];
        let t = p_rel.dot(self.cache.edge_vector_inv_length[index]);
        Ok(p_rel - t * edge)
    }

    /// Minimum distance over all edges and the distance vector achieving it.
    ///
    /// An empty skeleton yields `(+inf, 0)`. Ties keep the lowest edge index.
    pub fn min_distance_vector(&self, p: DVec3) -> Result<(f64, DVec3)> {
        let mut min_sqr = f64::INFINITY;
        let mut min_vec = DVec3::ZERO;
        for index in 0..self.skeleton.edges().len() {
            let v = self.edge_distance_vector(index, p)?;
            let sqr = v.length_squared();
            if sqr < min_sqr {
                min_sqr = sqr;
                min_vec = v;
            }
        }
        Ok((min_sqr.sqrt(), min_vec))
    }
}

impl ImplicitNode for DistanceSurface {
    fn type_name(&self) -> &'static str {
        "distance_surface"
    }

    fn evaluate(&self, p: DVec3) -> Result<f64> {
        let (distance, _) = self.min_distance_vector(p)?;
        Ok(distance - self.radius)
    }

    /// Normalized distance vector; zero on the skeleton lines themselves.
    fn evaluate_gradient(&self, p: DVec3) -> Result<DVec3> {
        let (_, v) = self.min_distance_vector(p)?;
        Ok(v.normalize_or_zero())
    }

    fn describe(&self) -> ImplicitDesc {
        ImplicitDesc::DistanceSurface {
            r: Some(self.radius),
            points: self.skeleton.points().to_vec(),
            edges: self.skeleton.edges().to_vec(),
        }
    }
}
