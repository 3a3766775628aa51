//! Point/edge skeleton used as the generator of a distance surface.
//!
//! The skeleton owns the control points and the edge list. Every edit
//! reports the affected edges to a [`SkeletonObserver`], which lets the
//! owner refresh per-edge caches incrementally instead of rebuilding them.

use glam::DVec3;
use smallvec::SmallVec;

use crate::errors::{BonefieldError, Result};

/// Pair of point indices describing a line segment.
pub type Edge = (usize, usize);

/// Change notifications emitted by [`ControlSkeleton`] edits.
///
/// Callbacks run after the skeleton has been updated, so the skeleton passed
/// in already reflects the edit.
pub trait SkeletonObserver {
    /// A new edge was appended at index `edge`.
    fn edge_appended(&mut self, skeleton: &ControlSkeleton, edge: usize);

    /// The endpoints of edge `edge` were replaced.
    fn edge_changed(&mut self, skeleton: &ControlSkeleton, edge: usize);

    /// Point `point` moved. Defaults to refreshing every incident edge.
    fn position_changed(&mut self, skeleton: &ControlSkeleton, point: usize) {
        for &edge in skeleton.edges_at(point) {
            self.edge_changed(skeleton, edge);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSkeleton {
    points: Vec<DVec3>,
    edges: Vec<Edge>,
    // incident[point] = edges touching the point
    incident: Vec<SmallVec<[usize; 4]>>,
}

impl ControlSkeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn point(&self, index: usize) -> Result<DVec3> {
        self.points
            .get(index)
            .copied()
            .ok_or_else(|| BonefieldError::out_of_range("skeleton point", index, self.points.len()))
    }

    pub fn edge(&self, index: usize) -> Result<Edge> {
        self.edges
            .get(index)
            .copied()
            .ok_or_else(|| BonefieldError::out_of_range("skeleton edge", index, self.edges.len()))
    }

    /// Edges incident to `point`; empty for unknown points.
    #[must_use]
    pub fn edges_at(&self, point: usize) -> &[usize] {
        self.incident.get(point).map_or(&[][..], |edges| edges.as_slice())
    }

    /// Appends a point and returns its index. A fresh point has no edges,
    /// so no observer is involved.
    pub fn add_point(&mut self, position: DVec3) -> usize {
        self.points.push(position);
        self.incident.push(SmallVec::new());
        self.points.len() - 1
    }

    pub fn set_point(
        &mut self,
        index: usize,
        position: DVec3,
        observer: &mut impl SkeletonObserver,
    ) -> Result<()> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or_else(|| BonefieldError::out_of_range("skeleton point", index, len))?;
        *slot = position;
        observer.position_changed(self, index);
        Ok(())
    }

    /// Appends an edge between two existing points and returns its index.
    pub fn add_edge(
        &mut self,
        first: usize,
        second: usize,
        observer: &mut impl SkeletonObserver,
    ) -> Result<usize> {
        self.check_endpoints(first, second)?;
        let index = self.edges.len();
        self.edges.push((first, second));
        self.link(index, first, second);
        observer.edge_appended(self, index);
        Ok(index)
    }

    /// Replaces both endpoints of an existing edge.
    pub fn set_edge(
        &mut self,
        index: usize,
        first: usize,
        second: usize,
        observer: &mut impl SkeletonObserver,
    ) -> Result<()> {
        let (old_first, old_second) = self.edge(index)?;
        self.check_endpoints(first, second)?;

        self.unlink(index, old_first, old_second);
        self.edges[index] = (first, second);
        self.link(index, first, second);
        observer.edge_changed(self, index);
        Ok(())
    }

    fn check_endpoints(&self, first: usize, second: usize) -> Result<()> {
        let len = self.points.len();
        for index in [first, second] {
            if index >= len {
                return Err(BonefieldError::out_of_range("edge endpoint", index, len));
            }
        }
        Ok(())
    }

    fn link(&mut self, edge: usize, first: usize, second: usize) {
        self.incident[first].push(edge);
        if second != first {
            self.incident[second].push(edge);
        }
    }

    fn unlink(&mut self, edge: usize, first: usize, second: usize) {
        self.incident[first].retain(|e| *e != edge);
        self.incident[second].retain(|e| *e != edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        appended: Vec<usize>,
        changed: Vec<usize>,
    }

    impl SkeletonObserver for Recorder {
        fn edge_appended(&mut self, _: &ControlSkeleton, edge: usize) {
            self.appended.push(edge);
        }

        fn edge_changed(&mut self, _: &ControlSkeleton, edge: usize) {
            self.changed.push(edge);
        }
    }

    fn chain() -> (ControlSkeleton, Recorder) {
        let mut skeleton = ControlSkeleton::new();
        let mut recorder = Recorder::default();
        for x in 0..4 {
            skeleton.add_point(DVec3::new(f64::from(x), 0.0, 0.0));
        }
        skeleton.add_edge(0, 1, &mut recorder).unwrap();
        skeleton.add_edge(1, 2, &mut recorder).unwrap();
        skeleton.add_edge(2, 3, &mut recorder).unwrap();
        (skeleton, recorder)
    }

    #[test]
    fn moving_a_point_notifies_only_incident_edges() {
        let (mut skeleton, mut recorder) = chain();
        assert_eq!(recorder.appended, vec![0, 1, 2]);

        skeleton.set_point(2, DVec3::new(2.0, 1.0, 0.0), &mut recorder).unwrap();
        assert_eq!(recorder.changed, vec![1, 2]);
    }

    #[test]
    fn set_edge_relinks_incidence() {
        let (mut skeleton, mut recorder) = chain();
        skeleton.set_edge(0, 2, 3, &mut recorder).unwrap();

        assert!(skeleton.edges_at(0).is_empty());
        assert_eq!(skeleton.edges_at(1), &[1]);
        assert_eq!(skeleton.edges_at(3), &[2, 0]);
    }

    #[test]
    fn invalid_endpoints_are_rejected_without_mutation() {
        let (mut skeleton, mut recorder) = chain();
        let err = skeleton.add_edge(0, 9, &mut recorder).unwrap_err();
        assert!(matches!(err, BonefieldError::IndexOutOfRange { index: 9, len: 4, .. }));
        assert_eq!(skeleton.edges().len(), 3);

        assert!(skeleton.set_edge(7, 0, 1, &mut recorder).is_err());
        assert!(skeleton.set_point(4, DVec3::ZERO, &mut recorder).is_err());
    }
}
