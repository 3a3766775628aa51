//! Implicit primitive tests
//!
//! Tests for:
//! - Box Chebyshev field sign and gradients
//! - DistanceSurface line distance (unclamped projection regression values)
//! - DistanceSurface incremental edge cache

use bonefield::errors::BonefieldError;
use bonefield::implicit::{BoxNode, DistanceSurface, ImplicitNode};
use bonefield::settings::FieldSettings;
use glam::DVec3;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f64 = 1e-12;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn dvec3_approx(a: DVec3, b: DVec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

/// Single edge from the origin to (2, 0, 0).
fn x_segment(radius: f64) -> DistanceSurface {
    DistanceSurface::from_skeleton(&[DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)], &[(0, 1)], radius)
        .unwrap()
}

// ============================================================================
// Box
// ============================================================================

#[test]
fn box_negative_inside() {
    let b = BoxNode::new();
    for p in [
        DVec3::ZERO,
        DVec3::new(0.5, -0.9, 0.99),
        DVec3::new(-0.999, 0.999, -0.999),
    ] {
        assert!(b.evaluate(p).unwrap() < 0.0, "{p} should be inside");
    }
}

#[test]
fn box_positive_outside() {
    let b = BoxNode::new();
    for p in [
        DVec3::new(1.01, 0.0, 0.0),
        DVec3::new(0.0, -3.0, 0.5),
        DVec3::new(2.0, 2.0, 2.0),
    ] {
        assert!(b.evaluate(p).unwrap() > 0.0, "{p} should be outside");
    }
}

#[test]
fn box_zero_on_faces() {
    let b = BoxNode::new();
    for p in [
        DVec3::new(1.0, 0.3, -0.2),
        DVec3::new(0.2, -1.0, 0.5),
        DVec3::new(-0.7, 0.7, 1.0),
        DVec3::new(1.0, 1.0, 1.0),
    ] {
        assert!(approx_eq(b.evaluate(p).unwrap(), 0.0), "{p} should be on the surface");
    }
}

#[test]
fn box_value_is_chebyshev_distance() {
    let b = BoxNode::new();
    assert!(approx_eq(b.evaluate(DVec3::new(3.0, -0.5, 2.0)).unwrap(), 2.0));
    assert!(approx_eq(b.evaluate(DVec3::new(0.25, -0.5, 0.0)).unwrap(), -0.5));
}

#[test]
fn box_gradient_away_from_faces() {
    let b = BoxNode::new();
    assert_eq!(b.evaluate_gradient(DVec3::new(0.1, 0.2, -3.0)).unwrap(), DVec3::NEG_Z);
    assert_eq!(b.evaluate_gradient(DVec3::new(-0.5, 0.1, 0.2)).unwrap(), DVec3::NEG_X);
}

#[test]
fn box_gradient_is_deterministic_on_edges() {
    let b = BoxNode::new();
    let p = DVec3::new(-1.0, 1.0, 0.0);
    let first = b.evaluate_gradient(p).unwrap();
    assert_eq!(first, DVec3::NEG_X);
    for _ in 0..4 {
        assert_eq!(b.evaluate_gradient(p).unwrap(), first);
    }
    assert_eq!(b.evaluate_gradient(DVec3::new(0.0, 1.0, 1.0)).unwrap(), DVec3::Y);
}

// ============================================================================
// DistanceSurface: values
// ============================================================================

#[test]
fn distance_perpendicular_to_edge() {
    let surface = x_segment(0.0);
    assert!(approx_eq(surface.evaluate(DVec3::new(1.0, 1.0, 0.0)).unwrap(), 1.0));
    assert!(approx_eq(surface.evaluate(DVec3::new(0.5, 0.0, -3.0)).unwrap(), 3.0));
}

#[test]
fn distance_beyond_endpoint_uses_infinite_line() {
    let surface = x_segment(0.0);

    // On the line's extension: 0 here, a clamped segment distance would give 1.
    assert!(approx_eq(surface.evaluate(DVec3::new(3.0, 0.0, 0.0)).unwrap(), 0.0));
    // Off the extension: 1 here, a clamped segment distance would give sqrt(2).
    assert!(approx_eq(surface.evaluate(DVec3::new(3.0, 1.0, 0.0)).unwrap(), 1.0));
    assert!(approx_eq(surface.evaluate(DVec3::new(-4.0, 0.0, 2.0)).unwrap(), 2.0));
}

#[test]
fn radius_offsets_the_field() {
    let surface = x_segment(0.25);
    assert!(approx_eq(surface.evaluate(DVec3::new(1.0, 1.0, 0.0)).unwrap(), 0.75));
    assert!(approx_eq(surface.evaluate(DVec3::new(1.0, 0.0, 0.0)).unwrap(), -0.25));
}

#[test]
fn nearest_edge_wins() {
    let surface = DistanceSurface::from_skeleton(
        &[
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 5.0, 0.0),
            DVec3::new(1.0, 5.0, 0.0),
        ],
        &[(0, 1), (2, 3)],
        0.0,
    )
    .unwrap();

    let (distance, v) = surface.min_distance_vector(DVec3::new(0.5, 4.0, 0.0)).unwrap();
    assert!(approx_eq(distance, 1.0));
    assert!(dvec3_approx(v, DVec3::new(0.0, -1.0, 0.0)));
}

#[test]
fn default_radius_comes_from_settings() {
    assert_eq!(DistanceSurface::new().radius(), 0.5);
    let settings = FieldSettings {
        default_radius: 1.5,
        ..FieldSettings::default()
    };
    assert_eq!(DistanceSurface::with_settings(&settings).radius(), 1.5);
}

// ============================================================================
// DistanceSurface: gradient
// ============================================================================

#[test]
fn gradient_points_away_from_skeleton() {
    let surface = x_segment(0.5);
    let grad = surface.evaluate_gradient(DVec3::new(1.0, 3.0, 0.0)).unwrap();
    assert!(dvec3_approx(grad, DVec3::Y));

    let grad = surface.evaluate_gradient(DVec3::new(1.0, -2.0, 2.0)).unwrap();
    let expected = DVec3::new(0.0, -1.0, 1.0).normalize();
    assert!(dvec3_approx(grad, expected));
}

#[test]
fn gradient_on_the_line_is_zero() {
    let surface = x_segment(0.5);
    assert_eq!(surface.evaluate_gradient(DVec3::new(1.0, 0.0, 0.0)).unwrap(), DVec3::ZERO);
}

// ============================================================================
// DistanceSurface: editing and errors
// ============================================================================

#[test]
fn degenerate_edge_is_reported() {
    let mut surface = x_segment(0.0);
    surface.set_point(1, DVec3::ZERO).unwrap();
    let err = surface.evaluate(DVec3::ONE).unwrap_err();
    assert!(matches!(err, BonefieldError::DegenerateEdge { edge: 0 }));

    // Moving the point back repairs the edge.
    surface.set_point(1, DVec3::new(2.0, 0.0, 0.0)).unwrap();
    assert!(approx_eq(surface.evaluate(DVec3::new(1.0, 1.0, 0.0)).unwrap(), 1.0));
}

#[test]
fn degenerate_tolerance_from_settings() {
    let settings = FieldSettings {
        degenerate_edge_epsilon: 1e-6,
        ..FieldSettings::default()
    };
    let mut surface = DistanceSurface::with_settings(&settings);
    let a = surface.add_point(DVec3::ZERO);
    let b = surface.add_point(DVec3::new(1e-4, 0.0, 0.0));
    surface.add_edge(a, b).unwrap();
    assert!(matches!(
        surface.evaluate(DVec3::ONE),
        Err(BonefieldError::DegenerateEdge { edge: 0 })
    ));
}

#[test]
fn edge_with_missing_point_is_rejected() {
    let mut surface = x_segment(0.0);
    let err = surface.add_edge(0, 2).unwrap_err();
    assert!(matches!(err, BonefieldError::IndexOutOfRange { index: 2, len: 2, .. }));
    assert_eq!(surface.skeleton().edges().len(), 1);
    assert!(surface.edge_distance_vector(1, DVec3::ZERO).is_err());
}

#[test]
fn set_edge_refreshes_cache() {
    let mut surface = x_segment(0.0);
    let c = surface.add_point(DVec3::new(0.0, 0.0, 4.0));
    surface.set_edge(0, 0, c).unwrap();

    assert_eq!(surface.edge_vectors()[0], DVec3::new(0.0, 0.0, 4.0));
    assert!(approx_eq(surface.evaluate(DVec3::new(3.0, 0.0, 1.0)).unwrap(), 3.0));
}

#[test]
fn point_move_refreshes_only_incident_edges() {
    let mut surface = DistanceSurface::from_skeleton(
        &[
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(0.0, 3.0, 0.0),
            DVec3::new(0.0, 3.0, 1.0),
        ],
        &[(0, 1), (2, 3)],
        0.0,
    )
    .unwrap();
    let untouched = surface.edge_vectors()[1];

    surface.set_point(1, DVec3::new(0.0, 2.0, 0.0)).unwrap();
    assert_eq!(surface.edge_vectors()[0], DVec3::new(0.0, 2.0, 0.0));
    assert_eq!(surface.edge_vectors()[1], untouched);
}

#[test]
fn identical_edit_sequences_give_identical_caches() {
    fn build() -> DistanceSurface {
        let mut surface = DistanceSurface::new();
        let a = surface.add_point(DVec3::new(0.1, 0.2, 0.3));
        let b = surface.add_point(DVec3::new(-1.7, 2.9, 0.4));
        let c = surface.add_point(DVec3::new(3.3, -0.6, 1.1));
        surface.add_edge(a, b).unwrap();
        surface.add_edge(b, c).unwrap();
        surface.set_point(b, DVec3::new(0.7, 1.3, -2.2)).unwrap();
        surface.set_edge(1, c, a).unwrap();
        surface
    }

    let first = build();
    let second = build();
    let bits = |s: &DistanceSurface| -> Vec<[u64; 3]> {
        s.edge_vectors()
            .iter()
            .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
            .collect()
    };
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(first, second);
}
