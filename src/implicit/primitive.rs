use glam::DVec3;

use crate::errors::Result;
use crate::implicit::{ImplicitDesc, ImplicitNode};

/// Axis-aligned unit cube centered at the origin.
///
/// The field is the Chebyshev (L∞) distance to the cube surface:
/// `max(|x|, |y|, |z|) - 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxNode;

impl BoxNode {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ImplicitNode for BoxNode {
    fn type_name(&self) -> &'static str {
        "box"
    }

    fn evaluate(&self, p: DVec3) -> Result<f64> {
        Ok(p.abs().max_element() - 1.0)
    }

    /// Unit normal of the face owning the active max-term.
    ///
    /// On edges and corners several terms tie; the first axis wins
    /// (x, then y, then z) and a zero coordinate counts as the positive side.
    fn evaluate_gradient(&self, p: DVec3) -> Result<DVec3> {
        let a = p.abs();
        let axis = if a.x >= a.y && a.x >= a.z {
            0
        } else if a.y >= a.z {
            1
        } else {
            2
        };
        let mut grad = DVec3::ZERO;
        grad[axis] = if p[axis] >= 0.0 { 1.0 } else { -1.0 };
        Ok(grad)
    }

    fn describe(&self) -> ImplicitDesc {
        ImplicitDesc::Box
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_gradients_are_outward_normals() {
        let b = BoxNode::new();
        assert_eq!(b.evaluate_gradient(DVec3::new(1.0, 0.2, -0.3)).unwrap(), DVec3::X);
        assert_eq!(b.evaluate_gradient(DVec3::new(-1.0, 0.2, 0.3)).unwrap(), DVec3::NEG_X);
        assert_eq!(b.evaluate_gradient(DVec3::new(0.1, -1.0, 0.3)).unwrap(), DVec3::NEG_Y);
        assert_eq!(b.evaluate_gradient(DVec3::new(0.1, 0.5, 1.0)).unwrap(), DVec3::Z);
    }

    #[test]
    fn corner_prefers_x_axis() {
        let b = BoxNode::new();
        assert_eq!(b.evaluate_gradient(DVec3::new(1.0, 1.0, 1.0)).unwrap(), DVec3::X);
        assert_eq!(b.evaluate_gradient(DVec3::new(0.5, -1.0, -1.0)).unwrap(), DVec3::NEG_Y);
        assert_eq!(b.evaluate_gradient(DVec3::ZERO).unwrap(), DVec3::X);
    }
}
