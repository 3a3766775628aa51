use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::settings::AngleUnit;

/// Whether a transform component rotates about or translates along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DofKind {
    Translation,
    Rotation,
}

/// A single-axis rotation or translation.
///
/// Used both for the fixed axis rotations that define a bone's bind-pose
/// frame and for the animatable degrees of freedom (DOFs) driven by
/// motion-capture channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicTransform {
    kind: DofKind,
    axis: Vec3,
    /// Angle (in the skeleton's angle unit) or translation distance.
    value: f32,
    limits: Option<(f32, f32)>,
    /// Channel name, e.g. `"rx"` or `"tz"`.
    title: String,
    /// Slot in the bone's motion-capture channel list.
    index_in_amc: Option<usize>,
}

impl AtomicTransform {
    /// Rotation about `axis` by `angle`.
    #[must_use]
    pub fn rotation(axis: Vec3, angle: f32) -> Self {
        Self::new(DofKind::Rotation, axis, angle)
    }

    /// Translation along `axis` by `distance`.
    #[must_use]
    pub fn translation(axis: Vec3, distance: f32) -> Self {
        Self::new(DofKind::Translation, axis, distance)
    }

    fn new(kind: DofKind, axis: Vec3, value: f32) -> Self {
        Self {
            kind,
            axis: axis.normalize_or_zero(),
            value,
            limits: None,
            title: String::new(),
            index_in_amc: None,
        }
    }

    /// Parses a motion-capture channel name (`rx`, `ry`, `rz`, `tx`, `ty`,
    /// `tz`, case-insensitive) into a zero-valued DOF.
    #[must_use]
    pub fn from_channel(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let mut chars = lower.chars();
        let kind = match chars.next()? {
            'r' => DofKind::Rotation,
            't' => DofKind::Translation,
            _ => return None,
        };
        let axis = match chars.next()? {
            'x' => Vec3::X,
            'y' => Vec3::Y,
            'z' => Vec3::Z,
            _ => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(kind, axis, 0.0).with_title(lower))
    }

    #[must_use]
    pub fn with_limits(mut self, min: f32, max: f32) -> Self {
        self.limits = Some((min.min(max), min.max(max)));
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> DofKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn limits(&self) -> Option<(f32, f32)> {
        self.limits
    }

    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    #[must_use]
    pub fn index_in_amc(&self) -> Option<usize> {
        self.index_in_amc
    }

    pub(crate) fn set_index_in_amc(&mut self, index: usize) {
        self.index_in_amc = Some(index);
    }

    /// Sets the current value, clamped to the limits if any. Returns the
    /// value actually stored.
    pub fn set_value(&mut self, value: f32) -> f32 {
        self.value = match self.limits {
            Some((min, max)) if value < min || value > max => {
                log::warn!(
                    "DOF '{}' value {value} outside limits [{min}, {max}], clamping",
                    self.title
                );
                value.clamp(min, max)
            }
            _ => value,
        };
        self.value
    }

    /// Current transform as a matrix. A zero axis yields the identity.
    #[must_use]
    pub fn calculate_matrix(&self, unit: AngleUnit) -> Mat4 {
        if self.axis == Vec3::ZERO {
            return Mat4::IDENTITY;
        }
        match self.kind {
            DofKind::Rotation => Mat4::from_axis_angle(self.axis, unit.to_radians(self.value)),
            DofKind::Translation => Mat4::from_translation(self.axis * self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_parse() {
        let rx = AtomicTransform::from_channel("RX").unwrap();
        assert_eq!(rx.kind(), DofKind::Rotation);
        assert_eq!(rx.axis(), Vec3::X);
        assert_eq!(rx.title(), "rx");

        let tz = AtomicTransform::from_channel("tz").unwrap();
        assert_eq!(tz.kind(), DofKind::Translation);
        assert_eq!(tz.axis(), Vec3::Z);

        assert!(AtomicTransform::from_channel("l").is_none());
        assert!(AtomicTransform::from_channel("rw").is_none());
        assert!(AtomicTransform::from_channel("rxx").is_none());
    }

    #[test]
    fn limits_clamp_values() {
        let mut dof = AtomicTransform::rotation(Vec3::Y, 0.0).with_limits(45.0, -45.0);
        assert_eq!(dof.limits(), Some((-45.0, 45.0)));
        assert_eq!(dof.set_value(90.0), 45.0);
        assert_eq!(dof.set_value(-10.0), -10.0);
    }

    #[test]
    fn rotation_matrix_uses_angle_unit() {
        let dof = AtomicTransform::rotation(Vec3::Z, 90.0);
        let p = dof.calculate_matrix(AngleUnit::Degrees).transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-6);

        let dof = AtomicTransform::rotation(Vec3::Z, std::f32::consts::FRAC_PI_2);
        let p = dof.calculate_matrix(AngleUnit::Radians).transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-6);
    }
}
