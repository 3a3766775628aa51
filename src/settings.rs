//! Evaluation & Skeleton Settings
//!
//! Runtime configuration for the implicit field tree and the skeleton
//! transform graph. Every field has a default, so a settings document only
//! needs to name the values it overrides.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bonefield::settings::{AngleUnit, Settings};
//!
//! // Defaults: radius 0.5, exact degenerate-edge test, degrees
//! let settings = Settings::default();
//!
//! // Partial JSON document, the rest is filled from defaults
//! let settings = Settings::from_json_str(r#"{ "skeleton": { "angle_unit": "radians" } }"#)?;
//! assert_eq!(settings.skeleton.angle_unit, AngleUnit::Radians);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

// ---------------------------------------------------------------------------
// Implicit field
// ---------------------------------------------------------------------------

/// Settings consumed by distance surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Radius assigned to newly constructed distance surfaces.
    pub default_radius: f64,
    /// Edges whose squared length is at or below this value are degenerate.
    pub degenerate_edge_epsilon: f64,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            default_radius: 0.5,
            degenerate_edge_epsilon: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Skeleton
// ---------------------------------------------------------------------------

/// Unit in which rotation angles (axis rotations and rotation DOFs) are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    /// Motion-capture skeleton files default to degrees.
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    /// Converts an angle in this unit to radians.
    #[inline]
    #[must_use]
    pub fn to_radians(self, angle: f32) -> f32 {
        match self {
            Self::Degrees => angle.to_radians(),
            Self::Radians => angle,
        }
    }
}

/// Settings consumed by [`Skeleton`](crate::skeleton::Skeleton).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonSettings {
    pub angle_unit: AngleUnit,
    /// Multiplies every bone length in the translation-to-next transform.
    pub length_scale: f32,
}

impl Default for SkeletonSettings {
    fn default() -> Self {
        Self {
            angle_unit: AngleUnit::Degrees,
            length_scale: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Top-level settings document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub field: FieldSettings,
    pub skeleton: SkeletonSettings,
}

impl Settings {
    /// Parses a JSON settings document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let settings = Settings::from_json_str(r#"{ "field": { "default_radius": 2.0 } }"#).unwrap();
        assert_eq!(settings.field.default_radius, 2.0);
        assert_eq!(settings.field.degenerate_edge_epsilon, 0.0);
        assert_eq!(settings.skeleton, SkeletonSettings::default());
    }

    #[test]
    fn angle_unit_conversion() {
        assert!((AngleUnit::Degrees.to_radians(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(AngleUnit::Radians.to_radians(1.5), 1.5);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Settings::from_json_str("{ not json").is_err());
    }
}
