//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`BonefieldError`] covers all failure modes including:
//! - Malformed implicit trees (too few operator children, degenerate edges)
//! - Out-of-range child, point, edge and DOF access
//! - Skeleton hierarchy violations (re-parenting, cycles, stale handles)
//! - Scene description and settings loading
//!
//! Every failure is local to the call that reports it: no error leaves a
//! tree or skeleton in a partially modified state.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, BonefieldError>`.
//!
//! ```rust,ignore
//! use bonefield::errors::Result;
//!
//! fn sample(node: &dyn bonefield::implicit::ImplicitNode) -> Result<f64> {
//!     node.evaluate(glam::DVec3::ZERO)
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum BonefieldError {
    // ========================================================================
    // Implicit Field Errors
    // ========================================================================
    /// An operator node does not have enough children to be evaluated.
    #[error("Invalid topology: {node} requires at least {required} children, found {found}")]
    InvalidTopology {
        /// Type name of the offending node
        node: &'static str,
        /// Minimum number of children
        required: usize,
        /// Actual number of children
        found: usize,
    },

    /// A skeleton edge has zero length and cannot be projected onto.
    #[error("Degenerate edge {edge}: endpoints coincide")]
    DegenerateEdge {
        /// Index of the edge in the skeleton's edge list
        edge: usize,
    },

    /// A child was attached to a node that cannot own children.
    #[error("Node type '{0}' cannot own children")]
    NotAGroup(&'static str),

    /// No constructor is registered under the given name or shortcut.
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    // ========================================================================
    // Access Errors
    // ========================================================================
    /// Index out of bounds.
    #[error("Index out of range: {context} (index: {index}, len: {len})")]
    IndexOutOfRange {
        /// Description of what was being accessed
        context: &'static str,
        /// The invalid index
        index: usize,
        /// Length of the accessed collection
        len: usize,
    },

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// No bone with the given name exists.
    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    /// The bone handle does not refer to a live bone.
    #[error("Invalid bone handle")]
    InvalidHandle,

    /// The bone already has a parent.
    #[error("Bone '{0}' already has a parent")]
    AlreadyParented(String),

    /// Attaching the bone would make it its own ancestor.
    #[error("Attaching bone '{0}' would create a cycle")]
    Cycle(String),

    /// Bind-pose matrices are missing or stale.
    #[error("Bind-pose matrices have not been calculated since the last structural change")]
    MatricesNotComputed,

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl BonefieldError {
    #[inline]
    pub(crate) fn out_of_range(context: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            context,
            index,
            len,
        }
    }
}

/// Alias for `Result<T, BonefieldError>`.
pub type Result<T> = std::result::Result<T, BonefieldError>;
