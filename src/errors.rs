//! Error taxonomy for normal computation and editing

use thiserror::Error;

/// Result type alias for normal operations.
pub type NormalResult<T> = Result<T, NormalError>;

/// All the failure modes a pass or operator can surface.
///
/// Numeric edge cases (zero area, zero corner angle, exactly cancelling
/// normals) are never fatal: [`NormalError::DegenerateNormal`] is raised by
/// the weight calculator and recovered by the assignment engine with a
/// stable fallback axis, then recorded in the pass report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalError {
    /// A face has fewer than 3 vertices or references an out-of-range
    /// vertex. Fatal: the pass aborts without touching the mesh.
    #[error("invalid topology in face {face}: {details}")]
    InvalidTopology { face: usize, details: String },

    /// A weighted normal sum collapsed to the zero vector at the given
    /// vertex. Recovered locally; never escapes a pass.
    #[error("weighted normal sum is degenerate at vertex {vertex}")]
    DegenerateNormal { vertex: u32 },

    /// Get requires exactly one selected face or exactly one selected
    /// vertex. No mesh mutation is performed.
    #[error("ambiguous selection: {vertices} vertices and {faces} faces selected")]
    AmbiguousSelection { vertices: usize, faces: usize },

    /// Transfer shading found no source sample within tolerance for the
    /// given vertex. That vertex is left unmodified; others proceed.
    #[error("no reachable shading source for vertex {vertex}")]
    EmptyTarget { vertex: u32 },
}
