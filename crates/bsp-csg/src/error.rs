//! Error types for CSG construction and boolean operations.

use nalgebra::Point3;
use thiserror::Error;

use crate::Plane;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CsgError>;

/// Errors that can occur while building or combining CSG solids.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CsgError {
    /// A fragment still crosses the divider after it was tessellated against it.
    ///
    /// This means the splitting invariant is broken; the tree is left untouched
    /// from the caller's point of view because the whole operation is aborted.
    #[error("fragment centered at {centroid:?} still spans divider {divider:?} after tessellation")]
    SpanningFragment {
        divider: Plane,
        centroid: Point3<f64>,
    },

    /// Tree construction went deeper than the configured limit.
    #[error("BSP tree depth exceeded the limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A face refers to a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A per-vertex attribute list does not line up with the positions.
    #[error("mesh has {actual} {attribute}, expected 0 or {expected}")]
    AttributeCountMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The mesh transform has no inverse.
    #[error("mesh transform is singular and cannot be inverted")]
    SingularTransform,
}
