//! Error types for path tessellation.

use spline_types::GeometryError;
use thiserror::Error;

/// Errors that can occur while feeding path commands into a tessellator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TessellateError {
    /// A drawing command arrived before any `move_to`.
    #[error("{command} without a current point")]
    NoCurrentPoint {
        /// Name of the rejected command.
        command: &'static str,
    },

    /// Building a curve from the accumulated points failed.
    #[error("curve construction failed: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result type for tessellation operations.
pub type TessellateResult<T> = std::result::Result<T, TessellateError>;
