//! Error types for spline operations.

use thiserror::Error;

/// Coarse classification of a [`GeometryError`].
///
/// Callers that only need to decide between "skip this entity" and "abort"
/// can match on the kind instead of the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An index into a knot, control-point, weight or fit-point array is out of range.
    InvalidIndex,
    /// A configuration that requires non-zero or non-parallel vectors was degenerate.
    DegenerateGeometry,
    /// Malformed arguments to a construction or mutation operation.
    InvalidInput,
    /// The operation is not available for this curve or configuration.
    NotApplicable,
}

/// Errors that can occur during knot vector and curve operations.
///
/// Every operation that returns this error leaves its receiver unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// Index outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// Length of the indexed sequence.
        len: usize,
    },

    /// Insufficient points to define the curve.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// Invalid degree for the curve type.
    #[error("invalid degree {degree}: must be between {min} and {max}")]
    InvalidDegree {
        /// Specified degree.
        degree: usize,
        /// Minimum allowed degree.
        min: usize,
        /// Maximum allowed degree.
        max: usize,
    },

    /// Knot vector is invalid for the given curve parameters.
    #[error("invalid knot vector: {reason}")]
    InvalidKnotVector {
        /// Description of what's wrong with the knot vector.
        reason: String,
    },

    /// Weight values are invalid (e.g., negative or zero).
    #[error("invalid weight at index {index}: {value} (must be positive)")]
    InvalidWeight {
        /// Index of the invalid weight.
        index: usize,
        /// The invalid weight value.
        value: f64,
    },

    /// Malformed argument to an operation.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// Curves cannot be joined (endpoints don't match).
    #[error("curves cannot be joined: endpoint gap of {gap}")]
    CannotJoin {
        /// Distance between curve endpoints.
        gap: f64,
    },

    /// Degenerate geometry (zero length, parallel axes, collinear points).
    #[error("degenerate geometry: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },

    /// Numerical computation failed (singular system).
    #[error("numerical computation failed: {reason}")]
    NumericalError {
        /// Description of the numerical issue.
        reason: String,
    },

    /// The operation is not available for this curve.
    #[error("{operation} is not applicable: {reason}")]
    NotApplicable {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl GeometryError {
    /// Create an invalid index error.
    #[must_use]
    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }

    /// Create an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Create an invalid knot vector error.
    #[must_use]
    pub fn invalid_knot_vector(reason: impl Into<String>) -> Self {
        Self::InvalidKnotVector {
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    /// Create a numerical error.
    #[must_use]
    pub fn numerical(reason: impl Into<String>) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create a not-applicable error.
    #[must_use]
    pub fn not_applicable(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::NotApplicable {
            operation,
            reason: reason.into(),
        }
    }

    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            Self::Degenerate { .. } | Self::NumericalError { .. } => {
                ErrorKind::DegenerateGeometry
            }
            Self::NotApplicable { .. } => ErrorKind::NotApplicable,
            Self::InsufficientPoints { .. }
            | Self::InvalidDegree { .. }
            | Self::InvalidKnotVector { .. }
            | Self::InvalidWeight { .. }
            | Self::InvalidInput { .. }
            | Self::CannotJoin { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Check if this is an invalid index error.
    #[must_use]
    pub fn is_invalid_index(&self) -> bool {
        self.kind() == ErrorKind::InvalidIndex
    }

    /// Check if this is an invalid input error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// Check if this error reports degenerate geometry.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.kind() == ErrorKind::DegenerateGeometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeometryError::insufficient_points(4, 2);
        assert!(err.to_string().contains("need at least 4"));
        assert!(err.to_string().contains("got 2"));

        let err = GeometryError::invalid_index(7, 3);
        assert_eq!(err.to_string(), "index 7 out of range for length 3");

        let err = GeometryError::not_applicable("build_fit_data", "degree 5 > 3");
        assert!(err.to_string().starts_with("build_fit_data is not applicable"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GeometryError::invalid_index(1, 0).kind(),
            ErrorKind::InvalidIndex
        );
        assert_eq!(
            GeometryError::degenerate("parallel axes").kind(),
            ErrorKind::DegenerateGeometry
        );
        assert_eq!(
            GeometryError::numerical("singular").kind(),
            ErrorKind::DegenerateGeometry
        );
        assert_eq!(
            GeometryError::CannotJoin { gap: 0.5 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            GeometryError::not_applicable("op", "why").kind(),
            ErrorKind::NotApplicable
        );
    }

    #[test]
    fn test_error_predicates() {
        let err = GeometryError::invalid_input("inverted range");
        assert!(err.is_invalid_input());
        assert!(!err.is_invalid_index());

        let err = GeometryError::degenerate("zero length");
        assert!(err.is_degenerate());
        assert!(matches!(err, GeometryError::Degenerate { reason } if reason == "zero length"));
    }
}
