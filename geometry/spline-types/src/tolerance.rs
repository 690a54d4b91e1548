//! Geometric comparison tolerances.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance for point coincidence.
pub const DEFAULT_EQUAL_POINT: f64 = 1e-10;

/// Default tolerance for vector comparison.
pub const DEFAULT_EQUAL_VECTOR: f64 = 1e-10;

/// Tolerances used when comparing points and vectors.
///
/// Two points are equal when their distance is at most `equal_point`.
/// Two vectors are equal when their difference has length at most
/// `equal_vector`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tolerance {
    /// Maximum distance between two points considered coincident.
    pub equal_point: f64,
    /// Maximum length of the difference between two vectors considered equal.
    pub equal_vector: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            equal_point: DEFAULT_EQUAL_POINT,
            equal_vector: DEFAULT_EQUAL_VECTOR,
        }
    }
}

impl Tolerance {
    /// Create a tolerance using the same value for points and vectors.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            equal_point: value,
            equal_vector: value,
        }
    }

    /// Set the point tolerance.
    #[must_use]
    pub const fn with_equal_point(mut self, value: f64) -> Self {
        self.equal_point = value;
        self
    }

    /// Set the vector tolerance.
    #[must_use]
    pub const fn with_equal_vector(mut self, value: f64) -> Self {
        self.equal_vector = value;
        self
    }

    /// Check whether two points coincide.
    #[must_use]
    pub fn points_equal(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() <= self.equal_point
    }

    /// Check whether two vectors are equal.
    #[must_use]
    pub fn vectors_equal(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
        (a - b).norm() <= self.equal_vector
    }

    /// Check whether a vector has zero length.
    #[must_use]
    pub fn is_zero_length(&self, v: &Vector3<f64>) -> bool {
        v.norm() <= self.equal_vector
    }
}
