//! Straight source curves.

use crate::{GeometryError, Result};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A bounded line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSegment3d {
    /// First end point.
    pub start: Point3<f64>,
    /// Second end point.
    pub end: Point3<f64>,
}

impl LineSegment3d {
    /// Segment from `start` to `end`.
    #[must_use]
    pub const fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Vector from start to end.
    #[must_use]
    pub fn direction(&self) -> Vector3<f64> {
        self.end - self.start
    }

    /// Point at `t`, with `t = 0` at the start and `t = 1` at the end.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.start + self.direction() * t
    }
}

/// A half-infinite line. It has no spline form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ray3d {
    origin: Point3<f64>,
    direction: Vector3<f64>,
}

impl Ray3d {
    /// Ray from `origin` along `direction` (normalized).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a zero direction.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Result<Self> {
        let len = direction.norm();
        if len == 0.0 || !len.is_finite() {
            return Err(GeometryError::degenerate("ray direction has zero length"));
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Start point.
    #[must_use]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Unit direction.
    #[must_use]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Point at distance `t` from the origin.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment() {
        let seg = LineSegment3d::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 3.0, 4.0));
        assert_relative_eq!(seg.length(), 5.0);
        assert_relative_eq!(seg.point_at(0.5).coords, Vector3::new(1.0, 1.5, 2.0));
    }

    #[test]
    fn test_ray() {
        let ray = Ray3d::new(Point3::origin(), Vector3::new(0.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(ray.direction(), Vector3::y());
        assert_relative_eq!(ray.point_at(3.0).coords, Vector3::new(0.0, 3.0, 0.0));
        assert!(Ray3d::new(Point3::origin(), Vector3::zeros()).unwrap_err().is_degenerate());
    }
}
