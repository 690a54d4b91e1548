//! Axis-aligned 2D bounds.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in the drawing plane.
///
/// A default box is empty: it contains no points and `min`/`max` are
/// inverted infinities, so the first [`add_point`](Self::add_point) sets both.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extents2d {
    /// Lower-left corner.
    pub min: Point2<f64>,
    /// Upper-right corner.
    pub max: Point2<f64>,
}

impl Default for Extents2d {
    fn default() -> Self {
        Self::empty()
    }
}

impl Extents2d {
    /// An empty box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// The smallest box containing all `points`.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2<f64>>,
    {
        let mut extents = Self::empty();
        for p in points {
            extents.add_point(p);
        }
        extents
    }

    /// Check if the box contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow the box to contain `point`.
    pub fn add_point(&mut self, point: &Point2<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow the box to contain `other`.
    pub fn union(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.add_point(&other.min);
        self.add_point(&other.max);
    }

    /// Width and height, zero for an empty box.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        if self.is_empty() {
            (0.0, 0.0)
        } else {
            (self.max.x - self.min.x, self.max.y - self.min.y)
        }
    }

    /// Check if `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty() {
        let extents = Extents2d::default();
        assert!(extents.is_empty());
        assert_eq!(extents.size(), (0.0, 0.0));
        assert!(!extents.contains(&Point2::origin()));
    }

    #[test]
    fn test_add_point() {
        let mut extents = Extents2d::empty();
        extents.add_point(&Point2::new(1.0, 2.0));
        assert!(!extents.is_empty());
        assert_eq!(extents.min, extents.max);

        extents.add_point(&Point2::new(-1.0, 5.0));
        assert_relative_eq!(extents.min.coords, Point2::new(-1.0, 2.0).coords);
        assert_relative_eq!(extents.max.coords, Point2::new(1.0, 5.0).coords);
        assert_eq!(extents.size(), (2.0, 3.0));
    }

    #[test]
    fn test_union() {
        let mut a = Extents2d::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        let b = Extents2d::from_points(&[Point2::new(3.0, -1.0)]);
        a.union(&b);
        assert!(a.contains(&Point2::new(2.0, 0.0)));
        assert_relative_eq!(a.max.x, 3.0);
        assert_relative_eq!(a.min.y, -1.0);

        let before = a;
        a.union(&Extents2d::empty());
        assert_eq!(a, before);
    }
}
