//! Per-page store of tessellated curves.

use nalgebra::{Point2, Point3};
use spline_types::{NurbsCurve, Polyline3d, SplineEntity};

use crate::extents::Extents2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polyline emitted for straight path segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolylineEntry {
    /// Index of the subpath the polyline came from, counted per tessellator.
    pub subpath: usize,
    /// The curve, lying in the drawing plane.
    pub polyline: Polyline3d,
    /// Bounds of the vertices.
    pub extents: Extents2d,
}

/// A spline emitted for a chain of cubic Bezier segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplineEntry {
    /// Index of the subpath the spline came from, counted per tessellator.
    pub subpath: usize,
    /// The curve, lying in the drawing plane.
    pub curve: NurbsCurve,
    /// Bounds of the curve, see [`SplineEntity::extents`].
    pub extents: Extents2d,
}

/// Curves produced for one page, in emission order per kind.
///
/// The cache only grows while a page is tessellated. Callers
/// [`clear`](Self::clear) it before tessellating the page again.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryCache {
    polylines: Vec<PolylineEntry>,
    splines: Vec<SplineEntry>,
}

impl GeometryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Polylines in the order they were emitted.
    #[must_use]
    pub fn polylines(&self) -> &[PolylineEntry] {
        &self.polylines
    }

    /// Splines in the order they were emitted.
    #[must_use]
    pub fn splines(&self) -> &[SplineEntry] {
        &self.splines
    }

    /// Total number of cached curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polylines.len() + self.splines.len()
    }

    /// Check if the cache holds no curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.splines.is_empty()
    }

    /// Remove all curves.
    pub fn clear(&mut self) {
        self.polylines.clear();
        self.splines.clear();
    }

    /// Take the cached curves, leaving the cache empty.
    pub fn take(&mut self) -> (Vec<PolylineEntry>, Vec<SplineEntry>) {
        (
            std::mem::take(&mut self.polylines),
            std::mem::take(&mut self.splines),
        )
    }

    /// Bounds of every cached curve in the drawing plane.
    ///
    /// The union of the entry extents, computed on every call.
    #[must_use]
    pub fn extents(&self) -> Extents2d {
        let mut extents = Extents2d::empty();
        for entry in &self.polylines {
            extents.union(&entry.extents);
        }
        for entry in &self.splines {
            extents.union(&entry.extents);
        }
        extents
    }

    pub(crate) fn push_polyline(&mut self, subpath: usize, polyline: Polyline3d) {
        let mut extents = Extents2d::empty();
        for v in polyline.vertices() {
            extents.add_point(&planar(v));
        }
        self.polylines.push(PolylineEntry {
            subpath,
            polyline,
            extents,
        });
    }

    pub(crate) fn push_spline(&mut self, subpath: usize, curve: NurbsCurve) {
        let (min, max) = curve.extents();
        let extents = Extents2d::from_points(&[planar(&min), planar(&max)]);
        self.splines.push(SplineEntry {
            subpath,
            curve,
            extents,
        });
    }
}

fn planar(p: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spline_types::KnotVector;

    fn triangle() -> Polyline3d {
        Polyline3d::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ])
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = GeometryCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert!(cache.extents().is_empty());
    }

    #[test]
    fn test_extents_cover_all_curves() {
        let mut cache = GeometryCache::new();
        cache.push_polyline(0, triangle());

        let knots = KnotVector::from_knots(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let arch = NurbsCurve::non_rational(
            2,
            knots,
            vec![
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(6.0, 2.0, 0.0),
                Point3::new(7.0, 0.0, 0.0),
            ],
            false,
        )
        .unwrap();
        let mut spline_only = GeometryCache::new();
        spline_only.push_spline(1, arch.clone());
        // The quadratic peaks at half its control height.
        assert_relative_eq!(spline_only.extents().max.y, 1.0, epsilon = 1e-12);

        cache.push_spline(1, arch);
        assert_eq!(cache.len(), 2);
        let extents = cache.extents();
        assert_relative_eq!(extents.min.coords, Point2::new(0.0, 0.0).coords, epsilon = 1e-12);
        assert_relative_eq!(extents.max.x, 7.0, epsilon = 1e-12);
        assert_relative_eq!(extents.max.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spline_extents_enclose_off_center_peak() {
        // Peaks at t = 1/3, between evenly spaced samples.
        let knots = KnotVector::from_knots(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let lopsided = NurbsCurve::non_rational(
            3,
            knots,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 3.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            false,
        )
        .unwrap();
        let near_peak = [0.33, 0.34].map(|t| planar(&lopsided.eval_point(t)));

        let mut cache = GeometryCache::new();
        cache.push_spline(0, lopsided);
        let extents = cache.splines()[0].extents;
        assert!(near_peak.iter().all(|p| extents.contains(p)));
        assert_relative_eq!(extents.max.y, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clear_and_take() {
        let mut cache = GeometryCache::new();
        cache.push_polyline(0, triangle());
        cache.push_polyline(1, triangle());

        let (polylines, splines) = cache.clone().take();
        assert_eq!(polylines.len(), 2);
        assert!(splines.is_empty());
        assert_eq!(polylines[1].subpath, 1);
        assert_eq!(polylines[1].extents.size(), (4.0, 3.0));

        cache.clear();
        assert!(cache.is_empty());
    }
}
