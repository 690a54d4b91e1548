//! Polyline (piecewise linear) splines.
//!
//! A polyline is the degree-1 spline whose control points are its vertices.
//! Every vertex is interpolated, so the vertex list doubles as fit data and
//! no fitting is ever needed.

use crate::basis::find_span;
use crate::{GeometryError, KnotVector, Result, SplineEntity, Tolerance};
use nalgebra::{Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Recursion limit for [`Polyline3d::from_curve`]; bounds the output at
/// `2^12` segments per knot interval.
const MAX_SUBDIVISION_DEPTH: usize = 12;

/// A piecewise linear spline defined by a sequence of vertices.
///
/// # Parameterization
///
/// By default vertex `i` sits at parameter `i`, so the knot vector is
/// `[0, 0, 1, 2, …, n-1, n-1]` and segment `i` covers `[i, i + 1]`.
/// [`Polyline3d::from_knots_and_points`] accepts any other degree-1 knot
/// vector.
///
/// # Example
///
/// ```
/// use spline_types::{Polyline3d, SplineEntity};
/// use nalgebra::Point3;
///
/// let polyline = Polyline3d::new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
/// ]);
///
/// // Length is 2 (two unit segments)
/// assert!((polyline.length() - 2.0).abs() < 1e-10);
///
/// // Parameter 1.5 is halfway along the second segment
/// let (point, segment) = polyline.eval_point_seg(1.5);
/// assert_eq!(segment, 1);
/// assert!((point.y - 0.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline3d {
    /// Degree-1 knot vector, `vertices.len() + 2` entries.
    knots: KnotVector,
    /// The vertices (control points).
    vertices: Vec<Point3<f64>>,
}

impl Polyline3d {
    /// Create a new polyline from vertices.
    ///
    /// # Panics
    ///
    /// Panics if fewer than 2 vertices are provided. Use
    /// [`Polyline3d::try_new`] to get an error instead.
    #[must_use]
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        assert!(vertices.len() >= 2, "Polyline3d requires at least 2 vertices");
        Self {
            knots: vertex_index_knots(vertices.len()),
            vertices,
        }
    }

    /// Try to create a new polyline, returning an error if invalid.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientPoints`] if fewer than 2 vertices.
    pub fn try_new(vertices: Vec<Point3<f64>>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(GeometryError::insufficient_points(2, vertices.len()));
        }
        Ok(Self {
            knots: vertex_index_knots(vertices.len()),
            vertices,
        })
    }

    /// Create a polyline with an explicit degree-1 knot vector.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 vertices are given, the knot count is
    /// not `vertices.len() + 2`, or the knots decrease.
    pub fn from_knots_and_points(knots: KnotVector, vertices: Vec<Point3<f64>>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(GeometryError::insufficient_points(2, vertices.len()));
        }
        if knots.len() != vertices.len() + 2 {
            return Err(GeometryError::invalid_knot_vector(format!(
                "expected {} knots for {} vertices, got {}",
                vertices.len() + 2,
                vertices.len(),
                knots.len()
            )));
        }
        if !knots.is_monotonic() {
            return Err(GeometryError::invalid_knot_vector("knots are not non-decreasing"));
        }
        Ok(Self { knots, vertices })
    }

    /// Tessellate any spline into a polyline.
    ///
    /// Each knot interval is bisected until the curve midpoint of every
    /// sub-interval lies within `approx_eps` of its chord. The resulting
    /// vertices keep the source curve's parameters as knots.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `approx_eps` is not a
    /// positive finite number.
    pub fn from_curve<S: SplineEntity + ?Sized>(curve: &S, approx_eps: f64) -> Result<Self> {
        if !(approx_eps.is_finite() && approx_eps > 0.0) {
            return Err(GeometryError::invalid_input(format!(
                "approximation tolerance {approx_eps} must be positive"
            )));
        }

        let start = curve.start_param();
        let end = curve.end_param();
        let (values, _) = curve.knots().distinct_knots();
        let mut breaks: Vec<f64> = values
            .into_iter()
            .filter(|&k| k > start && k < end)
            .collect();
        breaks.insert(0, start);
        breaks.push(end);

        let mut params = vec![start];
        let mut vertices = vec![curve.eval_point(start)];
        for w in breaks.windows(2) {
            let a = vertices[vertices.len() - 1];
            let b = curve.eval_point(w[1]);
            subdivide(
                curve,
                w[0],
                w[1],
                &a,
                &b,
                approx_eps,
                MAX_SUBDIVISION_DEPTH,
                &mut params,
                &mut vertices,
            );
            params.push(w[1]);
            vertices.push(b);
        }

        debug!(
            segments = vertices.len() - 1,
            approx_eps, "Tessellated spline into polyline"
        );

        let mut knots = Vec::with_capacity(params.len() + 2);
        knots.push(start);
        knots.extend_from_slice(&params);
        knots.push(end);
        Self::from_knots_and_points(KnotVector::from_knots(knots), vertices)
    }

    /// Get the vertices of the polyline.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Fit points of the polyline: its vertices.
    #[must_use]
    pub fn fit_points(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Get the number of segments (edges).
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Get a segment as a pair of points.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<(Point3<f64>, Point3<f64>)> {
        if index < self.num_segments() {
            Some((self.vertices[index], self.vertices[index + 1]))
        } else {
            None
        }
    }

    /// Get the length of a specific segment.
    #[must_use]
    pub fn segment_length(&self, index: usize) -> Option<f64> {
        self.segment(index).map(|(a, b)| (b - a).norm())
    }

    /// Evaluate the point at `param` and report the segment it lies on.
    ///
    /// Parameters outside the domain are clamped. A parameter exactly on an
    /// interior vertex reports the segment that starts there; the domain
    /// end reports the last segment.
    #[must_use]
    pub fn eval_point_seg(&self, param: f64) -> (Point3<f64>, usize) {
        let n = self.vertices.len();
        let u = param.clamp(self.start_param(), self.end_param());
        let span = find_span(self.knots.as_slice(), 1, n, u);
        let segment = span - 1;

        let k0 = self.knots[span];
        let k1 = self.knots[span + 1];
        let t = if k1 > k0 { (u - k0) / (k1 - k0) } else { 0.0 };

        let p0 = self.vertices[segment];
        let p1 = self.vertices[segment + 1];
        (p0 + (p1 - p0) * t, segment)
    }

    /// Append a vertex one parameter unit past the current end.
    pub fn push_vertex(&mut self, vertex: Point3<f64>) {
        let end = self.end_param();
        let mut knots = self.knots.as_slice().to_vec();
        knots.pop();
        knots.extend([end + 1.0, end + 1.0]);
        self.knots = KnotVector::from_knots_with_tolerance(knots, self.knots.tolerance());
        self.vertices.push(vertex);
    }

    /// Create a reversed copy of this polyline.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        let mut knots = self.knots.clone();
        knots.reverse();
        Self { knots, vertices }
    }

    /// Slope of segment `index` in parameter space.
    fn segment_derivative(&self, index: usize) -> Vector3<f64> {
        let dk = self.knots[index + 2] - self.knots[index + 1];
        if dk > 0.0 {
            (self.vertices[index + 1] - self.vertices[index]) / dk
        } else {
            Vector3::zeros()
        }
    }
}

impl SplineEntity for Polyline3d {
    fn degree(&self) -> usize {
        1
    }

    fn knots(&self) -> &KnotVector {
        &self.knots
    }

    fn control_points(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn set_control_point_at(&mut self, index: usize, point: Point3<f64>) -> Result<()> {
        let len = self.vertices.len();
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or_else(|| GeometryError::invalid_index(index, len))?;
        *slot = point;
        Ok(())
    }

    fn is_rational(&self) -> bool {
        false
    }

    fn is_periodic(&self) -> bool {
        false
    }

    fn start_param(&self) -> f64 {
        self.knots[1]
    }

    fn end_param(&self) -> f64 {
        self.knots[self.knots.len() - 2]
    }

    fn eval_point(&self, param: f64) -> Point3<f64> {
        self.eval_point_seg(param).0
    }

    fn eval_derivatives(&self, param: f64, n: usize) -> Vec<Vector3<f64>> {
        let (point, segment) = self.eval_point_seg(param);
        let mut ders = Vec::with_capacity(n + 1);
        ders.push(point.coords);
        if n >= 1 {
            ders.push(self.segment_derivative(segment));
        }
        ders.resize(n + 1, Vector3::zeros());
        ders
    }

    fn has_fit_data(&self) -> bool {
        true
    }

    fn continuity_at_knot(&self, index: usize, tol: &Tolerance) -> Result<usize> {
        self.knots.try_at(index)?;
        // Knot j (2 <= j <= n - 1) joins segments j - 2 and j - 1.
        if index < 2 || index + 2 >= self.knots.len() {
            return Ok(0);
        }
        let left = self.segment_derivative(index - 2);
        let right = self.segment_derivative(index - 1);
        Ok(usize::from(tol.vectors_equal(&left, &right)))
    }
}

/// Knots `[0, 0, 1, …, n-1, n-1]` for `n` vertices.
fn vertex_index_knots(n: usize) -> KnotVector {
    let mut knots = Vec::with_capacity(n + 2);
    knots.push(0.0);
    knots.extend((0..n).map(|i| i as f64));
    knots.push((n - 1) as f64);
    KnotVector::from_knots(knots)
}

/// Bisect `[a, b]` until every midpoint is within `eps` of its chord,
/// pushing interior samples in parameter order.
#[allow(clippy::too_many_arguments)]
fn subdivide<S: SplineEntity + ?Sized>(
    curve: &S,
    a: f64,
    b: f64,
    pa: &Point3<f64>,
    pb: &Point3<f64>,
    eps: f64,
    depth: usize,
    params: &mut Vec<f64>,
    vertices: &mut Vec<Point3<f64>>,
) {
    let mid = (a + b) / 2.0;
    let pm = curve.eval_point(mid);
    let chord = pb - pa;
    let offset = pm - pa;
    let len_sq = chord.norm_squared();
    let deviation = if len_sq > 0.0 {
        (offset - chord * (offset.dot(&chord) / len_sq)).norm()
    } else {
        offset.norm()
    };

    // Always split once so a symmetric curve can't hide its bulge behind
    // a midpoint that happens to sit on the chord.
    let must_split = depth == MAX_SUBDIVISION_DEPTH && curve.degree() > 1;
    if depth == 0 || (deviation <= eps && !must_split) {
        return;
    }

    subdivide(curve, a, mid, pa, &pm, eps, depth - 1, params, vertices);
    params.push(mid);
    vertices.push(pm);
    subdivide(curve, mid, b, &pm, pb, eps, depth - 1, params, vertices);
}
