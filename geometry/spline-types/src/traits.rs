//! The common spline contract.
//!
//! [`SplineEntity`] is implemented by every curve in this crate that carries
//! a knot vector and control polygon. The required methods expose structure
//! and evaluation; everything else (indexed access, endpoints, arc length,
//! sampling, bounding boxes) is provided on top of them.

use crate::{GeometryError, KnotVector, Result, Tolerance};
use nalgebra::{Point3, Vector3};

/// A parametric spline curve in 3D space.
///
/// Unlike a normalized curve, a spline is evaluated in its own knot
/// parameterization: valid parameters lie in
/// `[start_param(), end_param()]`.
///
/// # Implementors
///
/// - [`Polyline3d`](crate::Polyline3d) - Degree-1 spline through its vertices
/// - [`NurbsCurve`](crate::NurbsCurve) - Rational B-spline with optional fit data
pub trait SplineEntity {
    /// Polynomial degree.
    fn degree(&self) -> usize;

    /// The knot vector.
    fn knots(&self) -> &KnotVector;

    /// The control points.
    fn control_points(&self) -> &[Point3<f64>];

    /// Replace the control point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index` is out of range.
    fn set_control_point_at(&mut self, index: usize, point: Point3<f64>) -> Result<()>;

    /// Whether the curve carries weights.
    fn is_rational(&self) -> bool;

    /// Whether the knot and control structure wraps around.
    fn is_periodic(&self) -> bool;

    /// Start of the parameter domain.
    fn start_param(&self) -> f64;

    /// End of the parameter domain.
    fn end_param(&self) -> f64;

    /// Evaluate the curve position at `param`.
    ///
    /// Parameters outside the domain are clamped to it.
    fn eval_point(&self, param: f64) -> Point3<f64>;

    /// Evaluate the point and derivatives up to order `n` at `param`.
    ///
    /// Element `k` of the result is the `k`-th derivative; element 0 is the
    /// point itself as a position vector.
    fn eval_derivatives(&self, param: f64, n: usize) -> Vec<Vector3<f64>>;

    /// Whether fit (interpolation) points are available.
    fn has_fit_data(&self) -> bool;

    /// Parametric continuity order at the knot with the given index.
    ///
    /// Returns the largest `k` such that the one-sided derivatives of
    /// orders `0..=k` agree within `tol.equal_vector`. The ends of an open
    /// curve report 0.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index >= num_knots()`.
    fn continuity_at_knot(&self, index: usize, tol: &Tolerance) -> Result<usize>;

    /// Order of the spline (degree + 1).
    fn order(&self) -> usize {
        self.degree() + 1
    }

    /// Number of raw knots.
    fn num_knots(&self) -> usize {
        self.knots().len()
    }

    /// Knot value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index` is out of range.
    fn knot_at(&self, index: usize) -> Result<f64> {
        self.knots().try_at(index)
    }

    /// Number of control points.
    fn num_control_points(&self) -> usize {
        self.control_points().len()
    }

    /// Control point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index` is out of range.
    fn control_point_at(&self, index: usize) -> Result<Point3<f64>> {
        let points = self.control_points();
        points
            .get(index)
            .copied()
            .ok_or_else(|| GeometryError::invalid_index(index, points.len()))
    }

    /// Point at the start of the domain.
    fn start_point(&self) -> Point3<f64> {
        self.eval_point(self.start_param())
    }

    /// Point at the end of the domain.
    fn end_point(&self) -> Point3<f64> {
        self.eval_point(self.end_param())
    }

    /// First derivative at `param`.
    fn derivative_at(&self, param: f64) -> Vector3<f64> {
        self.eval_derivatives(param, 1)
            .get(1)
            .copied()
            .unwrap_or_else(Vector3::zeros)
    }

    /// Check whether the start and end points coincide within `tol`.
    fn is_closed_within(&self, tol: &Tolerance) -> bool {
        tol.points_equal(&self.start_point(), &self.end_point())
    }

    /// Check whether the start and end points coincide within the default tolerance.
    fn is_closed(&self) -> bool {
        self.is_closed_within(&Tolerance::default())
    }

    /// Total arc length over the domain.
    fn length(&self) -> f64 {
        self.length_between(self.start_param(), self.end_param())
    }

    /// Arc length between two parameters.
    ///
    /// Integrates the speed with adaptive Simpson's rule, one knot interval
    /// at a time so derivative discontinuities at knots don't stall the
    /// refinement. The order of `from` and `to` does not matter.
    fn length_between(&self, from: f64, to: f64) -> f64 {
        let (a, b) = if from < to { (from, to) } else { (to, from) };
        let a = a.max(self.start_param());
        let b = b.min(self.end_param());
        if b <= a {
            return 0.0;
        }

        let mut breaks = vec![a];
        let (values, _) = self.knots().distinct_knots();
        breaks.extend(values.into_iter().filter(|&k| k > a && k < b));
        breaks.push(b);

        breaks
            .windows(2)
            .map(|w| adaptive_arc_length(self, w[0], w[1], 1e-10, 20))
            .sum()
    }

    /// Sample the curve at `n` uniform parameter steps over the domain.
    fn sample_uniform(&self, n: usize) -> Vec<Point3<f64>> {
        let n = n.max(2);
        let start = self.start_param();
        let span = self.end_param() - start;
        (0..n)
            .map(|i| self.eval_point(start + span * i as f64 / (n - 1) as f64))
            .collect()
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    ///
    /// Each knot span contributes its end points and the points where a
    /// coordinate derivative changes sign, located by bisection, so the box
    /// encloses the curve and touches it on every side.
    fn extents(&self) -> (Point3<f64>, Point3<f64>) {
        const BRACKETS_PER_SPAN: usize = 16;
        const BISECTIONS: usize = 60;

        let (values, _) = self.knots().distinct_knots();
        let start = self.start_param();
        let end = self.end_param();
        let mut breaks: Vec<f64> = values
            .into_iter()
            .filter(|&k| k > start && k < end)
            .collect();
        breaks.insert(0, start);
        breaks.push(end);

        let first = self.eval_point(start);
        let mut min = first;
        let mut max = first;
        let mut include = |p: Point3<f64>| {
            min = min.inf(&p);
            max = max.sup(&p);
        };

        for w in breaks.windows(2) {
            include(self.eval_point(w[1]));
            if self.degree() <= 1 {
                continue;
            }
            // Stay inside the span so one-sided derivatives at knots agree.
            let inset = (w[1] - w[0]) * 1e-9;
            let (a, b) = (w[0] + inset, w[1] - inset);
            let at = |i: usize| a + (b - a) * i as f64 / BRACKETS_PER_SPAN as f64;
            let mut prev = self.derivative_at(a);
            for i in 1..=BRACKETS_PER_SPAN {
                let next = self.derivative_at(at(i));
                include(self.eval_point(at(i)));
                for axis in 0..3 {
                    if prev[axis] * next[axis] >= 0.0 {
                        continue;
                    }
                    let (mut lo, mut hi) = (at(i - 1), at(i));
                    let lo_sign = prev[axis].signum();
                    for _ in 0..BISECTIONS {
                        let mid = 0.5 * (lo + hi);
                        if self.derivative_at(mid)[axis].signum() == lo_sign {
                            lo = mid;
                        } else {
                            hi = mid;
                        }
                    }
                    include(self.eval_point(0.5 * (lo + hi)));
                }
                prev = next;
            }
        }

        (min, max)
    }
}

/// Adaptive Simpson's rule for arc length integration.
fn adaptive_arc_length<S: SplineEntity + ?Sized>(
    curve: &S,
    a: f64,
    b: f64,
    tolerance: f64,
    max_depth: usize,
) -> f64 {
    fn simpson_step<S: SplineEntity + ?Sized>(curve: &S, a: f64, b: f64) -> f64 {
        let mid = (a + b) / 2.0;
        let h = (b - a) / 6.0;

        let fa = curve.derivative_at(a).norm();
        let fm = curve.derivative_at(mid).norm();
        let fb = curve.derivative_at(b).norm();

        h * (fa + 4.0 * fm + fb)
    }

    fn adaptive_helper<S: SplineEntity + ?Sized>(
        curve: &S,
        a: f64,
        b: f64,
        tolerance: f64,
        whole: f64,
        depth: usize,
    ) -> f64 {
        let mid = (a + b) / 2.0;
        let left = simpson_step(curve, a, mid);
        let right = simpson_step(curve, mid, b);
        let combined = left + right;

        if depth == 0 || (combined - whole).abs() < 15.0 * tolerance {
            combined + (combined - whole) / 15.0
        } else {
            let new_tol = tolerance / 2.0;
            adaptive_helper(curve, a, mid, new_tol, left, depth - 1)
                + adaptive_helper(curve, mid, b, new_tol, right, depth - 1)
        }
    }

    let whole = simpson_step(curve, a, b);
    adaptive_helper(curve, a, b, tolerance, whole, max_depth)
}
