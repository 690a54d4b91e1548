//! Non-uniform rational B-spline (NURBS) curves.
//!
//! A [`NurbsCurve`] can be built from raw control data, from fit points
//! (interpolation), from an elliptical arc or from a line segment. Structural
//! edits (knot insertion, degree elevation, trimming, joining, closing and
//! periodicity changes) keep the curve shape intact; see the `edit` module.

mod convert;
mod edit;
mod fit;
mod homogeneous;

pub use fit::{BUILT_FIT_RELATIVE_TOLERANCE, FitData, KnotParameterization, MAX_BUILT_FIT_POINTS};

use crate::basis::{
    basis_derivatives, basis_functions, find_span, find_span_with_hint, rational_derivatives,
};
use crate::{GeometryError, KnotVector, Result, SplineEntity, Tolerance};
use homogeneous::unwrap_periodic;
use nalgebra::{Point3, Vector3, Vector4};
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest degree accepted by the constructors.
pub const MAX_DEGREE: usize = 25;

/// A non-uniform rational B-spline curve in 3D.
///
/// ```text
/// C(u) = Σ N_i,p(u) * w_i * P_i / Σ N_i,p(u) * w_i
/// ```
///
/// # Layout
///
/// - **Non-periodic**: `knots.len() == control_points.len() + degree + 1`,
///   domain `[knots[p], knots[n]]`.
/// - **Periodic**: `knots.len() == control_points.len()`; the last control
///   point (and weight) duplicates the first and one period spans
///   `[knots[0], knots[n - 1]]`.
/// - **Rational**: one positive weight per control point. Non-rational
///   curves store no weights and behave as if every weight were 1.
///
/// # Example
///
/// ```
/// use spline_types::{KnotVector, NurbsCurve, SplineEntity};
/// use nalgebra::Point3;
///
/// let curve = NurbsCurve::non_rational(
///     3,
///     KnotVector::from_knots(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 2.0, 0.0),
///         Point3::new(3.0, 2.0, 0.0),
///         Point3::new(4.0, 0.0, 0.0),
///     ],
///     false,
/// )
/// .unwrap();
///
/// let mid = curve.eval_point(0.5);
/// assert!((mid.x - 2.0).abs() < 1e-12);
/// assert!((mid.y - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NurbsCurve {
    degree: usize,
    knots: KnotVector,
    control_points: Vec<Point3<f64>>,
    weights: Option<Vec<f64>>,
    periodic: bool,
    fit: Option<FitData>,
    tolerance: Tolerance,
}

/// Snapshot of a curve's defining data.
///
/// `weights` is empty for non-rational curves.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NurbsDefinition {
    /// Polynomial degree.
    pub degree: usize,
    /// Whether the curve carries weights.
    pub rational: bool,
    /// Whether the knot/control structure wraps around.
    pub periodic: bool,
    /// Knot vector.
    pub knots: KnotVector,
    /// Control points.
    pub control_points: Vec<Point3<f64>>,
    /// Weights, one per control point when rational.
    pub weights: Vec<f64>,
}

impl NurbsCurve {
    /// Create a rational curve from raw data.
    ///
    /// # Errors
    ///
    /// Returns an error if the degree is 0 or above [`MAX_DEGREE`], the knot
    /// count does not match the control point count for the chosen layout,
    /// knots decrease, the weight count differs from the point count, any
    /// weight is not positive, or a periodic curve's first and last control
    /// point (or weight) differ.
    pub fn new(
        degree: usize,
        knots: KnotVector,
        control_points: Vec<Point3<f64>>,
        weights: Vec<f64>,
        periodic: bool,
    ) -> Result<Self> {
        Self::from_parts(degree, knots, control_points, Some(weights), periodic)
    }

    /// Create a non-rational curve from raw data.
    ///
    /// # Errors
    ///
    /// Same as [`NurbsCurve::new`], minus the weight checks.
    pub fn non_rational(
        degree: usize,
        knots: KnotVector,
        control_points: Vec<Point3<f64>>,
        periodic: bool,
    ) -> Result<Self> {
        Self::from_parts(degree, knots, control_points, None, periodic)
    }

    /// Rebuild a curve from a [`NurbsDefinition`] snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`NurbsCurve::new`].
    pub fn from_definition(definition: NurbsDefinition) -> Result<Self> {
        let weights = definition.rational.then_some(definition.weights);
        Self::from_parts(
            definition.degree,
            definition.knots,
            definition.control_points,
            weights,
            definition.periodic,
        )
    }

    pub(crate) fn from_parts(
        degree: usize,
        knots: KnotVector,
        control_points: Vec<Point3<f64>>,
        weights: Option<Vec<f64>>,
        periodic: bool,
    ) -> Result<Self> {
        let tolerance = Tolerance::default();
        validate(degree, &knots, &control_points, weights.as_deref(), periodic, &tolerance)?;
        Ok(Self {
            degree,
            knots,
            control_points,
            weights,
            periodic,
            fit: None,
            tolerance,
        })
    }

    /// Set the comparison tolerance used for closure and join checks.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The comparison tolerance.
    #[must_use]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Set the comparison tolerance.
    pub fn set_tolerance(&mut self, tolerance: Tolerance) {
        self.tolerance = tolerance;
    }

    /// The weights, if rational.
    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Number of stored weights (0 for a non-rational curve).
    #[must_use]
    pub fn num_weights(&self) -> usize {
        self.weights.as_ref().map_or(0, Vec::len)
    }

    /// Weight of the control point at `index` (1 for a non-rational curve).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index` is out of range.
    pub fn weight_at(&self, index: usize) -> Result<f64> {
        if index >= self.control_points.len() {
            return Err(GeometryError::invalid_index(index, self.control_points.len()));
        }
        Ok(self.weights.as_ref().map_or(1.0, |w| w[index]))
    }

    /// Set the weight at `index`, making the curve rational if needed.
    ///
    /// On a periodic curve the wrap duplicate is updated too. Fit data is
    /// purged.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] for a bad index and
    /// [`GeometryError::InvalidWeight`] for a non-positive weight.
    pub fn set_weight_at(&mut self, index: usize, weight: f64) -> Result<()> {
        let n = self.control_points.len();
        if index >= n {
            return Err(GeometryError::invalid_index(index, n));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(GeometryError::InvalidWeight {
                index,
                value: weight,
            });
        }
        let weights = self.weights.get_or_insert_with(|| vec![1.0; n]);
        weights[index] = weight;
        if self.periodic {
            if let Some(twin) = periodic_twin(index, n) {
                weights[twin] = weight;
            }
        }
        self.fit = None;
        Ok(())
    }

    /// Evaluate a point, starting the span search at `hint`.
    ///
    /// `hint` is updated to the span used, so evaluating an increasing
    /// sequence of parameters skips most searches. Any hint value gives a
    /// correct result.
    pub fn eval_point_with_hint(&self, param: f64, hint: &mut usize) -> Point3<f64> {
        let form = self.eval_form();
        let u = form.clamp(param);
        let span = find_span_with_hint(&form.knots, self.degree, form.num_ctrl(), u, *hint);
        *hint = span;
        let h = form.homogeneous_point(span, u);
        Point3::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    /// Evaluate the undivided numerator `Σ N·w·P` and denominator `Σ N·w`.
    ///
    /// For a non-rational curve the denominator is 1.
    #[must_use]
    pub fn eval_point_divider(&self, param: f64) -> (Vector3<f64>, f64) {
        let form = self.eval_form();
        let u = form.clamp(param);
        let span = find_span(&form.knots, self.degree, form.num_ctrl(), u);
        let h = form.homogeneous_point(span, u);
        (h.xyz(), h.w)
    }

    /// Snapshot of the defining data.
    #[must_use]
    pub fn definition_data(&self) -> NurbsDefinition {
        NurbsDefinition {
            degree: self.degree,
            rational: self.weights.is_some(),
            periodic: self.periodic,
            knots: self.knots.clone(),
            control_points: self.control_points.clone(),
            weights: self.weights.clone().unwrap_or_default(),
        }
    }

    /// Non-periodic view used by every evaluator.
    fn eval_form(&self) -> EvalForm<'_> {
        if self.periodic {
            let (knots, points) =
                unwrap_periodic(self.degree, self.knots.as_slice(), &self.control_points, 0);
            let weights = self
                .weights
                .as_ref()
                .map(|w| Cow::Owned(unwrap_periodic(self.degree, self.knots.as_slice(), w, 0).1));
            EvalForm {
                degree: self.degree,
                knots: Cow::Owned(knots),
                points: Cow::Owned(points),
                weights,
            }
        } else {
            EvalForm {
                degree: self.degree,
                knots: Cow::Borrowed(self.knots.as_slice()),
                points: Cow::Borrowed(&self.control_points),
                weights: self.weights.as_deref().map(Cow::Borrowed),
            }
        }
    }

    /// Derivatives up to `n` from the left (`from_left`) or right of `u`.
    fn one_sided_derivatives(&self, u: f64, n: usize, from_left: bool) -> Vec<Vector3<f64>> {
        let form = self.eval_form();
        let u = form.clamp(u);
        let span = if from_left {
            form.left_span(u)
        } else {
            find_span(&form.knots, self.degree, form.num_ctrl(), u)
        };
        rational_derivatives(&form.homogeneous_derivatives(span, u, n))
    }
}

impl SplineEntity for NurbsCurve {
    fn degree(&self) -> usize {
        self.degree
    }

    fn knots(&self) -> &KnotVector {
        &self.knots
    }

    fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    fn set_control_point_at(&mut self, index: usize, point: Point3<f64>) -> Result<()> {
        let n = self.control_points.len();
        if index >= n {
            return Err(GeometryError::invalid_index(index, n));
        }
        self.control_points[index] = point;
        if self.periodic {
            if let Some(twin) = periodic_twin(index, n) {
                self.control_points[twin] = point;
            }
        }
        self.fit = None;
        Ok(())
    }

    fn is_rational(&self) -> bool {
        self.weights.is_some()
    }

    fn is_periodic(&self) -> bool {
        self.periodic
    }

    fn start_param(&self) -> f64 {
        if self.periodic {
            self.knots[0]
        } else {
            self.knots[self.degree]
        }
    }

    fn end_param(&self) -> f64 {
        if self.periodic {
            self.knots[self.knots.len() - 1]
        } else {
            self.knots[self.control_points.len()]
        }
    }

    fn eval_point(&self, param: f64) -> Point3<f64> {
        let form = self.eval_form();
        let u = form.clamp(param);
        let span = find_span(&form.knots, self.degree, form.num_ctrl(), u);
        let h = form.homogeneous_point(span, u);
        Point3::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    fn eval_derivatives(&self, param: f64, n: usize) -> Vec<Vector3<f64>> {
        self.one_sided_derivatives(param, n, false)
    }

    fn has_fit_data(&self) -> bool {
        self.fit.is_some()
    }

    fn continuity_at_knot(&self, index: usize, tol: &Tolerance) -> Result<usize> {
        let knot = self.knots.try_at(index)?;
        let start = self.start_param();
        let end = self.end_param();
        let ktol = self.knots.tolerance();
        let at_start = knot <= start + ktol;
        let at_end = knot >= end - ktol;

        let (left_u, right_u) = match (at_start || at_end, self.periodic) {
            (false, _) => (knot, knot),
            (true, true) => (end, start),
            (true, false) => return Ok(0),
        };

        let p = self.degree;
        let left = self.one_sided_derivatives(left_u, p, true);
        let right = self.one_sided_derivatives(right_u, p, false);

        let mut continuity = 0;
        for (k, (l, r)) in left.iter().zip(&right).enumerate() {
            let limit = if k == 0 { tol.equal_point } else { tol.equal_vector };
            let scale = l.norm().max(r.norm()).max(1.0);
            if (l - r).norm() > limit * scale {
                break;
            }
            continuity = k;
        }
        Ok(continuity)
    }
}

/// Borrowed or unwrapped non-periodic evaluation data.
struct EvalForm<'a> {
    degree: usize,
    knots: Cow<'a, [f64]>,
    points: Cow<'a, [Point3<f64>]>,
    weights: Option<Cow<'a, [f64]>>,
}

impl EvalForm<'_> {
    fn num_ctrl(&self) -> usize {
        self.points.len()
    }

    fn clamp(&self, u: f64) -> f64 {
        u.clamp(self.knots[self.degree], self.knots[self.num_ctrl()])
    }

    /// Span whose right end is `u`, for left-hand limits at a knot.
    fn left_span(&self, u: f64) -> usize {
        let p = self.degree;
        let below = self.knots.partition_point(|&k| k < u);
        below.saturating_sub(1).clamp(p, self.num_ctrl() - 1)
    }

    /// Homogeneous point `(Σ N·w·P, Σ N·w)`.
    fn homogeneous_point(&self, span: usize, u: f64) -> Vector4<f64> {
        let p = self.degree;
        let basis = basis_functions(&self.knots, span, p, u);
        let mut h = Vector4::zeros();
        for (j, n) in basis.iter().enumerate() {
            let idx = span - p + j;
            let w = self.weights.as_ref().map_or(1.0, |w| w[idx]);
            let pt = self.points[idx];
            h += Vector4::new(pt.x * w, pt.y * w, pt.z * w, w) * *n;
        }
        h
    }

    /// Derivatives of the homogeneous curve `(w·C, w)` up to order `n`.
    fn homogeneous_derivatives(&self, span: usize, u: f64, n: usize) -> Vec<Vector4<f64>> {
        let p = self.degree;
        let basis = basis_derivatives(&self.knots, span, p, u, n);
        let mut ders = vec![Vector4::zeros(); n + 1];
        for j in 0..=p {
            let idx = span - p + j;
            let w = self.weights.as_ref().map_or(1.0, |w| w[idx]);
            let pt = self.points[idx];
            let lifted = Vector4::new(pt.x * w, pt.y * w, pt.z * w, w);
            for (k, der) in ders.iter_mut().enumerate() {
                *der += lifted * basis[k][j];
            }
        }
        ders
    }
}

/// Index of the wrap duplicate paired with `index` in a periodic array.
fn periodic_twin(index: usize, n: usize) -> Option<usize> {
    if index == 0 {
        Some(n - 1)
    } else if index == n - 1 {
        Some(0)
    } else {
        None
    }
}

/// Check the structural relationships between degree, knots, points and
/// weights.
fn validate(
    degree: usize,
    knots: &KnotVector,
    points: &[Point3<f64>],
    weights: Option<&[f64]>,
    periodic: bool,
    tol: &Tolerance,
) -> Result<()> {
    if degree == 0 || degree > MAX_DEGREE {
        return Err(GeometryError::InvalidDegree {
            degree,
            min: 1,
            max: MAX_DEGREE,
        });
    }

    let n = points.len();
    let required = (degree + 1).max(2);
    if n < required {
        return Err(GeometryError::insufficient_points(required, n));
    }

    let expected = if periodic { n } else { n + degree + 1 };
    if knots.len() != expected {
        return Err(GeometryError::invalid_knot_vector(format!(
            "expected {expected} knots for {n} control points of degree {degree}{}, got {}",
            if periodic { " (periodic)" } else { "" },
            knots.len()
        )));
    }
    if let Some(i) = knots.as_slice().windows(2).position(|w| w[1] < w[0]) {
        return Err(GeometryError::invalid_knot_vector(format!(
            "knot vector is not non-decreasing at index {}",
            i + 1
        )));
    }
    let (lo, hi) = if periodic {
        (knots[0], knots[n - 1])
    } else {
        (knots[degree], knots[n])
    };
    if hi <= lo {
        return Err(GeometryError::invalid_knot_vector(format!(
            "empty parameter domain [{lo}, {hi}]"
        )));
    }

    if let Some(weights) = weights {
        if weights.len() != n {
            return Err(GeometryError::invalid_input(format!(
                "{} weights for {n} control points",
                weights.len()
            )));
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w > 0.0))
        {
            return Err(GeometryError::InvalidWeight { index, value });
        }
    }

    if periodic {
        if !tol.points_equal(&points[0], &points[n - 1]) {
            return Err(GeometryError::invalid_input(
                "periodic curve must repeat its first control point at the end",
            ));
        }
        if let Some(w) = weights {
            if (w[0] - w[n - 1]).abs() > tol.equal_point * w[0].max(1.0) {
                return Err(GeometryError::invalid_input(
                    "periodic curve must repeat its first weight at the end",
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn bezier() -> NurbsCurve {
        NurbsCurve::non_rational(
            3,
            KnotVector::from_knots(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
            false,
        )
        .unwrap()
    }

    fn quarter_circle() -> NurbsCurve {
        NurbsCurve::new(
            2,
            KnotVector::from_knots(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![1.0, FRAC_1_SQRT_2, 1.0],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoints_and_domain() {
        let curve = bezier();
        assert_relative_eq!(curve.start_param(), 0.0);
        assert_relative_eq!(curve.end_param(), 1.0);
        assert_relative_eq!(curve.start_point().coords, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(curve.end_point().coords, Vector3::new(4.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(!curve.is_rational());
        assert!(!curve.has_fit_data());
    }

    #[test]
    fn test_rational_circle_points() {
        let curve = quarter_circle();
        for i in 0..=20 {
            let p = curve.eval_point(f64::from(i) / 20.0);
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
        }
        let (num, den) = curve.eval_point_divider(0.5);
        let p = curve.eval_point(0.5);
        assert_relative_eq!(num / den, p.coords, epsilon = 1e-12);
        assert!(den < 1.0);
    }

    #[test]
    fn test_derivatives_against_finite_difference() {
        let curve = quarter_circle();
        let h = 1e-6;
        let ders = curve.eval_derivatives(0.3, 2);
        let fd = (curve.eval_point(0.3 + h) - curve.eval_point(0.3 - h)) / (2.0 * h);
        assert_relative_eq!(ders[1], fd, epsilon = 1e-6);
        // Circle: velocity is perpendicular to position.
        assert_relative_eq!(ders[0].dot(&ders[1]), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_hint_evaluation_matches() {
        let curve = NurbsCurve::non_rational(
            2,
            KnotVector::from_knots(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0]),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
            false,
        )
        .unwrap();
        let mut hint = 0;
        for i in 0..=30 {
            let u = f64::from(i) / 10.0;
            assert_relative_eq!(
                curve.eval_point_with_hint(u, &mut hint).coords,
                curve.eval_point(u).coords,
                epsilon = 1e-14
            );
        }
        assert_eq!(hint, 4);
    }

    #[test]
    fn test_validation() {
        let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];

        let err = NurbsCurve::non_rational(0, KnotVector::from_knots(vec![0.0, 1.0]), points.clone(), false)
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidDegree { degree: 0, .. }));

        let err = NurbsCurve::non_rational(
            1,
            KnotVector::from_knots(vec![0.0, 0.0, 1.0]),
            points.clone(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidKnotVector { .. }));

        let err = NurbsCurve::non_rational(
            1,
            KnotVector::from_knots(vec![0.0, 1.0, 0.5, 1.0]),
            points.clone(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidKnotVector { .. }));

        let err = NurbsCurve::new(
            1,
            KnotVector::from_knots(vec![0.0, 0.0, 1.0, 1.0]),
            points.clone(),
            vec![1.0, -2.0],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidWeight { index: 1, .. }));

        let err = NurbsCurve::non_rational(
            1,
            KnotVector::from_knots(vec![0.0, 1.0]),
            points,
            true,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_weight_access() {
        let mut curve = bezier();
        assert_eq!(curve.num_weights(), 0);
        assert_relative_eq!(curve.weight_at(2).unwrap(), 1.0);
        assert!(curve.weight_at(4).unwrap_err().is_invalid_index());

        curve.set_weight_at(1, 2.0).unwrap();
        assert!(curve.is_rational());
        assert_eq!(curve.num_weights(), 4);
        assert!(matches!(
            curve.set_weight_at(1, 0.0),
            Err(GeometryError::InvalidWeight { .. })
        ));
        assert_relative_eq!(curve.weight_at(1).unwrap(), 2.0);
    }

    #[test]
    fn test_periodic_evaluation_is_closed_and_smooth() {
        // Uniform periodic cubic over a square control polygon.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let curve = NurbsCurve::non_rational(
            3,
            KnotVector::from_knots(vec![0.0, 1.0, 2.0, 3.0, 4.0]),
            points,
            true,
        )
        .unwrap();

        assert!(curve.is_periodic());
        assert!(curve.is_closed());
        let start = curve.eval_derivatives(0.0, 2);
        let end = curve.eval_derivatives(4.0, 2);
        assert_relative_eq!(start[1], end[1], epsilon = 1e-12);
        assert_relative_eq!(start[2], end[2], epsilon = 1e-12);

        let tol = Tolerance::default();
        assert_eq!(curve.continuity_at_knot(0, &tol).unwrap(), 2);
        assert_eq!(curve.continuity_at_knot(2, &tol).unwrap(), 2);
    }

    #[test]
    fn test_continuity_at_double_knot() {
        let curve = NurbsCurve::non_rational(
            2,
            KnotVector::from_knots(vec![0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 2.0]),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
            false,
        )
        .unwrap();
        let tol = Tolerance::default();
        assert_eq!(curve.continuity_at_knot(3, &tol).unwrap(), 0);
        assert_eq!(curve.continuity_at_knot(0, &tol).unwrap(), 0);
        assert!(curve.continuity_at_knot(8, &tol).unwrap_err().is_invalid_index());
    }

    #[test]
    fn test_definition_round_trip() {
        let curve = quarter_circle();
        let definition = curve.definition_data();
        assert!(definition.rational);
        assert_eq!(definition.weights.len(), 3);
        let rebuilt = NurbsCurve::from_definition(definition).unwrap();
        assert_eq!(rebuilt, curve);
    }

    #[test]
    fn test_extents_reach_extremum_between_samples() {
        // y = 9t(1 - t)^2 peaks at t = 1/3.
        let lopsided = NurbsCurve::non_rational(
            3,
            KnotVector::from_knots(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 3.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            false,
        )
        .unwrap();
        let (min, max) = lopsided.extents();
        assert_relative_eq!(max.y, 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(min.coords, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(max.x, 1.0, epsilon = 1e-12);
        for p in lopsided.sample_uniform(1001) {
            assert!(p.y <= max.y && p.x >= min.x && p.x <= max.x);
        }

        let (min, max) = quarter_circle().extents();
        assert_relative_eq!(min.coords, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(max.coords, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
