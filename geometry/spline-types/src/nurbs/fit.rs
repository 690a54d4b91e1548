//! Fit data and global interpolation.

use super::NurbsCurve;
use crate::basis::{basis_derivatives, find_span};
use crate::{GeometryError, KnotVector, Result, SplineEntity, Tolerance};
use nalgebra::{DMatrix, Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How interpolation parameters are assigned to fit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KnotParameterization {
    /// Cumulative chord length.
    #[default]
    Chord,
    /// Cumulative square root of chord length (centripetal).
    SqrtChord,
    /// One unit per point.
    Uniform,
}

impl KnotParameterization {
    /// Parameters for `points`, starting at 0.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if two consecutive points
    /// coincide.
    pub fn parameters(self, points: &[Point3<f64>]) -> Result<Vec<f64>> {
        let mut params = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        params.push(acc);
        for (i, pair) in points.windows(2).enumerate() {
            let chord = (pair[1] - pair[0]).norm();
            if chord == 0.0 {
                return Err(GeometryError::degenerate(format!(
                    "fit points {i} and {} coincide",
                    i + 1
                )));
            }
            acc += match self {
                Self::Chord => chord,
                Self::SqrtChord => chord.sqrt(),
                Self::Uniform => 1.0,
            };
            params.push(acc);
        }
        Ok(params)
    }
}

/// Points (and optional end tangents) a curve interpolates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitData {
    /// Points the curve passes through, in order.
    pub fit_points: Vec<Point3<f64>>,
    /// Allowed deviation from the fit points.
    pub fit_tolerance: f64,
    /// Tangent at the first point, if constrained.
    ///
    /// A unit vector gives the average chord speed of the fit
    /// parameterization; longer or shorter vectors scale it.
    pub start_tangent: Option<Vector3<f64>>,
    /// Tangent at the last point, if constrained. Scaled as the start.
    pub end_tangent: Option<Vector3<f64>>,
    /// Parameter assignment used for interpolation.
    pub knot_param: KnotParameterization,
    /// Requested degree of the interpolant, between 1 and 3.
    ///
    /// Lowered when there are too few equations. A linear interpolant
    /// ignores the tangents.
    pub degree: usize,
}

impl FitData {
    /// Fit data through `fit_points` with no tangents and zero tolerance.
    #[must_use]
    pub fn new(fit_points: Vec<Point3<f64>>) -> Self {
        Self {
            fit_points,
            fit_tolerance: 0.0,
            start_tangent: None,
            end_tangent: None,
            knot_param: KnotParameterization::default(),
            degree: 3,
        }
    }

    /// Set the fit tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.fit_tolerance = tolerance;
        self
    }

    /// Constrain the start tangent.
    #[must_use]
    pub fn with_start_tangent(mut self, tangent: Vector3<f64>) -> Self {
        self.start_tangent = Some(tangent);
        self
    }

    /// Constrain the end tangent.
    #[must_use]
    pub fn with_end_tangent(mut self, tangent: Vector3<f64>) -> Self {
        self.end_tangent = Some(tangent);
        self
    }

    /// Choose the knot parameterization.
    #[must_use]
    pub fn with_knot_param(mut self, knot_param: KnotParameterization) -> Self {
        self.knot_param = knot_param;
        self
    }

    /// Choose the interpolant degree (clamped to 1..=3).
    #[must_use]
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree.clamp(1, 3);
        self
    }
}

impl NurbsCurve {
    /// Interpolate the fit points, storing the fit data on the result.
    ///
    /// The degree is `min(fit.degree, equations - 1)`, where each point and
    /// each given tangent contributes one equation. The curve passes exactly
    /// through every fit point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientPoints`] for fewer than two
    /// points, [`GeometryError::Degenerate`] for coincident consecutive
    /// points or a zero tangent, and [`GeometryError::NumericalError`] if
    /// the interpolation system is singular.
    pub fn from_fit_data(fit: FitData) -> Result<Self> {
        let (degree, knots, points) = interpolate(&fit)?;
        let mut curve = Self::non_rational(degree, KnotVector::from_knots(knots), points, false)?;
        debug!(
            num_fit_points = fit.fit_points.len(),
            degree,
            "Interpolated fit points"
        );
        curve.fit = Some(fit);
        Ok(curve)
    }

    /// Interpolate `points` with optional end tangents.
    ///
    /// # Errors
    ///
    /// See [`NurbsCurve::from_fit_data`].
    pub fn from_fit_points(
        points: Vec<Point3<f64>>,
        start_tangent: Option<Vector3<f64>>,
        end_tangent: Option<Vector3<f64>>,
        fit_tolerance: f64,
    ) -> Result<Self> {
        Self::from_fit_data(FitData {
            fit_points: points,
            fit_tolerance,
            start_tangent,
            end_tangent,
            knot_param: KnotParameterization::default(),
            degree: 3,
        })
    }

    /// The fit data, if any.
    #[must_use]
    pub fn fit_data(&self) -> Option<&FitData> {
        self.fit.as_ref()
    }

    /// Replace the fit data and rebuild the control data from it.
    ///
    /// # Errors
    ///
    /// See [`NurbsCurve::from_fit_data`]. On error the curve is unchanged.
    pub fn set_fit_data(&mut self, fit: FitData) -> Result<()> {
        let mut rebuilt = Self::from_fit_data(fit)?;
        rebuilt.tolerance = self.tolerance;
        rebuilt.knots.set_tolerance(self.knots.tolerance());
        *self = rebuilt;
        Ok(())
    }

    /// Drop the fit data, keeping the control data.
    pub fn purge_fit_data(&mut self) {
        self.fit = None;
    }

    /// Number of fit points (0 without fit data).
    #[must_use]
    pub fn num_fit_points(&self) -> usize {
        self.fit.as_ref().map_or(0, |f| f.fit_points.len())
    }

    /// Fit point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotApplicable`] without fit data and
    /// [`GeometryError::InvalidIndex`] for a bad index.
    pub fn fit_point_at(&self, index: usize) -> Result<Point3<f64>> {
        let fit = self.require_fit("fit_point_at")?;
        fit.fit_points
            .get(index)
            .copied()
            .ok_or_else(|| GeometryError::invalid_index(index, fit.fit_points.len()))
    }

    /// Move the fit point at `index` and refit.
    ///
    /// # Errors
    ///
    /// As [`NurbsCurve::fit_point_at`], plus refit errors.
    pub fn set_fit_point_at(&mut self, index: usize, point: Point3<f64>) -> Result<()> {
        let mut fit = self.require_fit("set_fit_point_at")?.clone();
        let len = fit.fit_points.len();
        let slot = fit
            .fit_points
            .get_mut(index)
            .ok_or_else(|| GeometryError::invalid_index(index, len))?;
        *slot = point;
        self.set_fit_data(fit)
    }

    /// Insert a fit point before `index` (`index == len` appends) and refit.
    ///
    /// # Errors
    ///
    /// As [`NurbsCurve::fit_point_at`], plus refit errors.
    pub fn add_fit_point_at(&mut self, index: usize, point: Point3<f64>) -> Result<()> {
        let mut fit = self.require_fit("add_fit_point_at")?.clone();
        if index > fit.fit_points.len() {
            return Err(GeometryError::invalid_index(index, fit.fit_points.len() + 1));
        }
        fit.fit_points.insert(index, point);
        self.set_fit_data(fit)
    }

    /// Remove the fit point at `index` and refit.
    ///
    /// # Errors
    ///
    /// As [`NurbsCurve::fit_point_at`], plus refit errors (for example when
    /// fewer than two points remain).
    pub fn delete_fit_point_at(&mut self, index: usize) -> Result<()> {
        let mut fit = self.require_fit("delete_fit_point_at")?.clone();
        if index >= fit.fit_points.len() {
            return Err(GeometryError::invalid_index(index, fit.fit_points.len()));
        }
        fit.fit_points.remove(index);
        self.set_fit_data(fit)
    }

    /// Replace the end tangent constraints and refit.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NotApplicable`] without fit data, plus refit errors.
    pub fn set_fit_tangents(
        &mut self,
        start: Option<Vector3<f64>>,
        end: Option<Vector3<f64>>,
    ) -> Result<()> {
        let mut fit = self.require_fit("set_fit_tangents")?.clone();
        fit.start_tangent = start;
        fit.end_tangent = end;
        self.set_fit_data(fit)
    }

    /// Change the fit tolerance. Interpolation is exact, so the control data
    /// is kept.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NotApplicable`] without fit data.
    pub fn set_fit_tolerance(&mut self, tolerance: f64) -> Result<()> {
        if !self.has_fit_data() {
            return Err(not_fitted("set_fit_tolerance"));
        }
        if let Some(fit) = self.fit.as_mut() {
            fit.fit_tolerance = tolerance;
        }
        Ok(())
    }

    /// Change the knot parameterization and refit.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NotApplicable`] without fit data, plus refit errors.
    pub fn set_fit_knot_parameterization(&mut self, knot_param: KnotParameterization) -> Result<()> {
        let mut fit = self.require_fit("set_fit_knot_parameterization")?.clone();
        fit.knot_param = knot_param;
        self.set_fit_data(fit)
    }

    /// Parameters the interpolation assigns to the fit points.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NotApplicable`] without fit data, or
    /// [`GeometryError::Degenerate`] for coincident consecutive points.
    pub fn fit_parameters(&self) -> Result<Vec<f64>> {
        let fit = self.require_fit("fit_parameters")?;
        fit.knot_param.parameters(&fit.fit_points)
    }

    /// Derive fit data from the control data.
    ///
    /// The curve is sampled at each distinct knot in its domain and at
    /// evenly spaced points inside every knot span. The end derivatives,
    /// rescaled to the fit parameterization, become the tangents and the
    /// fit degree is the curve degree. The sampling is doubled until the
    /// curve interpolated from the fit data stays within the stored fit
    /// tolerance of this curve. The control data is not changed.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotApplicable`] for degrees above 3 and
    /// [`GeometryError::NumericalError`] when the refit cannot reach the
    /// fit tolerance within [`MAX_BUILT_FIT_POINTS`] samples, for example
    /// across a corner.
    pub fn build_fit_data(&mut self, knot_param: KnotParameterization) -> Result<()> {
        if self.degree > 3 {
            return Err(GeometryError::not_applicable(
                "build_fit_data",
                format!("degree {} is above 3", self.degree),
            ));
        }
        let (lo, hi) = (self.start_param(), self.end_param());
        let (distinct, _) = self.knots.distinct_knots();
        let ktol = self.knots.tolerance();
        let mut breaks: Vec<f64> = distinct
            .into_iter()
            .filter(|&k| k > lo + ktol && k < hi - ktol)
            .collect();
        breaks.insert(0, lo);
        breaks.push(hi);

        let (min, max) = self.extents();
        let tolerance = self
            .tolerance
            .equal_point
            .max(BUILT_FIT_RELATIVE_TOLERANCE * (max - min).norm());

        // Samples are spread over the spans in proportion to their length.
        let spans = breaks.len() - 1;
        let domain = hi - lo;
        let mut per_span = 1;
        loop {
            let budget = (per_span * spans) as f64;
            let params: Vec<f64> = std::iter::once(lo)
                .chain(breaks.windows(2).flat_map(|w| {
                    let count = (budget * (w[1] - w[0]) / domain).round().max(1.0) as usize;
                    (1..=count).map(move |i| w[0] + (w[1] - w[0]) * i as f64 / count as f64)
                }))
                .collect();
            let fit = self.sampled_fit(&params, knot_param, tolerance)?;
            let refit = Self::from_fit_data(fit)?;
            let deviation = self.refit_deviation(&refit, &params)?;
            if deviation <= 0.5 * tolerance {
                debug!(
                    num_fit_points = params.len(),
                    deviation,
                    tolerance,
                    "Built fit data"
                );
                self.fit = refit.fit;
                return Ok(());
            }
            if 2 * params.len() > MAX_BUILT_FIT_POINTS {
                return Err(GeometryError::numerical(format!(
                    "refit from {} fit points deviates by {deviation:e}, above {tolerance:e}",
                    params.len()
                )));
            }
            per_span *= 2;
        }
    }

    /// Fit data through the curve points at `params`.
    fn sampled_fit(
        &self,
        params: &[f64],
        knot_param: KnotParameterization,
        tolerance: f64,
    ) -> Result<FitData> {
        let fit_points: Vec<Point3<f64>> = params.iter().map(|&u| self.eval_point(u)).collect();
        let mut fit = FitData::new(fit_points)
            .with_tolerance(tolerance)
            .with_knot_param(knot_param)
            .with_degree(self.degree);
        if self.degree < 2 {
            return Ok(fit);
        }

        // d/ds = d/du * du/ds, with du/ds estimated from the end samples.
        let s = knot_param.parameters(&fit.fit_points)?;
        let n = s.len();
        let chord: f64 = fit.fit_points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        let speed = chord / (s[n - 1] - s[0]);
        let take = n.min(3);
        let start_rate = rate_at_first(&params[..take], &s[..take]);
        let tail_u: Vec<f64> = params.iter().rev().take(take).copied().collect();
        let tail_s: Vec<f64> = s.iter().rev().take(take).copied().collect();
        let end_rate = rate_at_first(&tail_u, &tail_s);
        fit.start_tangent = Some(self.derivative_at(params[0]) * (start_rate / speed));
        fit.end_tangent = Some(self.derivative_at(params[n - 1]) * (end_rate / speed));
        Ok(fit)
    }

    /// Largest distance from the refit to this curve, checked between the
    /// fit points.
    fn refit_deviation(&self, refit: &Self, params: &[f64]) -> Result<f64> {
        const CHECKS_PER_INTERVAL: usize = 4;

        let fit_params = refit.fit_parameters()?;
        let (lo, hi) = (self.start_param(), self.end_param());
        let mut deviation: f64 = 0.0;
        for (u, s) in params.windows(2).zip(fit_params.windows(2)) {
            for i in 1..CHECKS_PER_INTERVAL {
                let f = i as f64 / CHECKS_PER_INTERVAL as f64;
                let point = refit.eval_point(s[0] + (s[1] - s[0]) * f);
                let guess = u[0] + (u[1] - u[0]) * f;
                deviation = deviation.max(self.distance_near(&point, guess, lo, hi));
            }
        }
        Ok(deviation)
    }

    /// Distance from `point` to the curve, refining the foot from `guess`.
    fn distance_near(&self, point: &Point3<f64>, guess: f64, lo: f64, hi: f64) -> f64 {
        let mut u = guess;
        for _ in 0..4 {
            let tangent = self.derivative_at(u);
            let speed_sq = tangent.norm_squared();
            if speed_sq == 0.0 {
                break;
            }
            u = (u + (point - self.eval_point(u)).dot(&tangent) / speed_sq).clamp(lo, hi);
        }
        (point - self.eval_point(u)).norm()
    }

    fn require_fit(&self, operation: &'static str) -> Result<&FitData> {
        self.fit.as_ref().ok_or_else(|| not_fitted(operation))
    }
}

/// Fit tolerance of [`NurbsCurve::build_fit_data`], relative to the
/// diagonal of the curve extents.
pub const BUILT_FIT_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Most fit points [`NurbsCurve::build_fit_data`] samples before giving up.
pub const MAX_BUILT_FIT_POINTS: usize = 512;

/// `du/ds` at the first sample, second order when three samples are given.
fn rate_at_first(u: &[f64], s: &[f64]) -> f64 {
    if u.len() < 3 {
        return (u[1] - u[0]) / (s[1] - s[0]);
    }
    let (h1, h2) = (u[1] - u[0], u[2] - u[1]);
    let ds_du = -(2.0 * h1 + h2) / (h1 * (h1 + h2)) * s[0] + (h1 + h2) / (h1 * h2) * s[1]
        - h1 / (h2 * (h1 + h2)) * s[2];
    1.0 / ds_du
}

fn not_fitted(operation: &'static str) -> GeometryError {
    GeometryError::not_applicable(operation, "curve has no fit data")
}

/// Solve for the control points of a curve through the fit data.
fn interpolate(fit: &FitData) -> Result<(usize, Vec<f64>, Vec<Point3<f64>>)> {
    let points = &fit.fit_points;
    let n = points.len();
    if n < 2 {
        return Err(GeometryError::insufficient_points(2, n));
    }
    let params = fit.knot_param.parameters(points)?;
    let tol = Tolerance::default();

    let checked = |t: &Vector3<f64>, which: &str| {
        if tol.is_zero_length(t) {
            Err(GeometryError::degenerate(format!("{which} tangent is zero")))
        } else {
            Ok(*t)
        }
    };
    let mut start = fit.start_tangent.as_ref().map(|t| checked(t, "start")).transpose()?;
    let mut end = fit.end_tangent.as_ref().map(|t| checked(t, "end")).transpose()?;
    let requested = fit.degree.clamp(1, 3);
    if requested == 1 {
        start = None;
        end = None;
    }

    let equations = n + usize::from(start.is_some()) + usize::from(end.is_some());
    let p = requested.min(equations - 1);
    let first = params[0];
    let last = params[n - 1];

    let mut knots = Vec::with_capacity(equations + p + 1);
    knots.extend(std::iter::repeat_n(first, p + 1));
    if start.is_some() && end.is_some() && p == 3 {
        knots.extend_from_slice(&params[1..n - 1]);
    } else {
        let mut extended = Vec::with_capacity(equations);
        if start.is_some() {
            extended.push(first);
        }
        extended.extend_from_slice(&params);
        if end.is_some() {
            extended.push(last);
        }
        for j in 1..equations - p {
            let sum: f64 = extended[j..j + p].iter().sum();
            knots.push(sum / p as f64);
        }
    }
    knots.extend(std::iter::repeat_n(last, p + 1));

    // Unit tangents move at the average chord speed.
    let chord: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    let speed = chord / (last - first);

    let mut a = DMatrix::<f64>::zeros(equations, equations);
    let mut rhs = DMatrix::<f64>::zeros(equations, 3);
    let mut row = 0;
    let mut fill = |u: f64, order: usize, value: Vector3<f64>, row: &mut usize| {
        let span = find_span(&knots, p, equations, u);
        let ders = basis_derivatives(&knots, span, p, u, order);
        for j in 0..=p {
            a[(*row, span - p + j)] = ders[order][j];
        }
        for c in 0..3 {
            rhs[(*row, c)] = value[c];
        }
        *row += 1;
    };

    for (point, &u) in points.iter().zip(&params) {
        fill(u, 0, point.coords, &mut row);
    }
    if let Some(t) = start {
        fill(first, 1, t * speed, &mut row);
    }
    if let Some(t) = end {
        fill(last, 1, t * speed, &mut row);
    }

    let solution = a
        .lu()
        .solve(&rhs)
        .ok_or_else(|| GeometryError::numerical("interpolation matrix is singular"))?;

    let control = (0..equations)
        .map(|i| Point3::new(solution[(i, 0)], solution[(i, 1)], solution[(i, 2)]))
        .collect();
    Ok((p, knots, control))
}
