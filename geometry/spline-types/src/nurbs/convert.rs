//! Exact spline forms of analytic curves.

use super::NurbsCurve;
use crate::{
    Curve3d, EllipticalArc3d, GeometryError, KnotVector, LineSegment3d, Result, SplineEntity,
    Tolerance,
};
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

/// Sweep overshoot, in radians, that does not start another quarter turn.
const QUARTER_TURN_SLACK: f64 = 1e-9;

impl NurbsCurve {
    /// Exact rational quadratic form of an elliptical arc.
    ///
    /// `num_spans == 0` uses one span per started quarter turn. Knots are in
    /// the arc's angle units, but the rational parameterization is not the
    /// angle itself.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if a span would sweep half a
    /// turn or more.
    pub fn from_elliptical_arc(arc: &EllipticalArc3d, num_spans: usize) -> Result<Self> {
        let start = arc.start_angle();
        let sweep = arc.sweep();
        let spans = if num_spans == 0 {
            (((sweep - QUARTER_TURN_SLACK) / FRAC_PI_2).ceil() as usize).max(1)
        } else {
            num_spans
        };
        let step = sweep / spans as f64;
        if step >= std::f64::consts::PI {
            return Err(GeometryError::invalid_input(format!(
                "{spans} span(s) over {sweep} rad leaves {step} rad per span"
            )));
        }

        let half_cos = (step / 2.0).cos();
        let mut points = Vec::with_capacity(2 * spans + 1);
        let mut weights = Vec::with_capacity(2 * spans + 1);
        let mut knots = vec![start; 3];
        points.push(arc.point_at(start));
        weights.push(1.0);

        for i in 0..spans {
            let a0 = start + step * i as f64;
            let a1 = if i + 1 == spans { start + sweep } else { a0 + step };
            let mid = 0.5 * (a0 + a1);
            let offset = arc.major_axis() * (arc.major_radius() * mid.cos())
                + arc.minor_axis() * (arc.minor_radius() * mid.sin());
            points.push(arc.center() + offset / half_cos);
            weights.push(half_cos);
            points.push(arc.point_at(a1));
            weights.push(1.0);
            if i + 1 < spans {
                knots.extend([a1, a1]);
            }
        }
        knots.extend([start + sweep; 3]);

        let curve = Self::new(2, KnotVector::from_knots(knots), points, weights, false)?;
        debug!(spans, sweep, "Converted elliptical arc");
        Ok(curve)
    }

    /// Degree-1 form of a line segment, knots `[0, 0, 1, 1]`.
    #[must_use]
    pub fn from_line_segment(segment: &LineSegment3d) -> Self {
        Self {
            degree: 1,
            knots: KnotVector::from_knots(vec![0.0, 0.0, 1.0, 1.0]),
            control_points: vec![segment.start, segment.end],
            weights: None,
            periodic: false,
            fit: None,
            tolerance: Tolerance::default(),
        }
    }

    /// Spline form of any supported source curve.
    ///
    /// Returns `None` for a missing source, a ray, or a source that is
    /// degenerate under `tol`. An elliptical arc has no spline form that
    /// keeps its angle parameterization, so `same_parametrization` also
    /// yields `None` for arcs. The result carries `tol`.
    #[must_use]
    pub fn convert_from(
        source: Option<&Curve3d>,
        tol: &Tolerance,
        same_parametrization: bool,
    ) -> Option<Self> {
        let source = source?;
        let converted = match source {
            Curve3d::Ray(_) => None,
            Curve3d::LineSegment(seg) => {
                (seg.length() > tol.equal_point).then(|| Self::from_line_segment(seg))
            }
            Curve3d::EllipticalArc(arc) => {
                let degenerate = arc.major_radius() <= tol.equal_point
                    || arc.minor_radius() <= tol.equal_point;
                if degenerate || same_parametrization {
                    None
                } else {
                    Self::from_elliptical_arc(arc, 0).ok()
                }
            }
            Curve3d::Polyline(polyline) => {
                if polyline.length() > tol.equal_point {
                    Self::non_rational(
                        1,
                        polyline.knots().clone(),
                        polyline.vertices().to_vec(),
                        false,
                    )
                    .ok()
                } else {
                    None
                }
            }
            Curve3d::Nurbs(curve) => (curve.length() > tol.equal_point).then(|| curve.clone()),
        };

        if converted.is_none() {
            debug!(source = source.kind_name(), "Source curve has no spline form");
        }
        converted.map(|curve| curve.with_tolerance(*tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Polyline3d, Ray3d};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::{PI, TAU};

    fn ellipse(start: f64, end: f64) -> EllipticalArc3d {
        EllipticalArc3d::new(
            Point3::new(1.0, -1.0, 0.5),
            Vector3::x(),
            Vector3::y(),
            3.0,
            2.0,
            start,
            end,
        )
    }

    fn on_conic(arc: &EllipticalArc3d, p: Point3<f64>) -> f64 {
        let v = p - arc.center();
        let x = v.dot(&arc.major_axis()) / arc.major_radius();
        let y = v.dot(&arc.minor_axis()) / arc.minor_radius();
        x * x + y * y - 1.0
    }

    #[test]
    fn test_ellipse_points_on_conic() {
        let arc = ellipse(0.3, 0.3 + 1.4 * PI);
        let curve = NurbsCurve::from_elliptical_arc(&arc, 0).unwrap();
        assert_eq!(curve.num_control_points(), 7);
        assert!(curve.is_rational());
        assert_relative_eq!(curve.start_param(), arc.start_angle());
        assert_relative_eq!(curve.end_param(), arc.end_angle());
        assert_relative_eq!(curve.start_point().coords, arc.start_point().coords, epsilon = 1e-12);
        assert_relative_eq!(curve.end_point().coords, arc.end_point().coords, epsilon = 1e-12);

        for i in 0..=50 {
            let u = curve.start_param() + (curve.end_param() - curve.start_param()) * f64::from(i) / 50.0;
            assert_relative_eq!(on_conic(&arc, curve.eval_point(u)), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_full_ellipse_is_closed() {
        let arc = ellipse(0.0, TAU);
        let curve = NurbsCurve::from_elliptical_arc(&arc, 0).unwrap();
        assert_eq!(curve.num_control_points(), 9);
        assert!(curve.is_closed());
    }

    #[test]
    fn test_rounding_noise_does_not_add_spans() {
        // End angles a few ulps past a quarter turn multiple.
        let half = ellipse(0.0, PI + 4.0 * f64::EPSILON);
        assert!(half.sweep() > PI);
        let curve = NurbsCurve::from_elliptical_arc(&half, 0).unwrap();
        assert_eq!(curve.num_control_points(), 5);

        let full = ellipse(0.0, TAU + 8.0 * f64::EPSILON);
        let curve = NurbsCurve::from_elliptical_arc(&full, 0).unwrap();
        assert_eq!(curve.num_control_points(), 9);

        // A real overshoot still gets its own span.
        let past = ellipse(0.0, PI + 1e-6);
        let curve = NurbsCurve::from_elliptical_arc(&past, 0).unwrap();
        assert_eq!(curve.num_control_points(), 7);
    }

    #[test]
    fn test_span_too_wide() {
        let arc = ellipse(0.0, 1.5 * PI);
        assert!(NurbsCurve::from_elliptical_arc(&arc, 1).unwrap_err().is_invalid_input());
        assert!(NurbsCurve::from_elliptical_arc(&arc, 2).is_ok());
    }

    #[test]
    fn test_convert_sources() {
        let tol = Tolerance::uniform(1e-6);
        assert!(NurbsCurve::convert_from(None, &tol, false).is_none());

        let ray = Curve3d::from(Ray3d::new(Point3::origin(), Vector3::x()).unwrap());
        assert!(NurbsCurve::convert_from(Some(&ray), &tol, false).is_none());

        let seg = Curve3d::from(LineSegment3d::new(Point3::origin(), Point3::new(0.0, 0.0, 2.0)));
        let line = NurbsCurve::convert_from(Some(&seg), &tol, true).unwrap();
        assert_eq!(line.degree(), 1);
        assert_eq!(line.knots().as_slice(), &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(*line.tolerance(), tol);

        let tiny = Curve3d::from(LineSegment3d::new(Point3::origin(), Point3::new(1e-9, 0.0, 0.0)));
        assert!(NurbsCurve::convert_from(Some(&tiny), &tol, false).is_none());

        let arc = Curve3d::from(ellipse(0.0, PI));
        assert!(NurbsCurve::convert_from(Some(&arc), &tol, false).is_some());
        assert!(NurbsCurve::convert_from(Some(&arc), &tol, true).is_none());

        let polyline = Polyline3d::new(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        let knots = polyline.knots().clone();
        let source = Curve3d::from(polyline);
        let converted = NurbsCurve::convert_from(Some(&source), &tol, true).unwrap();
        assert_eq!(converted.degree(), 1);
        assert!(converted.knots().is_equal(&knots));
        assert_relative_eq!(converted.eval_point(1.5).coords, Vector3::new(1.0, 0.5, 0.0), epsilon = 1e-12);
    }
}
