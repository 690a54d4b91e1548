//! Elliptical and circular arcs.
//!
//! These are analytic source curves: they evaluate by angle directly and
//! can be converted to an exact rational quadratic [`NurbsCurve`]
//! with [`NurbsCurve::from_elliptical_arc`].
//!
//! [`NurbsCurve`]: crate::NurbsCurve
//! [`NurbsCurve::from_elliptical_arc`]: crate::NurbsCurve::from_elliptical_arc

use crate::{GeometryError, Result};
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const AXIS_EPSILON: f64 = 1e-12;

/// An elliptical arc in 3D space.
///
/// Points are `center + major_radius·cos(θ)·major_axis +
/// minor_radius·sin(θ)·minor_axis` for `θ` from `start_angle` to
/// `end_angle`. The axes are unit length and orthogonal.
///
/// # Example
///
/// ```
/// use spline_types::EllipticalArc3d;
/// use nalgebra::{Point3, Vector3};
/// use std::f64::consts::PI;
///
/// let arc = EllipticalArc3d::new(
///     Point3::origin(),
///     Vector3::x(),
///     Vector3::y(),
///     2.0,
///     1.0,
///     0.0,
///     PI / 2.0,
/// );
///
/// let end = arc.point_at(PI / 2.0);
/// assert!((end.y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipticalArc3d {
    center: Point3<f64>,
    major_axis: Vector3<f64>,
    minor_axis: Vector3<f64>,
    major_radius: f64,
    minor_radius: f64,
    start_angle: f64,
    end_angle: f64,
}

impl EllipticalArc3d {
    /// Create an elliptical arc.
    ///
    /// The minor axis is made orthogonal to the major axis, and both are
    /// normalized.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if either axis is zero or the
    /// axes are parallel, and [`GeometryError::InvalidInput`] for negative
    /// radii or an angle range that is empty or reversed.
    pub fn try_new(
        center: Point3<f64>,
        major_axis: Vector3<f64>,
        minor_axis: Vector3<f64>,
        major_radius: f64,
        minor_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if !(major_radius >= 0.0 && minor_radius >= 0.0) {
            return Err(GeometryError::invalid_input(format!(
                "radii {major_radius}, {minor_radius} must be non-negative"
            )));
        }
        if !(end_angle > start_angle) {
            return Err(GeometryError::invalid_input(format!(
                "angle range [{start_angle}, {end_angle}] is empty"
            )));
        }

        let major_len = major_axis.norm();
        if major_len < AXIS_EPSILON || minor_axis.norm() < AXIS_EPSILON {
            return Err(GeometryError::degenerate("zero-length ellipse axis"));
        }
        let major = major_axis / major_len;
        let minor = minor_axis - major * minor_axis.dot(&major);
        let minor_len = minor.norm();
        if minor_len < AXIS_EPSILON * minor_axis.norm().max(1.0) {
            return Err(GeometryError::degenerate("ellipse axes are parallel"));
        }

        Ok(Self {
            center,
            major_axis: major,
            minor_axis: minor / minor_len,
            major_radius,
            minor_radius,
            start_angle,
            end_angle,
        })
    }

    /// Create an elliptical arc.
    ///
    /// # Panics
    ///
    /// Panics on the inputs [`EllipticalArc3d::try_new`] rejects.
    #[must_use]
    pub fn new(
        center: Point3<f64>,
        major_axis: Vector3<f64>,
        minor_axis: Vector3<f64>,
        major_radius: f64,
        minor_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        match Self::try_new(
            center,
            major_axis,
            minor_axis,
            major_radius,
            minor_radius,
            start_angle,
            end_angle,
        ) {
            Ok(arc) => arc,
            Err(err) => panic!("invalid elliptical arc: {err}"),
        }
    }

    /// Circular arc of `radius` around `normal`, counter-clockwise when
    /// viewed from the normal's tip.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a zero normal and the
    /// [`EllipticalArc3d::try_new`] errors otherwise.
    pub fn circular(
        center: Point3<f64>,
        normal: Vector3<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if normal.norm() < AXIS_EPSILON {
            return Err(GeometryError::degenerate("zero-length circle normal"));
        }
        let (x_axis, y_axis) = build_plane_axes(&normal);
        Self::try_new(center, x_axis, y_axis, radius, radius, start_angle, end_angle)
    }

    /// Full circle through three points, starting at `p1`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the points are collinear.
    pub fn circle_through_points(
        p1: Point3<f64>,
        p2: Point3<f64>,
        p3: Point3<f64>,
    ) -> Result<Self> {
        let a = p1 - p3;
        let b = p2 - p3;
        let axb = a.cross(&b);
        let denom = 2.0 * axb.norm_squared();
        if denom < AXIS_EPSILON * (a.norm_squared() * b.norm_squared()).max(AXIS_EPSILON) {
            return Err(GeometryError::degenerate("points are collinear"));
        }

        // Circumcenter
        let center = p3 + (b * a.norm_squared() - a * b.norm_squared()).cross(&axb) / denom;
        let radius = (p1 - center).norm();
        let x_axis = (p1 - center) / radius;
        let y_axis = axb.normalize().cross(&x_axis);
        Self::try_new(center, x_axis, y_axis, radius, radius, 0.0, TAU)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Unit direction of angle 0.
    #[must_use]
    pub fn major_axis(&self) -> Vector3<f64> {
        self.major_axis
    }

    /// Unit direction of angle π/2.
    #[must_use]
    pub fn minor_axis(&self) -> Vector3<f64> {
        self.minor_axis
    }

    /// Radius along the major axis.
    #[must_use]
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Radius along the minor axis.
    #[must_use]
    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    /// Start angle in radians.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// End angle in radians.
    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    /// Swept angle.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Plane normal (`major_axis × minor_axis`).
    #[must_use]
    pub fn normal(&self) -> Vector3<f64> {
        self.major_axis.cross(&self.minor_axis)
    }

    /// Whether the arc sweeps a full turn.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sweep() >= TAU - 1e-12
    }

    /// Point at `angle`.
    #[must_use]
    pub fn point_at(&self, angle: f64) -> Point3<f64> {
        self.center
            + self.major_axis * (self.major_radius * angle.cos())
            + self.minor_axis * (self.minor_radius * angle.sin())
    }

    /// Derivative with respect to the angle.
    #[must_use]
    pub fn derivative_at(&self, angle: f64) -> Vector3<f64> {
        self.minor_axis * (self.minor_radius * angle.cos())
            - self.major_axis * (self.major_radius * angle.sin())
    }

    /// Start point.
    #[must_use]
    pub fn start_point(&self) -> Point3<f64> {
        self.point_at(self.start_angle)
    }

    /// End point.
    #[must_use]
    pub fn end_point(&self) -> Point3<f64> {
        self.point_at(self.end_angle)
    }
}

/// Orthonormal in-plane axes for a plane normal.
fn build_plane_axes(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let n = normal.normalize();

    // Reference not parallel to the normal
    let reference = if n.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::x()
    };

    let y_axis = n.cross(&reference).normalize();
    let x_axis = y_axis.cross(&n);

    (x_axis, y_axis)
}
