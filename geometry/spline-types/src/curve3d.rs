//! Closed set of source curves accepted by [`NurbsCurve::convert_from`].
//!
//! [`NurbsCurve::convert_from`]: crate::NurbsCurve::convert_from

use crate::{EllipticalArc3d, LineSegment3d, NurbsCurve, Polyline3d, Ray3d};

/// Any 3D curve this crate can represent.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve3d {
    /// Bounded straight segment.
    LineSegment(LineSegment3d),
    /// Half-infinite line.
    Ray(Ray3d),
    /// Elliptical or circular arc.
    EllipticalArc(EllipticalArc3d),
    /// Piecewise linear spline.
    Polyline(Polyline3d),
    /// Rational B-spline.
    Nurbs(NurbsCurve),
}

impl Curve3d {
    /// Short name of the variant, for logging.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::LineSegment(_) => "line_segment",
            Self::Ray(_) => "ray",
            Self::EllipticalArc(_) => "elliptical_arc",
            Self::Polyline(_) => "polyline",
            Self::Nurbs(_) => "nurbs",
        }
    }

    /// Whether the curve has finite extent.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        !matches!(self, Self::Ray(_))
    }
}

impl From<LineSegment3d> for Curve3d {
    fn from(seg: LineSegment3d) -> Self {
        Self::LineSegment(seg)
    }
}

impl From<Ray3d> for Curve3d {
    fn from(ray: Ray3d) -> Self {
        Self::Ray(ray)
    }
}

impl From<EllipticalArc3d> for Curve3d {
    fn from(arc: EllipticalArc3d) -> Self {
        Self::EllipticalArc(arc)
    }
}

impl From<Polyline3d> for Curve3d {
    fn from(polyline: Polyline3d) -> Self {
        Self::Polyline(polyline)
    }
}

impl From<NurbsCurve> for Curve3d {
    fn from(curve: NurbsCurve) -> Self {
        Self::Nurbs(curve)
    }
}
