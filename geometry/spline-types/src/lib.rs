//! Knot vectors, NURBS curves and piecewise linear splines.
//!
//! This crate is the curve kernel behind geometry import: it stores curves
//! the way CAD exchange formats describe them (knot vector, control polygon,
//! optional weights and fit points) and keeps that data consistent through
//! structural edits.
//!
//! - [`KnotVector`] - Tolerant non-decreasing knot sequence
//! - [`SplineEntity`] - Common contract for knot-based curves
//! - [`Polyline3d`] - Degree-1 spline through its vertices
//! - [`NurbsCurve`] - Rational B-spline with optional [`FitData`]
//! - [`LineSegment3d`], [`Ray3d`], [`EllipticalArc3d`] - Analytic sources for
//!   [`NurbsCurve::convert_from`]
//!
//! # Parameterization
//!
//! Unlike normalized curve libraries, splines here are evaluated in their own
//! knot parameterization. Valid parameters lie in
//! `[start_param(), end_param()]`; values outside are clamped.
//!
//! # Example
//!
//! ```
//! use spline_types::{NurbsCurve, SplineEntity};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(3.0, 1.0, 0.0),
//! ];
//! let mut curve = NurbsCurve::from_fit_points(points, None, None, 1e-6).unwrap();
//! assert_eq!(curve.degree(), 3);
//!
//! // Knot insertion keeps the shape.
//! let before = curve.eval_point(1.2);
//! curve.insert_knot(1.2).unwrap();
//! assert!((curve.eval_point(1.2) - before).norm() < 1e-12);
//! ```
//!
//! # Errors
//!
//! Fallible operations return [`GeometryError`]. A failing operation never
//! leaves its receiver partially modified.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for all data types

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::too_many_lines,
    clippy::too_many_arguments,
    clippy::must_use_candidate,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::cast_lossless,
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::option_if_let_else,
    clippy::items_after_statements,
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::needless_range_loop,
    clippy::float_cmp,
    clippy::neg_cmp_op_on_partial_ord,
    clippy::return_self_not_must_use
)]

mod basis;
mod curve3d;
mod ellipse;
mod error;
mod knot;
mod line;
mod nurbs;
mod polyline;
mod tolerance;
mod traits;

pub use curve3d::Curve3d;
pub use ellipse::EllipticalArc3d;
pub use error::{ErrorKind, GeometryError};
pub use knot::{DEFAULT_KNOT_TOLERANCE, KnotInterval, KnotVector};
pub use line::{LineSegment3d, Ray3d};
pub use nurbs::{
    BUILT_FIT_RELATIVE_TOLERANCE, FitData, KnotParameterization, MAX_BUILT_FIT_POINTS, MAX_DEGREE,
    NurbsCurve, NurbsDefinition,
};
pub use polyline::Polyline3d;
pub use tolerance::{DEFAULT_EQUAL_POINT, DEFAULT_EQUAL_VECTOR, Tolerance};
pub use traits::SplineEntity;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

/// Result type for spline operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
