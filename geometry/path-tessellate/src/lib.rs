//! Path tessellation into cached polylines and NURBS curves.
//!
//! This crate sits between a renderer that reports 2D path-drawing
//! primitives and a drawing importer that wants a small set of curves per
//! page. Consecutive straight segments are merged into one polyline and
//! consecutive cubic Bezier segments into one degree-3 spline.
//!
//! # Features
//!
//! - **Run merging**: One curve per run of same-kind segments
//! - **Exact Bezier chains**: Piecewise cubics become a clamped spline with
//!   triple interior knots, so the conversion loses nothing
//! - **Subpath closing**: Explicit `close_path` or a per-stream close flag
//! - **Per-entity isolation**: A run that fails to convert is logged and
//!   skipped; the rest of the page still tessellates
//!
//! # Example
//!
//! ```
//! use nalgebra::Point2;
//! use path_tessellate::{GeometryCache, PathCommand, TessellateParams, tessellate};
//!
//! let commands = [
//!     PathCommand::MoveTo(Point2::new(0.0, 0.0)),
//!     PathCommand::LineTo(Point2::new(1.0, 0.0)),
//!     PathCommand::BezierTo(Point2::new(2.0, 0.0), Point2::new(2.0, 1.0), Point2::new(1.0, 1.0)),
//!     PathCommand::Close,
//! ];
//!
//! let mut cache = GeometryCache::new();
//! let report = tessellate(&commands, false, &mut cache, &TessellateParams::default());
//! println!("{report}");
//!
//! assert_eq!(cache.splines().len(), 1);
//! // The line run plus the segment closing the Bezier back to the start.
//! assert_eq!(cache.polylines().len(), 2);
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for cache and parameter types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(clippy::cast_precision_loss, clippy::float_cmp, clippy::must_use_candidate)]

mod cache;
mod error;
mod extents;
mod params;
mod report;
mod tessellator;

// Re-export main types and functions
pub use cache::{GeometryCache, PolylineEntry, SplineEntry};
pub use error::{TessellateError, TessellateResult};
pub use extents::Extents2d;
pub use params::{DEFAULT_MERGE_TOLERANCE, TessellateParams};
pub use report::TessellationReport;
pub use tessellator::{PathCommand, PathSink, PathTessellator, tessellate};
