//! Parameters for path tessellation.

use spline_types::{DEFAULT_EQUAL_POINT, Tolerance};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default distance below which consecutive path points are merged.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-9;

/// Parameters for path tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TessellateParams {
    /// Distance below which a new point repeats the previous one and is
    /// dropped. Also decides whether a closed subpath already ends at its
    /// start. Default: 1e-9
    pub merge_tolerance: f64,

    /// Tolerance stored on every emitted spline. Default: [`Tolerance::default`]
    pub curve_tolerance: Tolerance,

    /// Height of the drawing plane the 2D points are lifted onto. Default: 0.0
    pub elevation: f64,
}

impl Default for TessellateParams {
    fn default() -> Self {
        Self {
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            curve_tolerance: Tolerance::default(),
            elevation: 0.0,
        }
    }
}

impl TessellateParams {
    /// Create params that merge points closer than `tolerance`.
    ///
    /// Negative values are treated as zero.
    #[must_use]
    pub fn with_merge_tolerance(tolerance: f64) -> Self {
        Self {
            merge_tolerance: tolerance.max(0.0),
            ..Default::default()
        }
    }

    /// Params for drawings in coarse units, where points closer than the
    /// kernel's point tolerance are the same point.
    #[must_use]
    pub fn kernel_aligned() -> Self {
        Self {
            merge_tolerance: DEFAULT_EQUAL_POINT,
            ..Default::default()
        }
    }

    /// Set the tolerance stored on emitted splines.
    #[must_use]
    pub const fn with_curve_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.curve_tolerance = tolerance;
        self
    }

    /// Set the drawing plane height.
    #[must_use]
    pub const fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }
}
