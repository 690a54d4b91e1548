//! Summary of a tessellation run.

/// Counts collected while tessellating a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TessellationReport {
    /// Number of subpaths started by `move_to`.
    pub subpaths: usize,

    /// Number of polylines added to the cache.
    pub polylines: usize,

    /// Number of splines added to the cache.
    pub splines: usize,

    /// Accumulations that could not be turned into a curve and were skipped.
    pub failed: usize,

    /// Segments dropped because they had zero length within the merge tolerance.
    pub dropped_segments: usize,

    /// Commands rejected because no subpath was open.
    pub rejected_commands: usize,
}

impl TessellationReport {
    /// Total number of curves added to the cache.
    #[must_use]
    pub const fn entities(&self) -> usize {
        self.polylines + self.splines
    }

    /// Check if every accumulation and command was accepted.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.rejected_commands == 0
    }

    /// Add the counts of another run.
    pub fn merge(&mut self, other: &Self) {
        self.subpaths += other.subpaths;
        self.polylines += other.polylines;
        self.splines += other.splines;
        self.failed += other.failed;
        self.dropped_segments += other.dropped_segments;
        self.rejected_commands += other.rejected_commands;
    }
}

impl std::fmt::Display for TessellationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tessellation: {} subpaths → {} polylines, {} splines ({} failed, {} dropped segments, {} rejected commands)",
            self.subpaths,
            self.polylines,
            self.splines,
            self.failed,
            self.dropped_segments,
            self.rejected_commands
        )
    }
}
