//! Path command state machine.
//!
//! A renderer drives a [`PathSink`] with `move_to` / `line_to` / `bezier_to`
//! calls. [`PathTessellator`] groups consecutive segments of the same kind:
//! runs of lines become one [`Polyline3d`], runs of cubic Beziers become one
//! degree-3 [`NurbsCurve`]. Switching kind or starting a subpath flushes the
//! current run, carrying its last point into the next one.

use nalgebra::{Point2, Point3};
use spline_types::{KnotVector, NurbsCurve, Polyline3d};
use tracing::{debug, info, warn};

use crate::cache::GeometryCache;
use crate::error::{TessellateError, TessellateResult};
use crate::params::TessellateParams;
use crate::report::TessellationReport;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Receiver of path-drawing primitives.
pub trait PathSink {
    /// Start a new subpath at `point`.
    fn move_to(&mut self, point: Point2<f64>);

    /// Straight segment from the current point to `point`.
    ///
    /// # Errors
    ///
    /// Returns [`TessellateError::NoCurrentPoint`] before the first `move_to`.
    fn line_to(&mut self, point: Point2<f64>) -> TessellateResult<()>;

    /// Cubic Bezier from the current point through the controls `c1`, `c2`
    /// to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`TessellateError::NoCurrentPoint`] before the first `move_to`.
    fn bezier_to(&mut self, c1: Point2<f64>, c2: Point2<f64>, end: Point2<f64>) -> TessellateResult<()>;

    /// Connect the current point back to the start of the subpath.
    fn close_path(&mut self);

    /// End of the command stream.
    fn finish(&mut self);
}

/// One recorded path-drawing primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathCommand {
    /// Start a subpath.
    MoveTo(Point2<f64>),
    /// Straight segment to the point.
    LineTo(Point2<f64>),
    /// Cubic Bezier with two controls and an end point.
    BezierTo(Point2<f64>, Point2<f64>, Point2<f64>),
    /// Close the current subpath.
    Close,
}

impl PathCommand {
    /// Short name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MoveTo(_) => "move_to",
            Self::LineTo(_) => "line_to",
            Self::BezierTo(..) => "bezier_to",
            Self::Close => "close_path",
        }
    }

    /// Replay the command into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error for drawing commands.
    pub fn apply<S: PathSink + ?Sized>(&self, sink: &mut S) -> TessellateResult<()> {
        match *self {
            Self::MoveTo(p) => sink.move_to(p),
            Self::LineTo(p) => sink.line_to(p)?,
            Self::BezierTo(c1, c2, end) => sink.bezier_to(c1, c2, end)?,
            Self::Close => sink.close_path(),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    AccumulatingLine,
    AccumulatingBezier,
}

/// Turns path commands into cached curves.
///
/// Accumulated runs are written into the borrowed [`GeometryCache`] when
/// flushed. A run that cannot become a curve is logged, counted in the
/// report and skipped; the remaining commands still go through.
#[derive(Debug)]
pub struct PathTessellator<'c> {
    cache: &'c mut GeometryCache,
    params: TessellateParams,
    close_subpaths: bool,
    state: State,
    points: Vec<Point2<f64>>,
    subpath_start: Option<Point2<f64>>,
    subpath: usize,
    report: TessellationReport,
}

impl<'c> PathTessellator<'c> {
    /// Create a tessellator appending to `cache`.
    pub fn new(cache: &'c mut GeometryCache, params: TessellateParams) -> Self {
        Self {
            cache,
            params,
            close_subpaths: false,
            state: State::Idle,
            points: Vec::new(),
            subpath_start: None,
            subpath: 0,
            report: TessellationReport::default(),
        }
    }

    /// Close every subpath when it ends, as if `close_path` had been called.
    #[must_use]
    pub fn with_closed_subpaths(mut self, closed: bool) -> Self {
        self.close_subpaths = closed;
        self
    }

    /// Counts collected so far.
    #[must_use]
    pub fn report(&self) -> &TessellationReport {
        &self.report
    }

    /// Finish the stream and return the counts.
    pub fn into_report(mut self) -> TessellationReport {
        self.finish();
        self.report
    }

    fn current_point(&self) -> Option<Point2<f64>> {
        self.points.last().copied()
    }

    fn coincident(&self, a: &Point2<f64>, b: &Point2<f64>) -> bool {
        (a - b).norm() <= self.params.merge_tolerance
    }

    fn lift(&self, p: &Point2<f64>) -> Point3<f64> {
        Point3::new(p.x, p.y, self.params.elevation)
    }

    /// Current point, or a counted rejection.
    fn require_current(&mut self, command: &'static str) -> TessellateResult<Point2<f64>> {
        match self.current_point() {
            Some(p) => Ok(p),
            None => {
                self.report.rejected_commands += 1;
                Err(TessellateError::NoCurrentPoint { command })
            }
        }
    }

    /// Emit the accumulated run and reseed with its last point.
    fn flush(&mut self) {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let seed = self.current_point();
        match state {
            State::Idle => {}
            State::AccumulatingLine => {
                let points = std::mem::take(&mut self.points);
                self.emit_polyline(&points);
            }
            State::AccumulatingBezier => {
                let points = std::mem::take(&mut self.points);
                match self.build_spline(&points) {
                    Ok(curve) => {
                        debug!(subpath = self.subpath, segments = (points.len() - 1) / 3, "emitting spline");
                        self.cache.push_spline(self.subpath, curve);
                        self.report.splines += 1;
                    }
                    Err(err) => self.record_failure("spline", &err),
                }
            }
        }
        self.points.clear();
        self.points.extend(seed);
    }

    fn emit_polyline(&mut self, points: &[Point2<f64>]) {
        let vertices = points.iter().map(|p| self.lift(p)).collect();
        match Polyline3d::try_new(vertices) {
            Ok(curve) => {
                debug!(subpath = self.subpath, vertices = points.len(), "emitting polyline");
                self.cache.push_polyline(self.subpath, curve);
                self.report.polylines += 1;
            }
            Err(err) => self.record_failure("polyline", &TessellateError::from(err)),
        }
    }

    /// Cubic Bezier chain as a clamped degree-3 spline with triple interior
    /// knots at the segment joins.
    fn build_spline(&self, points: &[Point2<f64>]) -> TessellateResult<NurbsCurve> {
        let segments = points.len().saturating_sub(1) / 3;
        let mut knots = Vec::with_capacity(points.len() + 4);
        knots.extend([0.0; 4]);
        for i in 1..segments {
            knots.extend([i as f64; 3]);
        }
        knots.extend([segments as f64; 4]);

        let control_points = points.iter().map(|p| self.lift(p)).collect();
        let curve = NurbsCurve::non_rational(3, KnotVector::from_knots(knots), control_points, false)?;
        Ok(curve.with_tolerance(self.params.curve_tolerance))
    }

    fn record_failure(&mut self, kind: &'static str, err: &TessellateError) {
        warn!(subpath = self.subpath, kind, error = %err, "skipping path run");
        self.report.failed += 1;
    }
}

impl PathSink for PathTessellator<'_> {
    fn move_to(&mut self, point: Point2<f64>) {
        if self.close_subpaths {
            self.close_path();
        }
        self.flush();
        self.subpath = self.report.subpaths;
        self.subpath_start = Some(point);
        self.points.clear();
        self.points.push(point);
        self.report.subpaths += 1;
    }

    fn line_to(&mut self, point: Point2<f64>) -> TessellateResult<()> {
        let current = self.require_current("line_to")?;
        if self.coincident(&current, &point) {
            self.report.dropped_segments += 1;
            return Ok(());
        }
        if self.state == State::AccumulatingBezier {
            self.flush();
        }
        self.state = State::AccumulatingLine;
        self.points.push(point);
        Ok(())
    }

    fn bezier_to(&mut self, c1: Point2<f64>, c2: Point2<f64>, end: Point2<f64>) -> TessellateResult<()> {
        let current = self.require_current("bezier_to")?;
        if [c1, c2, end].iter().all(|p| self.coincident(&current, p)) {
            self.report.dropped_segments += 1;
            return Ok(());
        }
        if self.state == State::AccumulatingLine {
            self.flush();
        }
        self.state = State::AccumulatingBezier;
        self.points.extend([c1, c2, end]);
        Ok(())
    }

    fn close_path(&mut self) {
        let (Some(start), Some(current)) = (self.subpath_start, self.current_point()) else {
            return;
        };
        let open = !self.coincident(&current, &start);
        match self.state {
            State::Idle => return,
            State::AccumulatingLine => {
                if open {
                    self.points.push(start);
                }
                self.flush();
            }
            State::AccumulatingBezier => {
                self.flush();
                if open {
                    self.emit_polyline(&[current, start]);
                }
            }
        }
        // Drawing continues from the subpath start.
        self.points.clear();
        self.points.push(start);
    }

    fn finish(&mut self) {
        if self.close_subpaths {
            self.close_path();
        }
        self.flush();
        self.points.clear();
        self.subpath_start = None;
    }
}

/// Tessellate a recorded command stream into `cache`.
///
/// With `closed` set every subpath is closed when it ends. Commands that
/// arrive without a current point are logged and skipped.
pub fn tessellate<'a, I>(
    commands: I,
    closed: bool,
    cache: &mut GeometryCache,
    params: &TessellateParams,
) -> TessellationReport
where
    I: IntoIterator<Item = &'a PathCommand>,
{
    let mut tessellator = PathTessellator::new(cache, *params).with_closed_subpaths(closed);
    for command in commands {
        if let Err(err) = command.apply(&mut tessellator) {
            warn!(command = command.name(), error = %err, "skipping path command");
        }
    }
    let report = tessellator.into_report();
    info!(
        subpaths = report.subpaths,
        polylines = report.polylines,
        splines = report.splines,
        failed = report.failed,
        "path tessellated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spline_types::SplineEntity;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn vertices_2d(curve: &Polyline3d) -> Vec<(f64, f64)> {
        curve.vertices().iter().map(|v| (v.x, v.y)).collect()
    }

    fn run(commands: &[PathCommand], closed: bool) -> (GeometryCache, TessellationReport) {
        let mut cache = GeometryCache::new();
        let report = tessellate(commands, closed, &mut cache, &TessellateParams::default());
        (cache, report)
    }

    #[test]
    fn test_lines_merge_into_one_polyline() {
        let (cache, report) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(1.0, 0.0)),
                PathCommand::LineTo(p(2.0, 1.0)),
                PathCommand::LineTo(p(3.0, 0.0)),
            ],
            false,
        );
        assert_eq!(report.polylines, 1);
        assert_eq!(cache.polylines().len(), 1);
        assert_eq!(
            vertices_2d(&cache.polylines()[0].polyline),
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 1.0), (3.0, 0.0)]
        );
        assert!(cache.splines().is_empty());
    }

    #[test]
    fn test_move_to_flushes_and_starts_subpath() {
        let (cache, report) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(1.0, 0.0)),
                PathCommand::MoveTo(p(5.0, 5.0)),
                PathCommand::LineTo(p(6.0, 5.0)),
            ],
            false,
        );
        assert_eq!(report.subpaths, 2);
        assert_eq!(cache.polylines().len(), 2);
        assert_eq!(cache.polylines()[0].subpath, 0);
        assert_eq!(cache.polylines()[1].subpath, 1);
        assert_eq!(vertices_2d(&cache.polylines()[1].polyline), vec![(5.0, 5.0), (6.0, 5.0)]);
    }

    #[test]
    fn test_bezier_chain_knots() {
        let (cache, report) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::BezierTo(p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)),
                PathCommand::BezierTo(p(1.0, -1.0), p(2.0, -1.0), p(2.0, 0.0)),
            ],
            false,
        );
        assert_eq!(report.splines, 1);
        let curve = &cache.splines()[0].curve;
        assert_eq!(curve.degree(), 3);
        assert_eq!(curve.num_control_points(), 7);
        assert!(!curve.is_rational());
        assert_eq!(
            curve.knots().as_slice(),
            &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]
        );
        // Triple interior knots make the joint interpolate.
        assert_relative_eq!(curve.eval_point(1.0).coords, Point3::new(1.0, 0.0, 0.0).coords, epsilon = 1e-12);
        assert_relative_eq!(curve.end_point().coords, Point3::new(2.0, 0.0, 0.0).coords, epsilon = 1e-12);
    }

    #[test]
    fn test_kind_switch_carries_last_point() {
        let (cache, _) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::BezierTo(p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)),
                PathCommand::LineTo(p(3.0, 0.0)),
            ],
            false,
        );
        assert_eq!(cache.splines().len(), 1);
        assert_eq!(vertices_2d(&cache.polylines()[0].polyline), vec![(1.0, 0.0), (3.0, 0.0)]);
    }

    #[test]
    fn test_close_line_run_appends_start() {
        let (cache, _) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(1.0, 0.0)),
                PathCommand::LineTo(p(1.0, 1.0)),
                PathCommand::Close,
            ],
            false,
        );
        assert_eq!(cache.polylines().len(), 1);
        let curve = &cache.polylines()[0].polyline;
        assert_eq!(vertices_2d(curve), vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(curve.is_closed());
    }

    #[test]
    fn test_close_flag_skips_already_closed_subpath() {
        let (cache, _) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(1.0, 0.0)),
                PathCommand::LineTo(p(0.0, 1.0)),
                PathCommand::LineTo(p(0.0, 0.0)),
            ],
            true,
        );
        assert_eq!(cache.polylines()[0].polyline.vertices().len(), 4);
    }

    #[test]
    fn test_close_flag_closes_each_subpath() {
        let (cache, report) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(1.0, 0.0)),
                PathCommand::LineTo(p(0.0, 1.0)),
                PathCommand::MoveTo(p(5.0, 0.0)),
                PathCommand::BezierTo(p(5.0, 1.0), p(6.0, 1.0), p(6.0, 0.0)),
            ],
            true,
        );
        assert_eq!(report.subpaths, 2);
        assert_eq!(report.splines, 1);
        assert_eq!(report.polylines, 2);
        assert!(cache.polylines()[0].polyline.is_closed());
        assert_eq!(vertices_2d(&cache.polylines()[1].polyline), vec![(6.0, 0.0), (5.0, 0.0)]);
        assert_eq!(cache.polylines()[1].subpath, 1);
    }

    #[test]
    fn test_zero_length_segments_dropped() {
        let (cache, report) = run(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(0.0, 0.0)),
                PathCommand::LineTo(p(1.0, 0.0)),
                PathCommand::LineTo(p(1.0, 1e-12)),
                PathCommand::BezierTo(p(1.0, 0.0), p(1.0, 0.0), p(1.0, 0.0)),
            ],
            false,
        );
        assert_eq!(report.dropped_segments, 3);
        assert_eq!(report.splines, 0);
        assert_eq!(vertices_2d(&cache.polylines()[0].polyline), vec![(0.0, 0.0), (1.0, 0.0)]);
    }

    #[test]
    fn test_lone_move_to_emits_nothing() {
        let (cache, report) = run(
            &[PathCommand::MoveTo(p(0.0, 0.0)), PathCommand::Close],
            true,
        );
        assert!(cache.is_empty());
        assert_eq!(report.subpaths, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_command_without_current_point_rejected() {
        let mut cache = GeometryCache::new();
        let mut tessellator = PathTessellator::new(&mut cache, TessellateParams::default());
        assert_eq!(
            tessellator.line_to(p(1.0, 1.0)),
            Err(TessellateError::NoCurrentPoint { command: "line_to" })
        );
        assert!(tessellator.bezier_to(p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)).is_err());

        tessellator.move_to(p(0.0, 0.0));
        tessellator.line_to(p(1.0, 0.0)).unwrap();
        let report = tessellator.into_report();
        assert_eq!(report.rejected_commands, 2);
        assert_eq!(report.polylines, 1);
        assert_eq!(cache.polylines().len(), 1);
    }

    #[test]
    fn test_elevation_and_curve_tolerance() {
        let params = TessellateParams::default()
            .with_elevation(3.0)
            .with_curve_tolerance(spline_types::Tolerance::uniform(1e-4));
        let mut cache = GeometryCache::new();
        tessellate(
            &[
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::BezierTo(p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)),
            ],
            false,
            &mut cache,
            &params,
        );
        let curve = &cache.splines()[0].curve;
        assert_eq!(*curve.tolerance(), spline_types::Tolerance::uniform(1e-4));
        assert!(curve.control_points().iter().all(|c| (c.z - 3.0).abs() < f64::EPSILON));
    }
}
