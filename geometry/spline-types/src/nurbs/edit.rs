//! Shape-preserving structural edits.
//!
//! Every edit runs on a homogeneous copy of the control data and commits
//! only on success, so a failing call leaves the curve untouched. Any edit
//! that changes control data drops fit data.

use super::homogeneous::{rewrap_periodic, unwrap_periodic, Homogeneous};
use super::{NurbsCurve, MAX_DEGREE};
use crate::{GeometryError, KnotVector, Result, SplineEntity};
use nalgebra::{Point3, Vector3, Vector4};
use tracing::debug;

impl NurbsCurve {
    /// Insert `param` as a new knot, without snapping to nearby knots.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `param` is outside the
    /// domain or its multiplicity would exceed the degree.
    pub fn add_knot(&mut self, param: f64) -> Result<()> {
        self.insert_knot_value(param)
    }

    /// Insert a knot at `param`.
    ///
    /// A parameter within the knot tolerance of an existing knot raises that
    /// knot's multiplicity instead of adding a nearly coincident one.
    ///
    /// # Errors
    ///
    /// Same as [`NurbsCurve::add_knot`].
    pub fn insert_knot(&mut self, param: f64) -> Result<()> {
        let tol = self.knots.tolerance();
        let snapped = self
            .knots
            .iter()
            .find(|k| (k - param).abs() <= tol)
            .unwrap_or(param);
        self.insert_knot_value(snapped)
    }

    fn insert_knot_value(&mut self, param: f64) -> Result<()> {
        let (lo, hi) = (self.start_param(), self.end_param());
        if !(lo..=hi).contains(&param) {
            return Err(GeometryError::invalid_input(format!(
                "knot {param} outside domain [{lo}, {hi}]"
            )));
        }

        if self.periodic {
            // The seam is one knot; insert it at the start of the period.
            let u = if param == hi { lo } else { param };
            let m = self.control_points.len() - 1;
            let period = hi - lo;
            let mut open = self.lifted_unwrapped(m);
            open.insert(u - period, 1)?;
            open.insert(u, 1)?;
            open.insert(u + period, 1)?;
            let start = m + self.degree + 1;
            let (knots, points) = rewrap_periodic(&open.knots, &open.points, start, m + 1);
            self.commit(
                Homogeneous {
                    degree: self.degree,
                    knots,
                    points,
                },
                true,
                self.is_rational(),
            );
        } else {
            let mut open = self.lifted();
            open.insert(param, 1)?;
            self.commit(open, false, self.is_rational());
        }

        debug!(
            param,
            num_knots = self.knots.len(),
            periodic = self.periodic,
            "Inserted knot"
        );
        Ok(())
    }

    /// Raise the degree by `plus` without changing the shape.
    ///
    /// Open curves are clamped first. Periodic curves are elevated in their
    /// clamped form and wrapped again.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDegree`] if the new degree exceeds
    /// [`MAX_DEGREE`].
    pub fn elevate_degree(&mut self, plus: usize) -> Result<()> {
        if plus == 0 {
            return Ok(());
        }
        let target = self.degree + plus;
        if target > MAX_DEGREE {
            return Err(GeometryError::InvalidDegree {
                degree: target,
                min: 1,
                max: MAX_DEGREE,
            });
        }

        if self.periodic {
            let mut work = self.clone();
            work.make_non_periodic()?;
            work.elevate_degree(plus)?;
            work.make_periodic()?;
            *self = work;
        } else {
            let elevated = self.lifted().clamped(self.knots.tolerance())?.elevate(plus);
            self.commit(elevated, false, self.is_rational());
        }

        debug!(
            degree = self.degree,
            num_control_points = self.control_points.len(),
            "Elevated degree"
        );
        Ok(())
    }

    /// Cut the curve down to `[start, end]`.
    ///
    /// The result is clamped and non-periodic.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if the interval is inverted,
    /// empty or leaves the domain.
    pub fn hard_trim_by_params(&mut self, start: f64, end: f64) -> Result<()> {
        let (lo, hi) = (self.start_param(), self.end_param());
        if start >= end || start < lo || end > hi {
            return Err(GeometryError::invalid_input(format!(
                "trim interval [{start}, {end}] invalid for domain [{lo}, {hi}]"
            )));
        }
        let trimmed = self.open_form().trim(start, end, self.knots.tolerance())?;
        self.commit(trimmed, false, self.is_rational());
        debug!(start, end, "Trimmed curve");
        Ok(())
    }

    /// Split at `param` into a head on `[start, param]` and a tail on
    /// `[param, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] unless `param` lies strictly
    /// inside the domain.
    pub fn split_at(&self, param: f64) -> Result<(Self, Self)> {
        let (lo, hi) = (self.start_param(), self.end_param());
        if param <= lo || param >= hi {
            return Err(GeometryError::invalid_input(format!(
                "split parameter {param} not inside domain ({lo}, {hi})"
            )));
        }
        let mut head = self.clone();
        head.hard_trim_by_params(lo, param)?;
        let mut tail = self.clone();
        tail.hard_trim_by_params(param, hi)?;
        Ok((head, tail))
    }

    /// Append `other` to the end of this curve.
    ///
    /// # Errors
    ///
    /// See [`NurbsCurve::join_with_ratio`].
    pub fn join_with(&mut self, other: &Self) -> Result<()> {
        self.join_with_ratio(other, 0.0)
    }

    /// Append `other`, scaling its parameter range to `knot_ratio` times
    /// this curve's range (`0` keeps its own length).
    ///
    /// Degrees and rationality are unified first. The shared end point is
    /// stored once.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if either curve is periodic or
    /// closed, and [`GeometryError::CannotJoin`] if this curve's end is
    /// farther than the point tolerance from `other`'s start.
    pub fn join_with_ratio(&mut self, other: &Self, knot_ratio: f64) -> Result<()> {
        if self.periodic || other.periodic {
            return Err(GeometryError::invalid_input("cannot join periodic curves"));
        }
        if self.is_closed_within(&self.tolerance) || other.is_closed_within(&self.tolerance) {
            return Err(GeometryError::invalid_input("cannot join closed curves"));
        }
        let gap = (other.start_point() - self.end_point()).norm();
        if gap > self.tolerance.equal_point {
            return Err(GeometryError::CannotJoin { gap });
        }

        let ktol = self.knots.tolerance();
        let mut head = self.lifted().clamped(ktol)?;
        let mut tail = other.lifted().clamped(ktol)?;
        if head.degree < tail.degree {
            head = head.elevate(tail.degree - head.degree);
        } else if tail.degree < head.degree {
            tail = tail.elevate(head.degree - tail.degree);
        }
        let p = head.degree;

        let rational = self.is_rational() || other.is_rational();
        if rational {
            let (Some(last), Some(first)) = (head.points.last(), tail.points.first()) else {
                return Err(GeometryError::invalid_input("empty control polygon"));
            };
            let scale = last.w / first.w;
            for h in &mut tail.points {
                *h *= scale;
            }
        }

        let mut knots = KnotVector::from_knots_with_tolerance(
            head.knots[..head.knots.len() - 1].to_vec(),
            ktol,
        );
        let tail_knots = KnotVector::from_knots_with_tolerance(tail.knots[p..].to_vec(), ktol);
        knots.append_vector(&tail_knots, knot_ratio)?;

        let mut points = head.points;
        points.extend_from_slice(&tail.points[1..]);

        self.commit(
            Homogeneous {
                degree: p,
                knots: knots.as_slice().to_vec(),
                points,
            },
            false,
            rational,
        );
        debug!(
            gap,
            knot_ratio,
            num_control_points = self.control_points.len(),
            "Joined curves"
        );
        Ok(())
    }

    /// Close the curve with a cubic bridge from its end back to its start.
    ///
    /// The bridge leaves along the end tangent and arrives along the start
    /// tangent. Already closed curves are left alone.
    ///
    /// # Errors
    ///
    /// Propagates errors from joining the bridge.
    pub fn make_closed(&mut self) -> Result<()> {
        if self.periodic || self.is_closed_within(&self.tolerance) {
            return Ok(());
        }
        let from = self.end_point();
        let to = self.start_point();
        let chord = to - from;
        let length = chord.norm();
        let fallback = chord / length;

        let unit = |v: Vector3<f64>| {
            let n = v.norm();
            if n > self.tolerance.equal_vector { v / n } else { fallback }
        };
        let leave = unit(self.derivative_at(self.end_param()));
        let arrive = unit(self.derivative_at(self.start_param()));

        let bridge = NurbsCurve::non_rational(
            3,
            KnotVector::from_knots(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
            vec![
                from,
                from + leave * (length / 3.0),
                to - arrive * (length / 3.0),
                to,
            ],
            false,
        )?
        .with_tolerance(self.tolerance);

        let mut work = self.clone();
        work.join_with_ratio(&bridge, 0.0)?;
        *self = work;
        debug!(gap = length, "Closed curve with bridge");
        Ok(())
    }

    /// Drop periodicity, keeping the shape.
    ///
    /// The result is non-periodic with unclamped ends. Non-periodic curves
    /// are unchanged.
    pub fn make_open(&mut self) {
        if !self.periodic {
            return;
        }
        let open = self.lifted_unwrapped(0);
        self.commit(open, false, self.is_rational());
        debug!(num_knots = self.knots.len(), "Opened periodic curve");
    }

    /// Convert a closed curve to the periodic representation.
    ///
    /// The curve is clamped first; its start and end control points and
    /// weights must coincide. Periodic curves are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if the curve is not closed or
    /// its end weights differ.
    pub fn make_periodic(&mut self) -> Result<()> {
        if self.periodic {
            return Ok(());
        }
        if !self.is_closed_within(&self.tolerance) {
            return Err(GeometryError::invalid_input(
                "only closed curves can be made periodic",
            ));
        }

        let p = self.degree;
        let clamped = self.lifted().clamped(self.knots.tolerance())?;
        let n = clamped.points.len();
        let (first_w, last_w) = (clamped.points[0].w, clamped.points[n - 1].w);
        if (first_w - last_w).abs() > self.tolerance.equal_point * first_w.max(1.0) {
            return Err(GeometryError::invalid_input(format!(
                "end weights {first_w} and {last_w} differ"
            )));
        }

        let knots = clamped.knots[1..clamped.knots.len() - p].to_vec();
        let mut points = clamped.points[1..].to_vec();
        points.push(clamped.points[1]);

        self.commit(
            Homogeneous {
                degree: p,
                knots,
                points,
            },
            true,
            self.is_rational(),
        );
        debug!(num_control_points = self.control_points.len(), "Made curve periodic");
        Ok(())
    }

    /// Convert a periodic curve to a clamped non-periodic one with the same
    /// shape and domain.
    ///
    /// # Errors
    ///
    /// Propagates knot insertion failures (not expected for valid curves).
    pub fn make_non_periodic(&mut self) -> Result<()> {
        if !self.periodic {
            return Ok(());
        }
        let (lo, hi) = (self.start_param(), self.end_param());
        let clamped = self.lifted_unwrapped(0).trim(lo, hi, self.knots.tolerance())?;
        self.commit(clamped, false, self.is_rational());
        debug!(num_control_points = self.control_points.len(), "Unwrapped periodic curve");
        Ok(())
    }

    /// Give a non-rational curve uniform weights of `weight`.
    ///
    /// Rational curves are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidWeight`] if `weight` is not positive.
    pub fn make_rational(&mut self, weight: f64) -> Result<()> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(GeometryError::InvalidWeight {
                index: 0,
                value: weight,
            });
        }
        if self.weights.is_none() {
            self.weights = Some(vec![weight; self.control_points.len()]);
            self.fit = None;
        }
        Ok(())
    }

    /// Reverse the parameter direction over the same domain.
    pub fn reverse_param(&mut self) {
        if self.periodic {
            let m = self.control_points.len() - 1;
            let p = self.degree;
            let lifted = self.lifted_points();
            let mut points: Vec<Vector4<f64>> = (0..m)
                .map(|i| {
                    let src = (m as isize - i as isize - p as isize - 1).rem_euclid(m as isize);
                    lifted[src as usize]
                })
                .collect();
            points.push(points[0]);
            let mut knots = self.knots.clone();
            knots.reverse();
            self.commit(
                Homogeneous {
                    degree: p,
                    knots: knots.as_slice().to_vec(),
                    points,
                },
                true,
                self.is_rational(),
            );
        } else {
            let reversed = self.lifted().reversed();
            self.commit(reversed, false, self.is_rational());
        }
    }

    fn lifted_points(&self) -> Vec<Vector4<f64>> {
        self.control_points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let w = self.weights.as_ref().map_or(1.0, |w| w[i]);
                Vector4::new(p.x * w, p.y * w, p.z * w, w)
            })
            .collect()
    }

    /// Homogeneous copy of the stored (non-periodic) data.
    pub(super) fn lifted(&self) -> Homogeneous {
        Homogeneous {
            degree: self.degree,
            knots: self.knots.as_slice().to_vec(),
            points: self.lifted_points(),
        }
    }

    /// Homogeneous open form of a periodic curve with `pad` extra spans on
    /// either side of the period.
    fn lifted_unwrapped(&self, pad: usize) -> Homogeneous {
        let (knots, points) =
            unwrap_periodic(self.degree, self.knots.as_slice(), &self.lifted_points(), pad);
        Homogeneous {
            degree: self.degree,
            knots,
            points,
        }
    }

    /// Non-periodic homogeneous form covering the domain.
    fn open_form(&self) -> Homogeneous {
        if self.periodic {
            self.lifted_unwrapped(0)
        } else {
            self.lifted()
        }
    }

    /// Replace the control data with `form` and drop fit data.
    fn commit(&mut self, form: Homogeneous, periodic: bool, rational: bool) {
        let degree = form.degree;
        let (knots, points, weights): (Vec<f64>, Vec<Point3<f64>>, Option<Vec<f64>>) =
            form.project(rational);
        self.degree = degree;
        self.knots = KnotVector::from_knots_with_tolerance(knots, self.knots.tolerance());
        self.control_points = points;
        self.weights = weights;
        self.periodic = periodic;
        self.fit = None;
    }
}
