//! Knot vectors.
//!
//! A knot vector is a non-decreasing sequence of parameter values that
//! partitions a spline's domain into polynomial spans. Knots closer together
//! than the vector's tolerance are treated as one logical knot whose
//! multiplicity is the length of the run.

use crate::{GeometryError, Result};
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance used to decide whether two knots coincide.
pub const DEFAULT_KNOT_TOLERANCE: f64 = 1e-9;

/// A closed parameter interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnotInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl KnotInterval {
    /// Create an interval.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Length of the interval.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check whether `param` lies within the interval (bounds included).
    #[must_use]
    pub fn contains(&self, param: f64) -> bool {
        param >= self.lower && param <= self.upper
    }
}

/// An ordered sequence of knots with tolerance-based equality.
///
/// Construction from a raw array does not validate ordering; use
/// [`KnotVector::is_monotonic`] when the source is untrusted. All mutators
/// other than [`KnotVector::insert_at`] keep an ordered vector ordered.
///
/// # Example
///
/// ```
/// use spline_types::KnotVector;
///
/// let mut knots = KnotVector::from_knots(vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0]);
/// knots.insert(1.0).unwrap();
///
/// let (values, mults) = knots.distinct_knots();
/// assert_eq!(values, vec![0.0, 1.0, 2.0]);
/// assert_eq!(mults, vec![3, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnotVector {
    /// Raw knot values.
    knots: Vec<f64>,
    /// Coincidence tolerance.
    tolerance: f64,
}

impl Default for KnotVector {
    fn default() -> Self {
        Self::new()
    }
}

impl KnotVector {
    /// Create an empty knot vector with the default tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_KNOT_TOLERANCE)
    }

    /// Create an empty knot vector with the given tolerance.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            knots: Vec::new(),
            tolerance: tolerance.abs(),
        }
    }

    /// Wrap a raw array of knots. The array is taken as is.
    #[must_use]
    pub fn from_knots(knots: Vec<f64>) -> Self {
        Self::from_knots_with_tolerance(knots, DEFAULT_KNOT_TOLERANCE)
    }

    /// Wrap a raw array of knots with an explicit tolerance.
    #[must_use]
    pub fn from_knots_with_tolerance(knots: Vec<f64>, tolerance: f64) -> Self {
        Self {
            knots,
            tolerance: tolerance.abs(),
        }
    }

    /// Build an open-uniform (clamped) knot vector.
    ///
    /// The result has `degree + 1` copies of `lower` and `upper` and
    /// `num_spans - 1` evenly spaced simple interior knots.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `num_spans` is zero or the
    /// range is empty.
    pub fn open_uniform(degree: usize, num_spans: usize, lower: f64, upper: f64) -> Result<Self> {
        if num_spans == 0 {
            return Err(GeometryError::invalid_input("open-uniform vector needs at least one span"));
        }
        if lower >= upper {
            return Err(GeometryError::invalid_input(format!(
                "empty knot range [{lower}, {upper}]"
            )));
        }

        let mut knots = Vec::with_capacity(2 * (degree + 1) + num_spans - 1);
        knots.extend(std::iter::repeat_n(lower, degree + 1));
        let step = (upper - lower) / num_spans as f64;
        for i in 1..num_spans {
            knots.push(lower + step * i as f64);
        }
        knots.extend(std::iter::repeat_n(upper, degree + 1));

        Ok(Self::from_knots(knots))
    }

    /// Number of raw knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Check if the vector holds no knots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// The raw knot values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.knots
    }

    /// Iterate over the raw knot values.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.knots.iter().copied()
    }

    /// Get a knot by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.knots.get(index).copied()
    }

    /// Get a knot by index.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index >= len()`.
    pub fn try_at(&self, index: usize) -> Result<f64> {
        self.get(index)
            .ok_or_else(|| GeometryError::invalid_index(index, self.knots.len()))
    }

    /// First knot, if any.
    #[must_use]
    pub fn first(&self) -> Option<f64> {
        self.knots.first().copied()
    }

    /// Last knot, if any.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.knots.last().copied()
    }

    /// The coincidence tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Set the coincidence tolerance.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance.abs();
    }

    /// Check that every knot is less than or equal to its successor.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.knots.windows(2).all(|w| w[0] <= w[1])
    }

    /// Compare two knot vectors knot by knot within this vector's tolerance.
    #[must_use]
    pub fn is_equal(&self, other: &Self) -> bool {
        self.knots.len() == other.knots.len()
            && self
                .knots
                .iter()
                .zip(&other.knots)
                .all(|(a, b)| (a - b).abs() <= self.tolerance)
    }

    /// Insert `value` repeated `multiplicity` times before `index`.
    ///
    /// The caller is responsible for choosing an index that keeps the vector
    /// ordered; this method does not sort.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index > len()` and
    /// [`GeometryError::InvalidInput`] for a zero multiplicity or a
    /// non-finite value.
    pub fn insert_at(&mut self, index: usize, value: f64, multiplicity: usize) -> Result<()> {
        if index > self.knots.len() {
            return Err(GeometryError::invalid_index(index, self.knots.len()));
        }
        if multiplicity == 0 {
            return Err(GeometryError::invalid_input("multiplicity must be at least 1"));
        }
        if !value.is_finite() {
            return Err(GeometryError::invalid_input(format!("knot value {value} is not finite")));
        }
        self.knots
            .splice(index..index, std::iter::repeat_n(value, multiplicity));
        Ok(())
    }

    /// Insert `param` at its sorted position and return the index it landed at.
    ///
    /// A parameter within tolerance of an existing knot is snapped to that
    /// knot, raising its multiplicity by one instead of creating a nearby
    /// distinct value.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `param` is not finite or
    /// lies outside `[first, last]` of a non-empty vector.
    pub fn insert(&mut self, param: f64) -> Result<usize> {
        if !param.is_finite() {
            return Err(GeometryError::invalid_input(format!("knot value {param} is not finite")));
        }
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            self.knots.push(param);
            return Ok(0);
        };
        if param < first - self.tolerance || param > last + self.tolerance {
            return Err(GeometryError::invalid_input(format!(
                "knot {param} outside knot range [{first}, {last}]"
            )));
        }

        for (i, &knot) in self.knots.iter().enumerate() {
            if (knot - param).abs() <= self.tolerance {
                self.knots.insert(i, knot);
                return Ok(i);
            }
            if knot > param {
                self.knots.insert(i, param);
                return Ok(i);
            }
        }

        // Only reachable when `param` sits within tolerance above `last`,
        // which the scan above already matched; kept for completeness.
        self.knots.push(param);
        Ok(self.knots.len() - 1)
    }

    /// Remove the knot at `index` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<f64> {
        if index >= self.knots.len() {
            return Err(GeometryError::invalid_index(index, self.knots.len()));
        }
        Ok(self.knots.remove(index))
    }

    /// Remove the knots in `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `start > end` and
    /// [`GeometryError::InvalidIndex`] if `end >= len()`.
    pub fn remove_sub_vector(&mut self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(GeometryError::invalid_input(format!(
                "inverted knot range {start}..={end}"
            )));
        }
        if end >= self.knots.len() {
            return Err(GeometryError::invalid_index(end, self.knots.len()));
        }
        self.knots.drain(start..=end);
        Ok(())
    }

    /// Append a knot at the end.
    ///
    /// A value within tolerance below the last knot is snapped up to it.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `value` is not finite or
    /// lies below the last knot by more than the tolerance.
    pub fn append(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(GeometryError::invalid_input(format!("knot value {value} is not finite")));
        }
        match self.last() {
            Some(last) if value < last - self.tolerance => Err(GeometryError::invalid_input(
                format!("appended knot {value} is below last knot {last}"),
            )),
            Some(last) => {
                self.knots.push(value.max(last));
                Ok(())
            }
            None => {
                self.knots.push(value);
                Ok(())
            }
        }
    }

    /// Append another knot vector.
    ///
    /// The tail is shifted so that its first knot coincides with this
    /// vector's last knot; its remaining knots are then appended. With
    /// `knot_ratio > 0` the tail is also scaled so its length is
    /// `knot_ratio` times the length of this vector.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] for a negative or non-finite
    /// ratio.
    pub fn append_vector(&mut self, tail: &Self, knot_ratio: f64) -> Result<()> {
        if !knot_ratio.is_finite() || knot_ratio < 0.0 {
            return Err(GeometryError::invalid_input(format!(
                "knot ratio {knot_ratio} must be finite and non-negative"
            )));
        }
        let (Some(tail_first), Some(tail_last)) = (tail.first(), tail.last()) else {
            return Ok(());
        };
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            self.knots.clone_from(&tail.knots);
            return Ok(());
        };

        let own_length = last - first;
        let tail_length = tail_last - tail_first;
        let scale = if knot_ratio > 0.0 && tail_length > 0.0 && own_length > 0.0 {
            knot_ratio * own_length / tail_length
        } else {
            1.0
        };

        self.knots.reserve(tail.len().saturating_sub(1));
        for &knot in &tail.knots[1..] {
            self.knots.push(last + (knot - tail_first) * scale);
        }
        Ok(())
    }

    /// Multiplicity of the knot at `index`.
    ///
    /// Counts the consecutive entries around `index` that lie within
    /// tolerance of `self[index]`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidIndex`] if `index >= len()`.
    pub fn multiplicity_at(&self, index: usize) -> Result<usize> {
        let value = self.try_at(index)?;
        let same = |k: f64| (k - value).abs() <= self.tolerance;
        let before = self.knots[..index]
            .iter()
            .rev()
            .take_while(|&&k| same(k))
            .count();
        let after = self.knots[index + 1..]
            .iter()
            .take_while(|&&k| same(k))
            .count();
        Ok(before + 1 + after)
    }

    /// Number of knots within tolerance of `param`.
    #[must_use]
    pub fn multiplicity_of(&self, param: f64) -> usize {
        self.knots
            .iter()
            .filter(|&&k| (k - param).abs() <= self.tolerance)
            .count()
    }

    /// Check whether `param` coincides with a knot.
    #[must_use]
    pub fn is_on_knot(&self, param: f64) -> bool {
        self.multiplicity_of(param) > 0
    }

    /// Collapse runs of coincident knots.
    ///
    /// Returns the run head values and their multiplicities. The
    /// multiplicities always sum to [`KnotVector::len`].
    #[must_use]
    pub fn distinct_knots(&self) -> (Vec<f64>, Vec<usize>) {
        let mut values: Vec<f64> = Vec::new();
        let mut mults: Vec<usize> = Vec::new();

        for &knot in &self.knots {
            match (values.last(), mults.last_mut()) {
                (Some(&head), Some(count)) if (knot - head).abs() <= self.tolerance => {
                    *count += 1;
                }
                _ => {
                    values.push(knot);
                    mults.push(1);
                }
            }
        }

        (values, mults)
    }

    /// Number of non-empty intervals between distinct knots.
    #[must_use]
    pub fn num_intervals(&self) -> usize {
        self.distinct_knots().0.len().saturating_sub(1)
    }

    /// Locate the knot span that contains `param`.
    ///
    /// Returns the index `i` with `knots[i] <= param < knots[i + 1]` together
    /// with the span bounds. Only spans inside the domain of a spline of the
    /// given `order` are considered, i.e. `param` is expected in
    /// `[knots[order - 1], knots[len - order]]`; values outside are clamped to
    /// the first or last span.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `order` is zero or the
    /// vector is too short for that order.
    pub fn get_interval(&self, order: usize, param: f64) -> Result<(usize, KnotInterval)> {
        if order == 0 || self.knots.len() < 2 * order {
            return Err(GeometryError::invalid_input(format!(
                "{} knots cannot support order {order}",
                self.knots.len()
            )));
        }

        let low = order - 1;
        let high = self.knots.len() - order;
        let span = find_span_in(&self.knots, low, high, param);
        Ok((span, KnotInterval::new(self.knots[span], self.knots[span + 1])))
    }

    /// Split the vector at `param`.
    ///
    /// Knots below `param` go to the head, knots above to the tail; knots
    /// coinciding with `param` are dropped and replaced by `head_mult`
    /// copies closing the head and `tail_mult` copies opening the tail.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] unless `param` lies strictly
    /// inside `(first, last)`.
    pub fn split(&self, param: f64, head_mult: usize, tail_mult: usize) -> Result<(Self, Self)> {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Err(GeometryError::invalid_input("cannot split an empty knot vector"));
        };
        if !(param > first + self.tolerance && param < last - self.tolerance) {
            return Err(GeometryError::invalid_input(format!(
                "split parameter {param} not inside ({first}, {last})"
            )));
        }

        let mut head: Vec<f64> = self
            .knots
            .iter()
            .copied()
            .filter(|&k| k < param - self.tolerance)
            .collect();
        head.extend(std::iter::repeat_n(param, head_mult));

        let mut tail: Vec<f64> = std::iter::repeat_n(param, tail_mult).collect();
        tail.extend(
            self.knots
                .iter()
                .copied()
                .filter(|&k| k > param + self.tolerance),
        );

        Ok((
            Self::from_knots_with_tolerance(head, self.tolerance),
            Self::from_knots_with_tolerance(tail, self.tolerance),
        ))
    }

    /// Affinely rescale the knots so the first equals `lower` and the last
    /// equals `upper`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] if `lower >= upper` or the
    /// vector has fewer than two knots, and [`GeometryError::Degenerate`] if
    /// all knots coincide.
    pub fn set_range(&mut self, lower: f64, upper: f64) -> Result<()> {
        if lower >= upper || !lower.is_finite() || !upper.is_finite() {
            return Err(GeometryError::invalid_input(format!(
                "invalid knot range [{lower}, {upper}]"
            )));
        }
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Err(GeometryError::invalid_input("cannot rescale an empty knot vector"));
        };
        if self.knots.len() < 2 {
            return Err(GeometryError::invalid_input("cannot rescale a single knot"));
        }
        let length = last - first;
        if length <= 0.0 {
            return Err(GeometryError::degenerate("knot vector has zero length"));
        }

        let scale = (upper - lower) / length;
        for knot in &mut self.knots {
            *knot = if *knot == first {
                lower
            } else if *knot == last {
                upper
            } else {
                lower + (*knot - first) * scale
            };
        }
        Ok(())
    }

    /// Reverse the parameter direction, keeping the same range.
    pub fn reverse(&mut self) {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return;
        };
        self.knots.reverse();
        for knot in &mut self.knots {
            *knot = first + last - *knot;
        }
    }
}

impl Index<usize> for KnotVector {
    type Output = f64;

    /// # Panics
    ///
    /// Panics if `index >= len()`. Use [`KnotVector::try_at`] for a checked
    /// lookup.
    fn index(&self, index: usize) -> &f64 {
        &self.knots[index]
    }
}

impl From<Vec<f64>> for KnotVector {
    fn from(knots: Vec<f64>) -> Self {
        Self::from_knots(knots)
    }
}

/// Find `i` in `[low, high)` with `knots[i] <= param < knots[i + 1]`.
///
/// Parameters at or beyond `knots[high]` resolve to the last non-empty span
/// and parameters below `knots[low]` to `low`.
pub(crate) fn find_span_in(knots: &[f64], low: usize, high: usize, param: f64) -> usize {
    if param >= knots[high] {
        let mut span = high - 1;
        while span > low && knots[span] >= knots[span + 1] {
            span -= 1;
        }
        return span;
    }
    if param <= knots[low] {
        let mut span = low;
        while span + 1 < high && knots[span + 1] <= knots[low] {
            span += 1;
        }
        return span;
    }

    let mut lo = low;
    let mut hi = high;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if knots[mid] > param {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn cubic_knots() -> KnotVector {
        KnotVector::from_knots(vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0])
    }

    #[test]
    fn test_open_uniform() {
        let knots = KnotVector::open_uniform(3, 2, 0.0, 1.0).unwrap();
        assert_eq!(knots.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]);
        assert!(KnotVector::open_uniform(3, 0, 0.0, 1.0).is_err());
        assert!(KnotVector::open_uniform(3, 2, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_try_at_out_of_range() {
        let knots = cubic_knots();
        assert_eq!(knots.try_at(4).unwrap(), 1.0);
        let err = knots.try_at(10).unwrap_err();
        assert!(err.is_invalid_index());
    }

    #[test]
    fn test_insert_snaps_to_existing_knot() {
        let mut knots = cubic_knots();
        let index = knots.insert(1.0 + 1e-12).unwrap();
        assert_eq!(index, 4);
        assert_eq!(knots.len(), 11);
        assert_eq!(knots[4], 1.0);
        assert_eq!(knots[5], 1.0);
        assert_eq!(knots.multiplicity_at(5).unwrap(), 2);
        assert!(knots.is_monotonic());
    }

    #[test]
    fn test_insert_new_value() {
        let mut knots = cubic_knots();
        let index = knots.insert(1.5).unwrap();
        assert_eq!(index, 5);
        assert_eq!(knots[5], 1.5);
        assert!(knots.is_monotonic());
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut knots = cubic_knots();
        assert!(knots.insert(-1.0).unwrap_err().is_invalid_input());
        assert!(knots.insert(3.5).unwrap_err().is_invalid_input());
        assert_eq!(knots.len(), 10);
    }

    #[test]
    fn test_insert_at_multiplicity() {
        let mut knots = cubic_knots();
        knots.insert_at(5, 1.5, 2).unwrap();
        assert_eq!(knots.len(), 12);
        assert_eq!(knots.multiplicity_at(5).unwrap(), 2);
        assert!(knots.insert_at(13, 4.0, 1).unwrap_err().is_invalid_index());
        assert!(knots.insert_at(0, 0.0, 0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_multiplicity() {
        let knots = cubic_knots();
        assert_eq!(knots.multiplicity_at(0).unwrap(), 4);
        assert_eq!(knots.multiplicity_at(2).unwrap(), 4);
        assert_eq!(knots.multiplicity_at(4).unwrap(), 1);
        assert_eq!(knots.multiplicity_of(3.0), 4);
        assert_eq!(knots.multiplicity_of(2.5), 0);
        assert!(knots.multiplicity_at(10).is_err());
    }

    #[test]
    fn test_distinct_knots_sum() {
        let knots = KnotVector::from_knots(vec![0.0, 0.0, 0.5, 0.5 + 1e-12, 0.75, 1.0, 1.0]);
        let (values, mults) = knots.distinct_knots();
        assert_eq!(values, vec![0.0, 0.5, 0.75, 1.0]);
        assert_eq!(mults, vec![2, 2, 1, 2]);
        assert_eq!(mults.iter().sum::<usize>(), knots.len());
        assert_eq!(knots.num_intervals(), 3);
    }

    #[test]
    fn test_get_interval() {
        let knots = cubic_knots();
        let (span, interval) = knots.get_interval(4, 1.5).unwrap();
        assert_eq!(span, 4);
        assert_eq!(interval, KnotInterval::new(1.0, 2.0));

        let (span, _) = knots.get_interval(4, 0.0).unwrap();
        assert_eq!(span, 3);

        // End of domain resolves to the last non-empty span.
        let (span, interval) = knots.get_interval(4, 3.0).unwrap();
        assert_eq!(span, 5);
        assert_eq!(interval, KnotInterval::new(2.0, 3.0));

        assert!(knots.get_interval(0, 1.0).is_err());
        assert!(knots.get_interval(6, 1.0).is_err());
    }

    #[test]
    fn test_split() {
        let knots = cubic_knots();
        let (head, tail) = knots.split(1.5, 4, 4).unwrap();
        assert_eq!(head.as_slice(), &[0.0, 0.0, 0.0, 0.0, 1.0, 1.5, 1.5, 1.5, 1.5]);
        assert_eq!(tail.as_slice(), &[1.5, 1.5, 1.5, 1.5, 2.0, 3.0, 3.0, 3.0, 3.0]);

        // Splitting at an existing knot replaces it.
        let (head, tail) = knots.split(1.0, 2, 3).unwrap();
        assert_eq!(head.as_slice(), &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(tail.as_slice(), &[1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0]);

        assert!(knots.split(0.0, 1, 1).unwrap_err().is_invalid_input());
        assert!(knots.split(4.0, 1, 1).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_set_range() {
        let mut knots = cubic_knots();
        knots.set_range(10.0, 16.0).unwrap();
        assert_eq!(knots[0], 10.0);
        assert_eq!(knots[4], 12.0);
        assert_eq!(knots[5], 14.0);
        assert_eq!(knots[9], 16.0);

        assert!(knots.set_range(1.0, 1.0).unwrap_err().is_invalid_input());
        let mut flat = KnotVector::from_knots(vec![2.0, 2.0]);
        assert!(flat.set_range(0.0, 1.0).unwrap_err().is_degenerate());
    }

    #[test]
    fn test_append_and_append_vector() {
        let mut knots = KnotVector::from_knots(vec![0.0, 0.0, 1.0]);
        knots.append(2.0).unwrap();
        assert!(knots.append(1.0).unwrap_err().is_invalid_input());
        assert_eq!(knots.len(), 4);

        let tail = KnotVector::from_knots(vec![5.0, 6.0, 7.0]);
        knots.append_vector(&tail, 0.0).unwrap();
        assert_eq!(knots.as_slice(), &[0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);

        let mut scaled = KnotVector::from_knots(vec![0.0, 1.0]);
        scaled.append_vector(&tail, 2.0).unwrap();
        assert_eq!(scaled.as_slice(), &[0.0, 1.0, 2.0, 3.0]);

        assert!(scaled.append_vector(&tail, -1.0).is_err());
    }

    #[test]
    fn test_remove() {
        let mut knots = cubic_knots();
        assert_eq!(knots.remove_at(4).unwrap(), 1.0);
        assert!(knots.remove_at(9).unwrap_err().is_invalid_index());

        knots.remove_sub_vector(0, 1).unwrap();
        assert_eq!(knots.len(), 7);
        assert!(knots.remove_sub_vector(3, 2).unwrap_err().is_invalid_input());
        assert!(knots.remove_sub_vector(3, 7).unwrap_err().is_invalid_index());
    }

    #[test]
    fn test_reverse() {
        let mut knots = KnotVector::from_knots(vec![0.0, 0.0, 1.0, 3.0, 3.0]);
        knots.reverse();
        assert_eq!(knots.as_slice(), &[0.0, 0.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_is_equal_uses_tolerance() {
        let a = KnotVector::from_knots(vec![0.0, 1.0, 2.0]);
        let b = KnotVector::from_knots(vec![0.0, 1.0 + 1e-12, 2.0]);
        let c = KnotVector::from_knots(vec![0.0, 1.1, 2.0]);
        assert!(a.is_equal(&b));
        assert!(!a.is_equal(&c));
    }
}
