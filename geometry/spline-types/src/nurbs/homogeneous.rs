//! Structural edits in homogeneous coordinates.
//!
//! Control points are lifted to `(w·x, w·y, w·z, w)` so that knot insertion,
//! trimming and degree elevation act on rational and non-rational curves
//! alike. The engine works on plain non-periodic B-splines; periodic curves
//! are unwrapped first.

use crate::basis::binomial;
use crate::{GeometryError, Result};
use nalgebra::{Point3, Vector4};

/// A non-periodic B-spline with homogeneous control points.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Homogeneous {
    pub(crate) degree: usize,
    pub(crate) knots: Vec<f64>,
    pub(crate) points: Vec<Vector4<f64>>,
}

impl Homogeneous {
    /// Lift Cartesian control points and optional weights.
    pub(crate) fn lift(
        degree: usize,
        knots: Vec<f64>,
        points: &[Point3<f64>],
        weights: Option<&[f64]>,
    ) -> Self {
        let points = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let w = weights.map_or(1.0, |w| w[i]);
                Vector4::new(p.x * w, p.y * w, p.z * w, w)
            })
            .collect();
        Self {
            degree,
            knots,
            points,
        }
    }

    /// Project back to Cartesian control points, keeping weights if `rational`.
    pub(crate) fn project(self, rational: bool) -> (Vec<f64>, Vec<Point3<f64>>, Option<Vec<f64>>) {
        let points = self
            .points
            .iter()
            .map(|h| Point3::new(h.x / h.w, h.y / h.w, h.z / h.w))
            .collect();
        let weights = rational.then(|| self.points.iter().map(|h| h.w).collect());
        (self.knots, points, weights)
    }

    /// Parameter domain `[knots[p], knots[n]]`.
    pub(crate) fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.points.len()])
    }

    /// Number of knots exactly equal to `u`.
    fn multiplicity(&self, u: f64) -> usize {
        self.knots.iter().filter(|&&k| k == u).count()
    }

    /// Boehm insertion of `u` repeated `times` times.
    ///
    /// Requires `u` inside the domain and `multiplicity(u) + times <= degree`.
    pub(crate) fn insert(&mut self, u: f64, times: usize) -> Result<()> {
        if times == 0 {
            return Ok(());
        }
        let p = self.degree;
        let n = self.points.len();
        let (lo, hi) = self.domain();
        if u < lo || u > hi {
            return Err(GeometryError::invalid_input(format!(
                "knot {u} outside domain [{lo}, {hi}]"
            )));
        }
        let s = self.multiplicity(u);
        if s + times > p {
            return Err(GeometryError::invalid_input(format!(
                "knot {u} would reach multiplicity {} above degree {p}",
                s + times
            )));
        }

        // Last index with knots[k] <= u.
        let k = self.knots.partition_point(|&x| x <= u) - 1;
        if k < p || k - s >= n {
            return Err(GeometryError::invalid_input(format!(
                "knot {u} has no interior span"
            )));
        }

        let old = &self.points;
        let uk = &self.knots;
        let mut q = vec![Vector4::zeros(); n + times];
        q[..=k - p].copy_from_slice(&old[..=k - p]);
        for i in k - s..n {
            q[i + times] = old[i];
        }

        let mut rw: Vec<Vector4<f64>> = old[k - p..=k - s].to_vec();
        let mut l = k - p;
        for j in 1..=times {
            l = k - p + j;
            for i in 0..=p - j - s {
                let alpha = (u - uk[l + i]) / (uk[i + k + 1] - uk[l + i]);
                rw[i] = rw[i + 1] * alpha + rw[i] * (1.0 - alpha);
            }
            q[l] = rw[0];
            q[k + times - j - s] = rw[p - j - s];
        }
        for i in l + 1..k - s {
            q[i] = rw[i - l];
        }

        let mut knots = Vec::with_capacity(uk.len() + times);
        knots.extend_from_slice(&uk[..=k]);
        knots.extend(std::iter::repeat_n(u, times));
        knots.extend_from_slice(&uk[k + 1..]);

        self.knots = knots;
        self.points = q;
        Ok(())
    }

    /// Snap `u` to a knot within `tol` and raise its multiplicity to at
    /// least `target`. Returns the snapped value.
    fn refine_to(&mut self, u: f64, target: usize, tol: f64) -> Result<f64> {
        let u = self
            .knots
            .iter()
            .copied()
            .find(|k| (k - u).abs() <= tol)
            .unwrap_or(u);
        let s = self.multiplicity(u);
        if s < target {
            self.insert(u, target - s)?;
        }
        Ok(u)
    }

    /// Restrict to `[a, b]`, producing a clamped spline on that interval.
    pub(crate) fn trim(&self, a: f64, b: f64, tol: f64) -> Result<Self> {
        let p = self.degree;
        let mut work = self.clone();
        let a = work.refine_to(a, p, tol)?;
        let b = work.refine_to(b, p, tol)?;
        if b <= a {
            return Err(GeometryError::invalid_input(format!(
                "empty trim interval [{a}, {b}]"
            )));
        }

        let a_last = work.knots.partition_point(|&x| x <= a) - 1;
        let ia = a_last + 1 - p;
        let jb = work.knots.partition_point(|&x| x < b);

        let points = work.points[ia - 1..jb].to_vec();
        let mut knots = Vec::with_capacity(points.len() + p + 1);
        knots.extend(std::iter::repeat_n(a, p + 1));
        knots.extend_from_slice(&work.knots[ia + p..jb]);
        knots.extend(std::iter::repeat_n(b, p + 1));

        Ok(Self {
            degree: p,
            knots,
            points,
        })
    }

    /// Restrict to the full domain so both ends carry `degree + 1` knots.
    pub(crate) fn clamped(&self, tol: f64) -> Result<Self> {
        let (lo, hi) = self.domain();
        self.trim(lo, hi, tol)
    }

    /// Raise the degree by `t`. Requires a clamped spline.
    pub(crate) fn elevate(&self, t: usize) -> Self {
        if t == 0 {
            return self.clone();
        }

        let p = self.degree;
        let pw = &self.points;
        let uk = &self.knots;
        let m = pw.len() + p; // last knot index
        let ph = p + t;
        let ph2 = ph / 2;

        // Bezier elevation coefficients.
        let mut bezalfs = vec![vec![0.0; p + 1]; ph + 1];
        bezalfs[0][0] = 1.0;
        bezalfs[ph][p] = 1.0;
        for i in 1..=ph2 {
            let inv = 1.0 / binomial(ph, i);
            for j in i.saturating_sub(t)..=p.min(i) {
                bezalfs[i][j] = inv * binomial(p, j) * binomial(t, i - j);
            }
        }
        for i in ph2 + 1..ph {
            for j in i.saturating_sub(t)..=p.min(i) {
                bezalfs[i][j] = bezalfs[ph - i][p - j];
            }
        }

        let capacity = (m + 1) * (t + 1) + ph + 1;
        let mut uh = vec![0.0; capacity];
        let mut qw = vec![Vector4::zeros(); capacity];
        let mut bpts: Vec<Vector4<f64>> = pw[..=p].to_vec();
        let mut ebpts = vec![Vector4::zeros(); ph + 1];
        let mut next_bpts = vec![Vector4::zeros(); p.max(1)];
        let mut alfs = vec![0.0; p.max(1)];

        let mut mh = ph;
        let mut kind = ph + 1;
        let mut r: isize = -1;
        let mut a = p;
        let mut b = p + 1;
        let mut cind = 1;
        let mut ua = uk[0];

        qw[0] = pw[0];
        uh[..=ph].fill(ua);

        while b < m {
            let i = b;
            while b < m && uk[b] == uk[b + 1] {
                b += 1;
            }
            let mul = b - i + 1;
            mh += mul + t;
            let ub = uk[b];
            let oldr = r;
            r = p as isize - mul as isize;
            let lbz = if oldr > 0 { ((oldr + 2) / 2) as usize } else { 1 };
            let rbz = if r > 0 { ph - ((r + 1) / 2) as usize } else { ph };

            // Insert ub r times to isolate the Bezier segment.
            if r > 0 {
                let numer = ub - ua;
                for k in (mul + 1..=p).rev() {
                    alfs[k - mul - 1] = numer / (uk[a + k] - ua);
                }
                let r_u = r as usize;
                for j in 1..=r_u {
                    let save = r_u - j;
                    let s = mul + j;
                    for k in (s..=p).rev() {
                        bpts[k] = bpts[k] * alfs[k - s] + bpts[k - 1] * (1.0 - alfs[k - s]);
                    }
                    next_bpts[save] = bpts[p];
                }
            }

            // Elevate the Bezier segment.
            for i in lbz..=ph {
                ebpts[i] = Vector4::zeros();
                for j in i.saturating_sub(t)..=p.min(i) {
                    ebpts[i] += bpts[j] * bezalfs[i][j];
                }
            }

            // Remove the knot ua oldr times.
            if oldr > 1 {
                let mut first = kind - 2;
                let mut last = kind;
                let den = ub - ua;
                let bet = (ub - uh[kind - 1]) / den;
                for tr in 1..oldr as usize {
                    let mut i = first;
                    let mut j = last;
                    let mut kj = j + 1 - kind;
                    while j - i > tr {
                        if i < cind {
                            let alf = (ub - uh[i]) / (ua - uh[i]);
                            qw[i] = qw[i] * alf + qw[i - 1] * (1.0 - alf);
                        }
                        if j >= lbz {
                            if (j - tr) as isize <= kind as isize - ph as isize + oldr {
                                let gam = (ub - uh[j - tr]) / den;
                                ebpts[kj] = ebpts[kj] * gam + ebpts[kj + 1] * (1.0 - gam);
                            } else {
                                ebpts[kj] = ebpts[kj] * bet + ebpts[kj + 1] * (1.0 - bet);
                            }
                        }
                        i += 1;
                        j -= 1;
                        kj -= 1;
                    }
                    first -= 1;
                    last += 1;
                }
            }

            if a != p {
                for _ in 0..(ph as isize - oldr) {
                    uh[kind] = ua;
                    kind += 1;
                }
            }

            for j in lbz..=rbz {
                qw[cind] = ebpts[j];
                cind += 1;
            }

            if b < m {
                let r_u = r.max(0) as usize;
                bpts[..r_u].copy_from_slice(&next_bpts[..r_u]);
                for j in r_u..=p {
                    bpts[j] = pw[b - p + j];
                }
                a = b;
                b += 1;
                ua = ub;
            } else {
                for i in 0..=ph {
                    uh[kind + i] = ub;
                }
            }
        }

        let num_points = mh - ph;
        uh.truncate(mh + 1);
        qw.truncate(num_points);

        Self {
            degree: ph,
            knots: uh,
            points: qw,
        }
    }

    /// Reverse the parameter direction over the same knot range.
    pub(crate) fn reversed(&self) -> Self {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        Self {
            degree: self.degree,
            knots: self.knots.iter().rev().map(|k| first + last - k).collect(),
            points: self.points.iter().rev().copied().collect(),
        }
    }
}

/// Expand a periodic knot/control structure into an ordinary B-spline.
///
/// `knots` and `items` are the periodic arrays (`m + 1` entries each, last
/// item duplicating the first). The result covers the period
/// `[knots[0], knots[m]]` plus `pad` extra spans on either side, with
/// `m + 2·pad + p` control items. Item `v` of the result is periodic item
/// `(v - p - pad) mod m`.
pub(crate) fn unwrap_periodic<T: Copy>(
    degree: usize,
    knots: &[f64],
    items: &[T],
    pad: usize,
) -> (Vec<f64>, Vec<T>) {
    let m = knots.len() - 1;
    let period = knots[m] - knots[0];
    let mi = m as isize;
    let offset = (degree + pad) as isize;

    let extended: Vec<f64> = (-offset..=mi + offset)
        .map(|i| knots[i.rem_euclid(mi) as usize] + i.div_euclid(mi) as f64 * period)
        .collect();

    let count = m + 2 * pad + degree;
    let unwrapped: Vec<T> = (0..count as isize)
        .map(|v| items[(v - offset).rem_euclid(mi) as usize])
        .collect();

    (extended, unwrapped)
}

/// Pull a periodic structure with `m` unique control items back out of an
/// unwrapped B-spline whose period starts at knot index `start`.
pub(crate) fn rewrap_periodic<T: Copy>(
    knots: &[f64],
    items: &[T],
    start: usize,
    m: usize,
) -> (Vec<f64>, Vec<T>) {
    let periodic_knots = knots[start..=start + m].to_vec();
    let mut periodic_items = items[start..start + m].to_vec();
    periodic_items.push(items[start]);
    (periodic_knots, periodic_items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{basis_functions, find_span};
    use approx::assert_relative_eq;

    fn eval(h: &Homogeneous, u: f64) -> Point3<f64> {
        let n = h.points.len();
        let span = find_span(&h.knots, h.degree, n, u);
        let basis = basis_functions(&h.knots, span, h.degree, u);
        let mut acc = Vector4::zeros();
        for (j, b) in basis.iter().enumerate() {
            acc += h.points[span - h.degree + j] * *b;
        }
        Point3::new(acc.x / acc.w, acc.y / acc.w, acc.z / acc.w)
    }

    fn quarter_circle() -> Homogeneous {
        let w = std::f64::consts::FRAC_1_SQRT_2;
        Homogeneous::lift(
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            &[
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Some(&[1.0, w, 1.0]),
        )
    }

    fn cubic() -> Homogeneous {
        Homogeneous::lift(
            3,
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 2.0],
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(2.0, -1.0, 1.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
            None,
        )
    }

    fn assert_same_shape(a: &Homogeneous, b: &Homogeneous) {
        let (lo, hi) = a.domain();
        for i in 0..=40 {
            let u = lo + (hi - lo) * f64::from(i) / 40.0;
            assert_relative_eq!(eval(a, u).coords, eval(b, u).coords, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_insert_preserves_shape() {
        let original = cubic();
        let mut refined = original.clone();
        refined.insert(0.5, 2).unwrap();
        assert_eq!(refined.points.len(), 7);
        assert_eq!(refined.knots.len(), 11);
        assert_same_shape(&original, &refined);

        let mut rational = quarter_circle();
        rational.insert(0.3, 1).unwrap();
        assert_same_shape(&quarter_circle(), &rational);
    }

    #[test]
    fn test_insert_rejects_excess_multiplicity() {
        let mut h = cubic();
        assert!(h.insert(1.0, 3).is_err());
        assert!(h.insert(5.0, 1).is_err());
        assert_eq!(h, cubic());
    }

    #[test]
    fn test_trim_endpoints() {
        let h = cubic();
        let trimmed = h.trim(0.4, 1.5, 1e-12).unwrap();
        assert_eq!(trimmed.domain(), (0.4, 1.5));
        assert_relative_eq!(eval(&trimmed, 0.4).coords, eval(&h, 0.4).coords, epsilon = 1e-12);
        assert_relative_eq!(eval(&trimmed, 1.5).coords, eval(&h, 1.5).coords, epsilon = 1e-12);
        assert_relative_eq!(eval(&trimmed, 1.0).coords, eval(&h, 1.0).coords, epsilon = 1e-12);
        assert_eq!(trimmed.knots.len(), trimmed.points.len() + 4);
    }

    #[test]
    fn test_elevate_preserves_shape() {
        let h = cubic();
        let elevated = h.elevate(1);
        assert_eq!(elevated.degree, 4);
        assert_eq!(elevated.knots.len(), elevated.points.len() + 5);
        assert_same_shape(&h, &elevated);

        let circle = quarter_circle();
        let elevated = circle.elevate(2);
        assert_eq!(elevated.degree, 4);
        assert_eq!(elevated.points.len(), 5);
        assert_same_shape(&circle, &elevated);
    }

    #[test]
    fn test_unwrap_and_rewrap() {
        let knots = [0.0, 1.0, 2.0, 3.0, 4.0];
        let items = [10, 11, 12, 13, 10];
        let (ext, unwrapped) = unwrap_periodic(1, &knots, &items, 0);
        assert_eq!(ext, vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(unwrapped, vec![13, 10, 11, 12, 13]);

        let (k, p) = rewrap_periodic(&ext, &unwrapped, 1, 4);
        assert_eq!(k, knots.to_vec());
        assert_eq!(p, vec![10, 11, 12, 13, 10]);
    }
}
