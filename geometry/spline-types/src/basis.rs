//! B-spline basis functions.
//!
//! Free functions over raw knot slices so every curve type (and the
//! homogeneous edit engine) shares the same span search and recursion.

use crate::knot::find_span_in;
use nalgebra::{Vector3, Vector4};

/// Find the knot span for `u` on a spline with `num_ctrl` control points.
///
/// Returns `i` with `knots[i] <= u < knots[i + 1]`, restricted to the domain
/// `[knots[degree], knots[num_ctrl]]`.
pub(crate) fn find_span(knots: &[f64], degree: usize, num_ctrl: usize, u: f64) -> usize {
    find_span_in(knots, degree, num_ctrl, u)
}

/// Span search that first tries `hint` and its successor.
///
/// Sequential evaluation along increasing parameters hits one of the two
/// almost always, skipping the binary search.
pub(crate) fn find_span_with_hint(
    knots: &[f64],
    degree: usize,
    num_ctrl: usize,
    u: f64,
    hint: usize,
) -> usize {
    for candidate in [hint, hint + 1] {
        if candidate >= degree
            && candidate < num_ctrl
            && knots[candidate] <= u
            && u < knots[candidate + 1]
        {
            return candidate;
        }
    }
    find_span(knots, degree, num_ctrl, u)
}

/// Compute the `degree + 1` non-zero basis functions at `u`.
pub(crate) fn basis_functions(knots: &[f64], span: usize, degree: usize, u: f64) -> Vec<f64> {
    let p = degree;
    let mut n_basis = vec![0.0; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    n_basis[0] = 1.0;

    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;

        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            if denom.abs() > 1e-15 {
                let temp = n_basis[r] / denom;
                n_basis[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            } else {
                n_basis[r] = saved;
                saved = 0.0;
            }
        }
        n_basis[j] = saved;
    }

    n_basis
}

/// Compute basis functions and their derivatives up to order `n`.
///
/// `result[k][j]` is the `k`-th derivative of the `j`-th non-zero basis
/// function in `span`. Orders above the degree are zero.
pub(crate) fn basis_derivatives(
    knots: &[f64],
    span: usize,
    degree: usize,
    u: f64,
    n: usize,
) -> Vec<Vec<f64>> {
    let p = degree;
    let mut ders = vec![vec![0.0; p + 1]; n + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    // ndu: basis functions in the upper triangle, knot differences below.
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;

        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            ndu[j][r] = if denom.abs() > 1e-15 { denom } else { 1.0 };
            let temp = ndu[r][j - 1] / ndu[j][r];

            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let max_order = n.min(p);
    let mut a = vec![vec![0.0; p + 1]; 2];
    for r in 0..=p {
        let mut s1 = 0;
        let mut s2 = 1;
        a[0][0] = 1.0;

        for k in 1..=max_order {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;

            if rk >= 0 {
                let rk = rk as usize;
                a[s2][0] = a[s1][0] / ndu[pk + 1][rk];
                d = a[s2][0] * ndu[rk][pk];
            }

            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r <= pk + 1 { k - 1 } else { p - r };

            for j in j1..=j2 {
                let idx = (rk + j as isize) as usize;
                a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][idx];
                d += a[s2][j] * ndu[idx][pk];
            }

            if r <= pk {
                a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                d += a[s2][k] * ndu[r][pk];
            }

            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    let mut factor = p as f64;
    for k in 1..=max_order {
        for value in &mut ders[k] {
            *value *= factor;
        }
        factor *= (p - k) as f64;
    }

    ders
}

/// Binomial coefficient as a float.
pub(crate) fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Project homogeneous derivatives `(w·P)^(k), w^(k)` to Cartesian ones.
///
/// Applies the quotient rule recursively; `homogeneous[0]` must have a
/// non-zero weight.
pub(crate) fn rational_derivatives(homogeneous: &[Vector4<f64>]) -> Vec<Vector3<f64>> {
    let w0 = homogeneous[0].w;
    let mut ders: Vec<Vector3<f64>> = Vec::with_capacity(homogeneous.len());

    for k in 0..homogeneous.len() {
        let mut v = homogeneous[k].xyz();
        for i in 1..=k {
            v -= ders[k - i] * (binomial(k, i) * homogeneous[i].w);
        }
        ders.push(v / w0);
    }

    ders
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CUBIC: [f64; 10] = [0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0];

    #[test]
    fn test_partition_of_unity() {
        for i in 0..=30 {
            let u = 3.0 * f64::from(i) / 30.0;
            let span = find_span(&CUBIC, 3, 6, u);
            let sum: f64 = basis_functions(&CUBIC, span, 3, u).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_span_with_hint() {
        assert_eq!(find_span_with_hint(&CUBIC, 3, 6, 1.5, 4), 4);
        assert_eq!(find_span_with_hint(&CUBIC, 3, 6, 2.5, 4), 5);
        assert_eq!(find_span_with_hint(&CUBIC, 3, 6, 0.5, 5), 3);
        assert_eq!(find_span_with_hint(&CUBIC, 3, 6, 3.0, 0), 5);
    }

    #[test]
    fn test_derivatives_match_values() {
        let u = 1.3;
        let span = find_span(&CUBIC, 3, 6, u);
        let ders = basis_derivatives(&CUBIC, span, 3, u, 2);
        let values = basis_functions(&CUBIC, span, 3, u);
        for j in 0..4 {
            assert_relative_eq!(ders[0][j], values[j], epsilon = 1e-12);
        }

        // First derivatives of a partition of unity sum to zero.
        let sum: f64 = ders[1].iter().sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-12);

        // Compare against a central difference.
        let h = 1e-6;
        let plus = basis_functions(&CUBIC, span, 3, u + h);
        let minus = basis_functions(&CUBIC, span, 3, u - h);
        for j in 0..4 {
            assert_relative_eq!(ders[1][j], (plus[j] - minus[j]) / (2.0 * h), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_derivatives_above_degree_are_zero() {
        let knots = [0.0, 0.0, 1.0, 1.0];
        let ders = basis_derivatives(&knots, 1, 1, 0.5, 3);
        assert_eq!(ders.len(), 4);
        assert_relative_eq!(ders[1][0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(ders[1][1], 1.0, epsilon = 1e-12);
        assert!(ders[2].iter().all(|&d| d == 0.0));
        assert!(ders[3].iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_binomial() {
        assert_relative_eq!(binomial(5, 2), 10.0);
        assert_relative_eq!(binomial(6, 0), 1.0);
        assert_relative_eq!(binomial(6, 6), 1.0);
        assert_relative_eq!(binomial(2, 3), 0.0);
    }

    #[test]
    fn test_rational_derivatives_unit_weight() {
        let homogeneous = [
            Vector4::new(1.0, 2.0, 3.0, 1.0),
            Vector4::new(0.5, 0.0, -1.0, 0.0),
        ];
        let ders = rational_derivatives(&homogeneous);
        assert_relative_eq!(ders[0], Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(ders[1], Vector3::new(0.5, 0.0, -1.0));
    }
}
