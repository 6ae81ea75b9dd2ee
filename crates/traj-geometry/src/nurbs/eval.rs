//! Point and derivative evaluation for B-spline and NURBS curves.

use traj_math::{DVec3, DVec4};

use super::knot::{basis_function_derivs, find_span};

/// Evaluate a curve and its first `n_derivs` derivatives at `t`.
///
/// `control_points` are homogeneous: `xyz` holds the weighted position and
/// `w` the weight (1 for polynomial curves). Returns `n_derivs + 1` vectors,
/// the point first.
pub fn curve_derivs(
    degree: usize,
    knots: &[f64],
    control_points: &[DVec4],
    rational: bool,
    t: f64,
    n_derivs: usize,
) -> Vec<DVec3> {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let basis = basis_function_derivs(degree, knots, span, t, n_derivs);

    let mut homogeneous = vec![DVec4::ZERO; n_derivs + 1];
    for (k, row) in basis.iter().enumerate() {
        for (j, &b) in row.iter().enumerate() {
            homogeneous[k] += b * control_points[span - degree + j];
        }
    }

    if !rational {
        return homogeneous.iter().map(|h| h.truncate()).collect();
    }

    rational_derivs(&homogeneous)
}

/// Project homogeneous derivatives `(A^(k), w^(k))` to Cartesian derivatives
/// (The NURBS Book, A4.2).
fn rational_derivs(homogeneous: &[DVec4]) -> Vec<DVec3> {
    let w0 = homogeneous[0].w;
    let mut out: Vec<DVec3> = Vec::with_capacity(homogeneous.len());
    for k in 0..homogeneous.len() {
        let mut v = homogeneous[k].truncate();
        for i in 1..=k {
            v -= binomial(k, i) as f64 * homogeneous[i].w * out[k - i];
        }
        out.push(if w0.abs() < 1e-15 { v } else { v / w0 });
    }
    out
}

/// Binomial coefficient `n choose k`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u64, |acc, i| acc * (n - i) as u64 / (i + 1) as u64)
}
