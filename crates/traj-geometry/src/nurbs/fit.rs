//! Curve fitting: global interpolation, Hermite bridging and least-squares
//! approximation, solved with nalgebra.

use nalgebra::DMatrix;
use traj_core::{Result, SplineError};
use traj_math::DVec3;

use super::knot::{averaged_knots, basis_function_derivs, find_span, uniform_knots};
use crate::curve::BSplineCurve;

/// One interpolation condition: the curve (derivative 0) or its first
/// derivative (derivative 1) takes `value` at `param`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub param: f64,
    pub derivative: usize,
    pub value: DVec3,
}

impl Constraint {
    pub fn point(param: f64, value: DVec3) -> Self {
        Self {
            param,
            derivative: 0,
            value,
        }
    }

    pub fn tangent(param: f64, value: DVec3) -> Self {
        Self {
            param,
            derivative: 1,
            value,
        }
    }
}

/// Cumulative chord-length parameters starting at 0.
pub fn chord_length_params(points: &[DVec3]) -> Result<Vec<f64>> {
    let mut params = Vec::with_capacity(points.len());
    let mut total = 0.0;
    params.push(total);
    for (i, pair) in points.windows(2).enumerate() {
        let chord = pair[0].distance(pair[1]);
        if chord <= f64::EPSILON {
            return Err(SplineError::curve_fit(format!(
                "points {} and {} coincide",
                i,
                i + 1
            )));
        }
        total += chord;
        params.push(total);
    }
    Ok(params)
}

/// Interpolate `points` with a clamped B-spline of at most `order`.
///
/// The order is lowered to the number of points when there are fewer points
/// than `order`. Without `params`, chord-length parametrization is used.
pub fn interpolate(points: &[DVec3], params: Option<&[f64]>, order: usize) -> Result<BSplineCurve> {
    let n = points.len();
    if n < 2 {
        return Err(SplineError::curve_fit(format!(
            "interpolation needs at least 2 points, got {}",
            n
        )));
    }
    if order < 2 {
        return Err(SplineError::curve_fit(format!("invalid curve order {}", order)));
    }

    let params = match params {
        Some(given) => {
            if given.len() != n {
                return Err(SplineError::curve_fit(format!(
                    "{} parameters given for {} points",
                    given.len(),
                    n
                )));
            }
            if given.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(SplineError::curve_fit(
                    "parameters must be strictly increasing",
                ));
            }
            given.to_vec()
        }
        None => chord_length_params(points)?,
    };

    let degree = order.min(n) - 1;
    let knots = averaged_knots(degree, &params);
    let constraints: Vec<Constraint> = params
        .iter()
        .zip(points)
        .map(|(&u, &p)| Constraint::point(u, p))
        .collect();

    solve(degree, knots, &constraints)
}

/// Fit a curve through positional and first-derivative constraints over
/// `[first param, last param]`, using evenly spaced interior knots.
///
/// Constraints must be ordered by parameter; the degree is
/// `min(order, constraints.len()) - 1`.
pub fn interpolate_hermite(constraints: &[Constraint], order: usize) -> Result<BSplineCurve> {
    let n = constraints.len();
    if n < 2 || order < 2 {
        return Err(SplineError::curve_fit(format!(
            "hermite fit needs at least 2 constraints and order 2, got {} and {}",
            n, order
        )));
    }
    let start = constraints[0].param;
    let end = constraints[n - 1].param;
    if !(start < end) {
        return Err(SplineError::curve_fit(format!(
            "degenerate hermite parameter range [{}, {}]",
            start, end
        )));
    }

    let degree = order.min(n) - 1;
    let knots = uniform_knots(degree, n, start, end);
    solve(degree, knots, constraints)
}

fn solve(degree: usize, knots: Vec<f64>, constraints: &[Constraint]) -> Result<BSplineCurve> {
    let n = constraints.len();
    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut b = DMatrix::<f64>::zeros(n, 3);

    for (row, c) in constraints.iter().enumerate() {
        let span = find_span(degree, &knots, n - 1, c.param);
        let ders = basis_function_derivs(degree, &knots, span, c.param, c.derivative);
        for (j, &v) in ders[c.derivative].iter().enumerate() {
            a[(row, span - degree + j)] = v;
        }
        b[(row, 0)] = c.value.x;
        b[(row, 1)] = c.value.y;
        b[(row, 2)] = c.value.z;
    }

    let x = a
        .lu()
        .solve(&b)
        .ok_or_else(|| SplineError::curve_fit("singular interpolation system"))?;

    let control_points: Vec<DVec3> = (0..n)
        .map(|i| DVec3::new(x[(i, 0)], x[(i, 1)], x[(i, 2)]))
        .collect();
    if control_points.iter().any(|p| !p.is_finite()) {
        return Err(SplineError::curve_fit("ill-conditioned interpolation system"));
    }

    Ok(BSplineCurve::new(degree, knots, control_points))
}

/// Least-squares approximation of parameterized `samples` with a polynomial
/// curve on the given clamped `knots`.
///
/// The first and last samples are interpolated exactly; `samples` must be
/// sorted by parameter and span the knot domain.
pub fn approximate(degree: usize, knots: Vec<f64>, samples: &[(f64, DVec3)]) -> Result<BSplineCurve> {
    let count = knots.len() - degree - 1;
    let m = samples.len();
    if count < 2 || m < count {
        return Err(SplineError::curve_fit(format!(
            "cannot fit {} control points to {} samples",
            count, m
        )));
    }

    let first = samples[0].1;
    let last = samples[m - 1].1;
    let mut control_points = vec![first; count];
    control_points[count - 1] = last;

    let unknowns = count - 2;
    if unknowns > 0 {
        let interior = &samples[1..m - 1];
        let mut n_mat = DMatrix::<f64>::zeros(interior.len(), unknowns);
        let mut r_mat = DMatrix::<f64>::zeros(interior.len(), 3);

        for (row, &(u, p)) in interior.iter().enumerate() {
            let span = find_span(degree, &knots, count - 1, u);
            let basis = basis_function_derivs(degree, &knots, span, u, 0);
            let mut residual = p;
            for (j, &v) in basis[0].iter().enumerate() {
                let idx = span - degree + j;
                if idx == 0 {
                    residual -= v * first;
                } else if idx == count - 1 {
                    residual -= v * last;
                } else {
                    n_mat[(row, idx - 1)] = v;
                }
            }
            r_mat[(row, 0)] = residual.x;
            r_mat[(row, 1)] = residual.y;
            r_mat[(row, 2)] = residual.z;
        }

        let x = n_mat
            .svd(true, true)
            .solve(&r_mat, 1e-12)
            .map_err(|e| SplineError::curve_fit(format!("least-squares solve failed: {}", e)))?;
        for i in 0..unknowns {
            control_points[i + 1] = DVec3::new(x[(i, 0)], x[(i, 1)], x[(i, 2)]);
        }
    }

    Ok(BSplineCurve::new(degree, knots, control_points))
}
