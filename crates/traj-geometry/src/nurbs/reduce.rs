//! Data reduction: approximate a curve with fewer control points.

use traj_core::Result;
use traj_math::DVec3;

use super::fit::approximate;
use super::knot::{knot_multiplicities, uniform_knots};
use crate::curve::{BSplineCurve, Curve};

/// Knot refinement rounds before giving up.
pub const MAX_REDUCTION_ITERATIONS: usize = 10;

/// Samples per unit of order in every knot span of the source curve.
const SAMPLES_PER_ORDER: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub curve: BSplineCurve,
    /// Largest deviation per axis over the sample set
    pub max_error: DVec3,
}

fn samples(curve: &BSplineCurve) -> Vec<(f64, DVec3)> {
    let per_span = SAMPLES_PER_ORDER * curve.order();
    let breaks: Vec<f64> = knot_multiplicities(&curve.knots)
        .into_iter()
        .map(|(u, _)| u)
        .collect();
    let mut out = Vec::with_capacity(breaks.len() * per_span);
    for w in breaks.windows(2) {
        for i in 0..per_span {
            let t = w[0] + (w[1] - w[0]) * i as f64 / per_span as f64;
            out.push((t, curve.point_at(t)));
        }
    }
    let end = breaks[breaks.len() - 1];
    out.push((end, curve.point_at(end)));
    out
}

/// Least-squares refit of `curve` with the same degree and domain, refining
/// the knot vector where the per-axis error exceeds `tolerance`.
///
/// Returns `None` when no approximation within `tolerance` with fewer
/// control points than `curve` was found in [`MAX_REDUCTION_ITERATIONS`]
/// rounds.
pub fn reduce(curve: &BSplineCurve, tolerance: f64) -> Result<Option<Reduction>> {
    let degree = curve.degree;
    let (t0, t1) = curve.domain();
    let samples = samples(curve);
    let mut knots = uniform_knots(degree, degree + 1, t0, t1);

    for iteration in 0..MAX_REDUCTION_ITERATIONS {
        let count = knots.len() - degree - 1;
        if count >= curve.control_points.len() {
            break;
        }

        let fit = approximate(degree, knots.clone(), &samples)?;
        let errors: Vec<(f64, DVec3)> = samples
            .iter()
            .map(|&(t, p)| (t, (fit.point_at(t) - p).abs()))
            .collect();
        let max_error = errors
            .iter()
            .fold(DVec3::ZERO, |acc, &(_, e)| acc.max(e));

        log::debug!(
            "reduction round {}: {} control points, max error {:?}",
            iteration,
            count,
            max_error
        );

        if max_error.max_element() <= tolerance {
            return Ok(Some(Reduction {
                curve: fit,
                max_error,
            }));
        }

        // Split every span that holds an out-of-tolerance sample.
        let breaks: Vec<f64> = knot_multiplicities(&knots)
            .into_iter()
            .map(|(u, _)| u)
            .collect();
        let mut refined = knots.clone();
        for w in breaks.windows(2) {
            let bad = errors
                .iter()
                .any(|&(t, e)| t >= w[0] && t <= w[1] && e.max_element() > tolerance);
            if bad {
                refined.push(0.5 * (w[0] + w[1]));
            }
        }
        refined.sort_by(f64::total_cmp);
        knots = refined;
    }

    Ok(None)
}
