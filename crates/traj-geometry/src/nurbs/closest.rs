//! Closest-point projection of a point onto a curve.

use traj_math::DVec3;

use super::knot::knot_multiplicities;
use crate::curve::{BSplineCurve, Curve};

/// Iteration cap of the local Newton refinement.
pub const MAX_NEWTON_ITERATIONS: usize = 50;

/// Step halvings allowed when a Newton step increases the distance.
const MAX_DAMPING: usize = 16;

/// Subintervals sampled per unit of order in each knot span.
const SAMPLES_PER_ORDER: usize = 4;

/// A run of tangential residuals within tolerance must be longer than this
/// many tolerances to count as a degenerate interval.
const INTERVAL_EXTENT_FACTOR: f64 = 4.0;

/// Result of a global closest-point search, ordered by parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosestPoints {
    /// Isolated local closest points
    pub points: Vec<f64>,
    /// Parameter intervals along which the distance stays constant within
    /// tolerance
    pub intervals: Vec<(f64, f64)>,
}

impl ClosestPoints {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.intervals.is_empty()
    }
}

/// Outcome of a local search; `converged` is false when the iteration cap
/// was hit or the curve has a stationary point on the way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSearch {
    pub param: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Damped Newton iteration on `(C(t) - P) . C'(t) = 0` from `guess`,
/// confined to `bounds`, which must lie inside the curve domain.
///
/// A step leaving the bounds is cut at the bound; the search converges
/// there when the next step points outside again.
pub fn local_closest_point(
    curve: &BSplineCurve,
    reference: DVec3,
    guess: f64,
    bounds: (f64, f64),
    tolerance: f64,
) -> LocalSearch {
    let (t0, t1) = bounds;
    let param_eps = 1e-12 * (1.0 + (t1 - t0).abs());
    let residual_eps = 1e-6 * tolerance;

    let mut t = guess.clamp(t0, t1);
    for iteration in 0..MAX_NEWTON_ITERATIONS {
        let d = curve.derivatives(t, 2);
        let diff = d[0] - reference;
        let speed_sq = d[1].length_squared();
        if !(speed_sq > 1e-24) {
            return LocalSearch {
                param: t,
                iterations: iteration,
                converged: false,
            };
        }

        let g = diff.dot(d[1]);
        if g.abs() / speed_sq.sqrt() <= residual_eps {
            return LocalSearch {
                param: t,
                iterations: iteration,
                converged: true,
            };
        }

        // Fall back to Gauss-Newton where the distance is not convex
        let mut gp = speed_sq + diff.dot(d[2]);
        if gp <= 1e-12 * speed_sq {
            gp = speed_sq;
        }

        let current = diff.length_squared();
        let mut step = -g / gp;
        let mut next = (t + step).clamp(t0, t1);
        for _ in 0..MAX_DAMPING {
            if (curve.point_at(next) - reference).length_squared() <= current {
                break;
            }
            step *= 0.5;
            next = (t + step).clamp(t0, t1);
        }

        if !next.is_finite() {
            return LocalSearch {
                param: t,
                iterations: iteration,
                converged: false,
            };
        }
        if (next - t).abs() <= param_eps {
            return LocalSearch {
                param: next,
                iterations: iteration + 1,
                converged: true,
            };
        }
        t = next;
    }

    LocalSearch {
        param: t,
        iterations: MAX_NEWTON_ITERATIONS,
        converged: false,
    }
}

struct Sample {
    t: f64,
    point: DVec3,
    distance: f64,
    residual: f64,
}

fn sample_params(curve: &BSplineCurve) -> Vec<f64> {
    let per_span = SAMPLES_PER_ORDER * curve.order();
    let breaks: Vec<f64> = knot_multiplicities(&curve.knots)
        .into_iter()
        .map(|(u, _)| u)
        .collect();
    let mut params = Vec::with_capacity(breaks.len() * per_span + 1);
    for w in breaks.windows(2) {
        for i in 0..per_span {
            params.push(w[0] + (w[1] - w[0]) * i as f64 / per_span as f64);
        }
    }
    params.push(breaks[breaks.len() - 1]);
    params
}

/// All local closest points of `curve` to `reference`.
///
/// The curve is sampled per knot span; runs of samples whose tangential
/// residual `|(C - P) . T|` stays within `tolerance` over an extent longer
/// than a few tolerances are reported as intervals, every other discrete
/// distance minimum is refined with [`local_closest_point`].
pub fn closest_points(curve: &BSplineCurve, reference: DVec3, tolerance: f64) -> ClosestPoints {
    let samples: Vec<Sample> = sample_params(curve)
        .into_iter()
        .map(|t| {
            let d = curve.derivatives(t, 1);
            let diff = d[0] - reference;
            let speed = d[1].length();
            let residual = if speed > 1e-12 {
                diff.dot(d[1]).abs() / speed
            } else {
                f64::INFINITY
            };
            Sample {
                t,
                point: d[0],
                distance: diff.length(),
                residual,
            }
        })
        .collect();

    let mut result = ClosestPoints::default();
    let mut in_interval = vec![false; samples.len()];

    let mut i = 0;
    while i < samples.len() {
        if samples[i].residual > tolerance {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < samples.len() && samples[i + 1].residual <= tolerance {
            i += 1;
        }
        let end = i;
        let extent: f64 = samples[start..=end]
            .windows(2)
            .map(|w| w[0].point.distance(w[1].point))
            .sum();
        if end - start >= 2 && extent > INTERVAL_EXTENT_FACTOR * tolerance {
            result.intervals.push((samples[start].t, samples[end].t));
            in_interval[start..=end].iter_mut().for_each(|f| *f = true);
        }
        i += 1;
    }

    let last = samples.len() - 1;
    for i in 0..samples.len() {
        if in_interval[i] {
            continue;
        }
        let d = samples[i].distance;
        let left_ok = i == 0 || d <= samples[i - 1].distance;
        let right_ok = i == last || d <= samples[i + 1].distance;
        if !(left_ok && right_ok) {
            continue;
        }

        let lo = samples[i.saturating_sub(1)].t;
        let hi = samples[(i + 1).min(last)].t;
        let search = local_closest_point(curve, reference, samples[i].t, curve.domain(), tolerance);
        let t = if search.converged {
            search.param.clamp(lo, hi)
        } else {
            samples[i].t
        };
        log::trace!(
            "closest point candidate t={} refined to {} after {} iterations",
            samples[i].t,
            t,
            search.iterations
        );

        let inside_interval = result
            .intervals
            .iter()
            .any(|&(a, b)| t >= a && t <= b);
        let duplicate = result
            .points
            .last()
            .is_some_and(|&prev| (t - prev).abs() <= 1e-9 * (1.0 + t.abs()));
        if !inside_interval && !duplicate {
            result.points.push(t);
        }
    }

    result
}
