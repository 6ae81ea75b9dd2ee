//! Closest-point projection onto a spline.

use traj_core::{Result, SplineError};
use traj_math::Point3;

use super::{Shape, Spline};
use crate::curve::Curve;
use crate::nurbs::closest::{self, ClosestPoints};

impl Spline {
    /// All local closest points to `reference`: isolated parameters plus
    /// parameter intervals where the curve keeps a constant distance within
    /// `tolerance`. Without a curve, the start parameter is the only answer.
    pub fn find_closest_points(&self, reference: Point3, tolerance: f64) -> ClosestPoints {
        match &self.shape {
            Shape::Curve(c) => closest::closest_points(c, reference, tolerance),
            _ => ClosestPoints {
                points: vec![self.start_param()],
                intervals: Vec::new(),
            },
        }
    }

    /// The closest point nearest to `guess`.
    ///
    /// When `guess` lies inside a degenerate interval it is returned as is;
    /// otherwise the isolated point or interval end nearest to `guess` wins,
    /// the first one found on ties.
    pub fn find_one_closest_point(&self, reference: Point3, guess: f64, tolerance: f64) -> Result<f64> {
        if self.curve().is_none() {
            return Ok(self.start_param());
        }

        let found = self.find_closest_points(reference, tolerance);
        let mut best = match (found.points.first(), found.intervals.first()) {
            (Some(&p), _) => p,
            (None, Some(&(start, _))) => start,
            (None, None) => {
                return Err(SplineError::Logic(
                    "closest point search returned nothing on a non-empty curve".into(),
                ))
            }
        };

        for &p in found.points.iter().skip(1) {
            if (p - guess).abs() < (best - guess).abs() {
                best = p;
            }
        }

        for &(start, end) in &found.intervals {
            if start <= guess && guess <= end {
                return Ok(guess);
            }
            if (start - guess).abs() < (best - guess).abs() {
                best = start;
            }
            if (end - guess).abs() < (best - guess).abs() {
                best = end;
            }
        }

        Ok(best)
    }

    /// Refine a closest point locally from `guess` within `[start, end]`
    /// (swapped if given in reverse, and cut to the curve domain).
    ///
    /// The iteration never leaves the bounds: a minimum beyond them yields
    /// the nearest bound instead of a failure. A stationary point on the
    /// way is reported as a numerical error.
    pub fn local_closest_point_search(
        &self,
        reference: Point3,
        guess: f64,
        start: f64,
        end: f64,
        tolerance: f64,
    ) -> Result<f64> {
        let Some(curve) = self.curve() else {
            return Ok(self.start_param());
        };
        let (lo, hi) = if end < start { (end, start) } else { (start, end) };
        let (t0, t1) = curve.domain();
        let (lo, hi) = (lo.clamp(t0, t1), hi.clamp(t0, t1));

        let search = closest::local_closest_point(curve, reference, guess, (lo, hi), tolerance);
        if !search.converged {
            return Err(SplineError::Numerical(format!(
                "closest point search from {} did not converge after {} iterations",
                guess, search.iterations
            )));
        }
        Ok(search.param.clamp(lo, hi))
    }
}
