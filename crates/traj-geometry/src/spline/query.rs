//! Point, tangent, curvature and length queries.

use traj_core::{Result, SplineError};
use traj_math::{DVec3, Point3, Vector3};

use super::{Shape, Spline};
use crate::curve::BSplineCurve;
use crate::nurbs::analysis;

/// Upper bound on the samples taken by [`Spline::curvature_max`].
const MAX_CURVATURE_SAMPLES: f64 = 100_000.0;

impl Spline {
    /// Curve for curvature-type queries, which have no meaning on a
    /// singleton or an empty spline.
    pub(super) fn differential_curve(&self, what: &str) -> Result<&BSplineCurve> {
        match &self.shape {
            Shape::Curve(c) => Ok(c),
            Shape::Singleton(_) => Err(SplineError::InvalidOperation(format!(
                "{what} called on a singleton"
            ))),
            Shape::Empty => Err(SplineError::InvalidOperation(format!(
                "{what} called on an empty curve"
            ))),
        }
    }

    /// Position at `t`.
    pub fn point_at(&self, t: f64) -> Result<Point3> {
        Ok(self.point_and_tangent_at(t)?.0)
    }

    /// Position and first derivative at `t`. A singleton has a zero tangent.
    pub fn point_and_tangent_at(&self, t: f64) -> Result<(Point3, Vector3)> {
        self.check_param(t)?;
        match &self.shape {
            Shape::Curve(c) => {
                let d = c.derivatives(t, 1);
                Ok((d[0], d[1]))
            }
            Shape::Singleton(p) => Ok((*p, DVec3::ZERO)),
            Shape::Empty => Err(SplineError::InvalidOperation(
                "point queried on an empty curve".into(),
            )),
        }
    }

    pub fn curvature_at(&self, t: f64) -> Result<f64> {
        self.check_param(t)?;
        let curve = self.differential_curve("curvature_at()")?;
        Ok(analysis::curvature(curve, t))
    }

    /// Derivative of the curvature with respect to arc length at `t`.
    pub fn variation_of_curvature_at(&self, t: f64) -> Result<f64> {
        self.check_param(t)?;
        let curve = self.differential_curve("variation_of_curvature_at()")?;
        Ok(analysis::variation_of_curvature(curve, t))
    }

    /// Largest curvature over the curve.
    ///
    /// This is a sampled approximation, not an exact extremum: the domain
    /// is walked with a parameter step of `unit_parameter() *
    /// geometric_resolution`, i.e. roughly one sample per resolution of arc
    /// length, and the end parameter is always included.
    pub fn curvature_max(&self) -> Result<f64> {
        let curve = self.differential_curve("curvature_max()")?;
        if let Some(value) = self.cache.curvature_max.get() {
            return Ok(value);
        }

        let (start, end) = self.domain();
        let min_step = (end - start) / MAX_CURVATURE_SAMPLES;
        let step = (self.unit_parameter()? * self.geometric_resolution()).max(min_step);

        let mut max = analysis::curvature(curve, end);
        if step > 0.0 && step.is_finite() {
            let mut p = start;
            while p < end {
                max = max.max(analysis::curvature(curve, p));
                p += step;
            }
        } else {
            max = max.max(analysis::curvature(curve, start));
        }

        self.cache.curvature_max.set(Some(max));
        Ok(max)
    }

    /// Arc length, integrated to the geometric resolution. Zero for a
    /// singleton.
    pub fn curve_length(&self) -> Result<f64> {
        let curve = match &self.shape {
            Shape::Curve(c) => c,
            Shape::Singleton(_) => return Ok(0.0),
            Shape::Empty => {
                return Err(SplineError::InvalidOperation(
                    "curve_length() called on an empty curve".into(),
                ))
            }
        };
        if let Some(length) = self.cache.length.get() {
            return Ok(length);
        }
        let length = analysis::arc_length(curve, self.geometric_resolution());
        self.cache.length.set(Some(length));
        Ok(length)
    }

    /// Parameter units per unit of arc length; 0 on a degenerate domain.
    pub fn unit_parameter(&self) -> Result<f64> {
        let (start, end) = self.domain();
        if end == start {
            return Ok(0.0);
        }
        Ok((end - start) / self.curve_length()?)
    }
}
