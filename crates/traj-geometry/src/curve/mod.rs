//! Curve trait and the B-spline/NURBS curve representation.

mod bspline;

use traj_math::{Point3, Vector3};

pub use bspline::{BSplineCurve, SplineKind};

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point3;

    /// Evaluate the first derivative at parameter `t`.
    fn tangent_at(&self, t: f64) -> Vector3;

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);
}
