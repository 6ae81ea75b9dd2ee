//! Trajectory geometry: the NURBS kernel and the spline curve engine.

pub mod curve;
pub mod intersect;
pub mod nurbs;
pub mod spline;
pub mod tessellate;

pub use curve::{BSplineCurve, Curve, SplineKind};
pub use nurbs::ClosestPoints;
pub use spline::{FrenetFrame, PoseError, Shape, Spline};
