//! B-spline and NURBS curve representation.

use serde::{Deserialize, Serialize};
use traj_math::{DVec3, DVec4, Point3, Vector3};

use super::Curve;
use crate::nurbs::eval;

/// Whether a curve carries weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplineKind {
    /// Non-rational B-spline
    Polynomial,
    /// Rational B-spline (NURBS)
    Rational,
}

/// A clamped B-spline curve, optionally rational.
///
/// The knot vector always holds `control_points.len() + degree + 1` values,
/// with the first and last `degree + 1` knots equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSplineCurve {
    pub degree: usize,
    pub knots: Vec<f64>,
    pub control_points: Vec<Point3>,
    /// One positive weight per control point for rational curves
    pub weights: Option<Vec<f64>>,
}

impl BSplineCurve {
    pub fn new(degree: usize, knots: Vec<f64>, control_points: Vec<Point3>) -> Self {
        debug_assert!(
            knots.len() == control_points.len() + degree + 1,
            "Knot vector length must be n + p + 1, got {} knots for {} CPs with degree {}",
            knots.len(),
            control_points.len(),
            degree
        );
        Self {
            degree,
            knots,
            control_points,
            weights: None,
        }
    }

    pub fn new_rational(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<Point3>,
        weights: Vec<f64>,
    ) -> Self {
        debug_assert!(
            control_points.len() == weights.len(),
            "Must have same number of weights as control points"
        );
        Self {
            weights: Some(weights),
            ..Self::new(degree, knots, control_points)
        }
    }

    /// Rebuild from homogeneous control points `(x*w, y*w, z*w, w)`.
    pub fn from_homogeneous(
        degree: usize,
        knots: Vec<f64>,
        homogeneous: &[DVec4],
        kind: SplineKind,
    ) -> Self {
        match kind {
            SplineKind::Polynomial => Self::new(
                degree,
                knots,
                homogeneous.iter().map(|h| h.truncate()).collect(),
            ),
            SplineKind::Rational => Self::new_rational(
                degree,
                knots,
                homogeneous.iter().map(|h| h.truncate() / h.w).collect(),
                homogeneous.iter().map(|h| h.w).collect(),
            ),
        }
    }

    pub fn order(&self) -> usize {
        self.degree + 1
    }

    pub fn kind(&self) -> SplineKind {
        if self.weights.is_some() {
            SplineKind::Rational
        } else {
            SplineKind::Polynomial
        }
    }

    pub fn is_rational(&self) -> bool {
        self.weights.is_some()
    }

    pub fn weight(&self, i: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[i])
    }

    /// Control points as `(x*w, y*w, z*w, w)`.
    pub fn homogeneous(&self) -> Vec<DVec4> {
        self.control_points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let w = self.weight(i);
                (*p * w).extend(w)
            })
            .collect()
    }

    pub fn start_point(&self) -> Point3 {
        self.control_points[0]
    }

    pub fn end_point(&self) -> Point3 {
        self.control_points[self.control_points.len() - 1]
    }

    /// Point followed by the first `n` derivatives at `t`.
    pub fn derivatives(&self, t: f64, n: usize) -> Vec<DVec3> {
        eval::curve_derivs(
            self.degree,
            &self.knots,
            &self.homogeneous(),
            self.is_rational(),
            t,
            n,
        )
    }
}

impl Curve for BSplineCurve {
    fn point_at(&self, t: f64) -> Point3 {
        self.derivatives(t, 0)[0]
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        self.derivatives(t, 1)[1]
    }

    fn domain(&self) -> (f64, f64) {
        let p = self.degree;
        (self.knots[p], self.knots[self.knots.len() - p - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bspline_quadratic() {
        // Quadratic Bezier curve (degree 2, 3 control points)
        let curve = BSplineCurve::new(
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(0.5, 1.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
            ],
        );

        let p0 = curve.point_at(0.0);
        assert!((p0 - DVec3::new(0.0, 0.0, 0.0)).length() < 1e-10);

        let p1 = curve.point_at(1.0);
        assert!((p1 - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-10);

        // At t=0.5: 0.25*P0 + 0.5*P1 + 0.25*P2 = (0.5, 0.5, 0)
        let pm = curve.point_at(0.5);
        assert!((pm.x - 0.5).abs() < 1e-10);
        assert!((pm.y - 0.5).abs() < 1e-10);
        assert_eq!(curve.kind(), SplineKind::Polynomial);
    }

    #[test]
    fn test_bspline_domain() {
        let curve = BSplineCurve::new(
            2,
            vec![1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0],
            vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z, DVec3::ONE],
        );
        assert_eq!(curve.domain(), (1.0, 4.0));
        assert_eq!(curve.order(), 3);
    }

    #[test]
    fn test_nurbs_circle() {
        let w = 1.0_f64 / 2.0_f64.sqrt();
        let curve = BSplineCurve::new_rational(
            2,
            vec![0.0, 0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0, 1.0],
            vec![
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
                DVec3::new(-1.0, 1.0, 0.0),
                DVec3::new(-1.0, 0.0, 0.0),
                DVec3::new(-1.0, -1.0, 0.0),
                DVec3::new(0.0, -1.0, 0.0),
                DVec3::new(1.0, -1.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
            ],
            vec![1.0, w, 1.0, w, 1.0, w, 1.0, w, 1.0],
        );

        let (t_min, t_max) = curve.domain();
        for i in 0..=20 {
            let t = t_min + (t_max - t_min) * i as f64 / 20.0;
            let p = curve.point_at(t);
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!(
                (r - 1.0).abs() < 1e-8,
                "NURBS circle point at t={} has radius {}, expected 1.0",
                t,
                r
            );
        }
        assert!(curve.is_rational());
    }

    #[test]
    fn test_homogeneous_round_trip() {
        let curve = BSplineCurve::new_rational(
            1,
            vec![0.0, 0.0, 1.0, 1.0],
            vec![DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 4.0, 0.0)],
            vec![2.0, 0.5],
        );
        let h = curve.homogeneous();
        assert_eq!(h[0], DVec4::new(4.0, 0.0, 0.0, 2.0));
        let back = BSplineCurve::from_homogeneous(1, curve.knots.clone(), &h, SplineKind::Rational);
        assert_eq!(back, curve);
    }
}
