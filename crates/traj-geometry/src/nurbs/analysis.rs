//! Differential-geometric quantities: arc length, curvature, variation of
//! curvature and the Frenet frame.

use traj_math::DVec3;

use super::knot::knot_multiplicities;
use crate::curve::BSplineCurve;

/// Speeds below this are treated as a stationary point.
const MIN_SPEED: f64 = 1e-12;

/// Maximum bisection depth of the adaptive quadrature.
const MAX_DEPTH: u32 = 24;

/// 5-point Gauss-Legendre nodes and weights on [-1, 1].
const GAUSS_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];
const GAUSS_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

fn speed(curve: &BSplineCurve, t: f64) -> f64 {
    curve.derivatives(t, 1)[1].length()
}

fn gauss(curve: &BSplineCurve, a: f64, b: f64) -> f64 {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    GAUSS_NODES
        .iter()
        .zip(GAUSS_WEIGHTS.iter())
        .map(|(&x, &w)| w * speed(curve, mid + half * x))
        .sum::<f64>()
        * half
}

fn adaptive(curve: &BSplineCurve, a: f64, b: f64, whole: f64, tolerance: f64, depth: u32) -> f64 {
    let mid = 0.5 * (a + b);
    let left = gauss(curve, a, mid);
    let right = gauss(curve, mid, b);
    if depth >= MAX_DEPTH || (left + right - whole).abs() <= tolerance {
        return left + right;
    }
    adaptive(curve, a, mid, left, 0.5 * tolerance, depth + 1)
        + adaptive(curve, mid, b, right, 0.5 * tolerance, depth + 1)
}

/// Arc length of `curve` integrated to within roughly `tolerance`.
///
/// The integrand is smooth inside every knot span, so each span is
/// integrated separately.
pub fn arc_length(curve: &BSplineCurve, tolerance: f64) -> f64 {
    let (t0, t1) = crate::curve::Curve::domain(curve);
    let breaks: Vec<f64> = knot_multiplicities(&curve.knots)
        .into_iter()
        .map(|(u, _)| u)
        .filter(|&u| u >= t0 && u <= t1)
        .collect();

    let spans = (breaks.len() - 1).max(1) as f64;
    breaks
        .windows(2)
        .map(|w| {
            let whole = gauss(curve, w[0], w[1]);
            adaptive(curve, w[0], w[1], whole, tolerance / spans, 0)
        })
        .sum()
}

/// Curvature at `t`, zero at stationary points.
pub fn curvature(curve: &BSplineCurve, t: f64) -> f64 {
    let d = curve.derivatives(t, 2);
    let s = d[1].length();
    if s < MIN_SPEED {
        return 0.0;
    }
    d[1].cross(d[2]).length() / (s * s * s)
}

/// Derivative of curvature with respect to arc length at `t`.
pub fn variation_of_curvature(curve: &BSplineCurve, t: f64) -> f64 {
    let d = curve.derivatives(t, 3);
    let s = d[1].length();
    if s < MIN_SPEED {
        return 0.0;
    }
    let a = d[1].cross(d[2]);
    let a_len = a.length();
    // d|a|/dt, with a' = C' x C''' ; vanishes on straight pieces
    let da = if a_len < MIN_SPEED {
        0.0
    } else {
        a.dot(d[1].cross(d[3])) / a_len
    };
    let ds = d[1].dot(d[2]) / s;
    let dk_dt = da / s.powi(3) - 3.0 * a_len * ds / s.powi(4);
    dk_dt / s
}

/// Orthonormal Frenet frame at `t`.
///
/// On straight pieces the normal is undefined; a normal in the horizontal
/// plane (rotated +90 degrees about Z) is used instead, falling back to the
/// X axis for vertical tangents. Returns `None` at stationary points.
pub fn frenet_frame(curve: &BSplineCurve, t: f64) -> Option<[DVec3; 3]> {
    let d = curve.derivatives(t, 2);
    if d[1].length() < MIN_SPEED {
        return None;
    }
    let tangent = d[1].normalize();
    let b = d[1].cross(d[2]);
    let binormal = if b.length() > MIN_SPEED * d[1].length_squared() {
        b.normalize()
    } else {
        let horizontal = DVec3::Z.cross(tangent);
        let normal = if horizontal.length() > 1e-9 {
            horizontal.normalize()
        } else {
            DVec3::X
        };
        tangent.cross(normal).normalize()
    };
    let normal = binormal.cross(tangent);
    Some([tangent, normal, binormal])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::fit::interpolate;

    fn quarter_circle(radius: f64) -> BSplineCurve {
        let w = 1.0_f64 / 2.0_f64.sqrt();
        BSplineCurve::new_rational(
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![
                DVec3::new(radius, 0.0, 0.0),
                DVec3::new(radius, radius, 0.0),
                DVec3::new(0.0, radius, 0.0),
            ],
            vec![1.0, w, 1.0],
        )
    }

    #[test]
    fn test_line_length() {
        let line = interpolate(&[DVec3::ZERO, DVec3::new(3.0, 4.0, 0.0)], None, 2).unwrap();
        assert!((arc_length(&line, 1e-6) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_length_quarter_circle() {
        let arc = quarter_circle(2.0);
        let len = arc_length(&arc, 1e-8);
        assert!((len - std::f64::consts::PI).abs() < 1e-6, "length {}", len);
    }

    #[test]
    fn test_circle_curvature_constant() {
        let arc = quarter_circle(2.0);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((curvature(&arc, t) - 0.5).abs() < 1e-8);
            assert!(variation_of_curvature(&arc, t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_line_frame_uses_horizontal_normal() {
        let line = interpolate(&[DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)], None, 2).unwrap();
        let [t, n, b] = frenet_frame(&line, 0.5).unwrap();
        assert!((t - DVec3::X).length() < 1e-12);
        assert!((n - DVec3::Y).length() < 1e-12);
        assert!((b - DVec3::Z).length() < 1e-12);
        assert_eq!(curvature(&line, 0.5), 0.0);
    }

    #[test]
    fn test_circle_frame_points_inward() {
        let arc = quarter_circle(1.0);
        let [t, n, b] = frenet_frame(&arc, 0.5).unwrap();
        let p = crate::curve::Curve::point_at(&arc, 0.5);
        assert!((n + p.normalize()).length() < 1e-9);
        assert!(t.dot(n).abs() < 1e-12 && t.dot(b).abs() < 1e-12);
        assert!((b - DVec3::Z).length() < 1e-9);
    }
}
