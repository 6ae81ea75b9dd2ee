//! Tessellation of curves into polylines.

use traj_math::Point3;

use crate::curve::Curve;

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

/// Convert a curve to a polyline using adaptive subdivision.
///
/// Segments are split where the midpoint deviates from the chord by more
/// than `tolerance`. Every span between consecutive `breaks` (typically the
/// distinct knots) is subdivided on its own, so that short spans between
/// wide ones are not skipped.
///
/// # Returns
/// A vector of points approximating the curve, starting and ending at the
/// curve's end points.
pub fn curve_to_polyline(curve: &dyn Curve, breaks: &[f64], tolerance: f64) -> Vec<Point3> {
    let (t_min, t_max) = curve.domain();
    let mut points = vec![curve.point_at(t_min)];

    let mut bounds: Vec<f64> = breaks
        .iter()
        .copied()
        .filter(|&u| u > t_min && u < t_max)
        .collect();
    bounds.insert(0, t_min);
    bounds.push(t_max);

    for w in bounds.windows(2) {
        subdivide_curve(curve, w[0], w[1], tolerance, &mut points, 0);
    }
    points
}

fn subdivide_curve(
    curve: &dyn Curve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<Point3>,
    depth: u32,
) {
    if depth >= MAX_DEPTH {
        points.push(curve.point_at(t1));
        return;
    }

    // Quarter points too, so an S-shaped piece with a straight chord through
    // its midpoint still gets split.
    let p0 = curve.point_at(t0);
    let p1 = curve.point_at(t1);
    let deviation = [0.25, 0.5, 0.75]
        .iter()
        .map(|&f| {
            let t = t0 + (t1 - t0) * f;
            (curve.point_at(t) - p0.lerp(p1, f)).length()
        })
        .fold(0.0, f64::max);

    if deviation > tolerance {
        let t_mid = (t0 + t1) * 0.5;
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1);
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1);
    } else {
        points.push(p1);
    }
}
