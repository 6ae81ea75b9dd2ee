//! Curve/curve and point/curve proximity tests on tessellated polylines.

use traj_math::segment::{point_segment_distance, segment_segment_distance};
use traj_math::{Aabb3, Point3};

use crate::curve::BSplineCurve;
use crate::nurbs::knot::knot_multiplicities;
use crate::tessellate::curve_to_polyline;

/// Polyline within `tolerance` of `curve`, broken at the distinct knots.
pub fn polyline(curve: &BSplineCurve, tolerance: f64) -> Vec<Point3> {
    let breaks: Vec<f64> = knot_multiplicities(&curve.knots)
        .into_iter()
        .map(|(u, _)| u)
        .collect();
    curve_to_polyline(curve, &breaks, tolerance)
}

/// Whether two curves come within `resolution` of each other.
///
/// Both curves are tessellated to a quarter of `resolution`, so a reported
/// contact may be up to half a resolution further apart than the exact
/// curves.
pub fn curves_intersect(a: &BSplineCurve, b: &BSplineCurve, resolution: f64) -> bool {
    let pa = polyline(a, 0.25 * resolution);
    let pb = polyline(b, 0.25 * resolution);
    polylines_within(&pa, &pb, resolution)
}

/// Whether `point` lies within `resolution` of `curve`.
pub fn point_on_curve(point: Point3, curve: &BSplineCurve, resolution: f64) -> bool {
    let pc = polyline(curve, 0.25 * resolution);
    pc.windows(2)
        .any(|s| point_segment_distance(point, s[0], s[1]) <= resolution)
}

fn polylines_within(a: &[Point3], b: &[Point3], resolution: f64) -> bool {
    let (Some(box_a), Some(box_b)) = (Aabb3::from_points(a), Aabb3::from_points(b)) else {
        return false;
    };
    if !box_a.expand(resolution).intersects(&box_b) {
        return false;
    }

    let boxes_b: Vec<Aabb3> = b
        .windows(2)
        .map(|s| Aabb3::from_segment(s[0], s[1]))
        .collect();

    a.windows(2).any(|sa| {
        let box_sa = Aabb3::from_segment(sa[0], sa[1]).expand(resolution);
        b.windows(2).zip(&boxes_b).any(|(sb, box_sb)| {
            box_sa.intersects(box_sb)
                && segment_segment_distance(sa[0], sa[1], sb[0], sb[1]) <= resolution
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::fit::interpolate;
    use traj_math::DVec3;

    fn line(a: DVec3, b: DVec3) -> BSplineCurve {
        interpolate(&[a, b], None, 2).unwrap()
    }

    #[test]
    fn test_crossing_lines() {
        let a = line(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
        let b = line(DVec3::new(0.0, -1.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
        assert!(curves_intersect(&a, &b, 0.01));
    }

    #[test]
    fn test_parallel_lines() {
        let a = line(DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
        let b = line(DVec3::new(0.0, 0.5, 0.0), DVec3::new(1.0, 0.5, 0.0));
        assert!(!curves_intersect(&a, &b, 0.1));
        assert!(curves_intersect(&a, &b, 0.6));
    }

    #[test]
    fn test_point_on_curve() {
        let a = line(DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0));
        assert!(point_on_curve(DVec3::new(1.0, 0.005, 0.0), &a, 0.01));
        assert!(!point_on_curve(DVec3::new(1.0, 0.5, 0.0), &a, 0.01));
    }
}
