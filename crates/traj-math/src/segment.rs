//! Distances between points and line segments.

use crate::Point3;

/// Distance from `p` to the segment `[a, b]`.
pub fn point_segment_distance(p: Point3, a: Point3, b: Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-30 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + t * ab)
}

/// Minimum distance between the segments `[p0, p1]` and `[q0, q1]`.
pub fn segment_segment_distance(p0: Point3, p1: Point3, q0: Point3, q1: Point3) -> f64 {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    if a < 1e-30 && e < 1e-30 {
        return p0.distance(q0);
    }
    if a < 1e-30 {
        return point_segment_distance(p0, q0, q1);
    }
    if e < 1e-30 {
        return point_segment_distance(q0, p0, p1);
    }

    let c = d1.dot(r);
    let b = d1.dot(d2);
    let denom = a * e - b * b;

    // Parallel segments: any s works, pick the start.
    let mut s = if denom > 1e-30 {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }

    (p0 + s * d1).distance(q0 + t * d2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::dvec3;

    #[test]
    fn test_point_segment() {
        let a = dvec3(0.0, 0.0, 0.0);
        let b = dvec3(2.0, 0.0, 0.0);
        assert_abs_diff_eq!(point_segment_distance(dvec3(1.0, 1.0, 0.0), a, b), 1.0);
        assert_abs_diff_eq!(point_segment_distance(dvec3(3.0, 0.0, 0.0), a, b), 1.0);
        assert_abs_diff_eq!(point_segment_distance(dvec3(1.0, 0.0, 0.0), a, a), 1.0);
    }

    #[test]
    fn test_crossing_segments() {
        let d = segment_segment_distance(
            dvec3(-1.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, -1.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        );
        assert_abs_diff_eq!(d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_and_parallel_segments() {
        let d = segment_segment_distance(
            dvec3(-1.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, -1.0, 2.0),
            dvec3(0.0, 1.0, 2.0),
        );
        assert_abs_diff_eq!(d, 2.0, epsilon = 1e-12);

        let d = segment_segment_distance(
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.5, 0.0),
            dvec3(3.0, 0.5, 0.0),
        );
        assert_abs_diff_eq!(d, (1.0f64 + 0.25).sqrt(), epsilon = 1e-12);
    }
}
