//! Structural curve operations: knot insertion, degree elevation, reversal
//! and concatenation. All of them work on homogeneous control points so
//! rational curves keep their exact shape.

use traj_math::{DVec3, DVec4};

use super::eval::binomial;
use super::knot::{find_span, knot_multiplicities};
use crate::curve::{BSplineCurve, SplineKind};

/// Insert the knot `u` once (The NURBS Book, A5.1 with r = 1).
pub fn insert_knot(curve: &BSplineCurve, u: f64) -> BSplineCurve {
    let p = curve.degree;
    let cps = curve.homogeneous();
    let n = cps.len() - 1;
    let k = find_span(p, &curve.knots, n, u);

    let mut new_cps = Vec::with_capacity(cps.len() + 1);
    new_cps.extend_from_slice(&cps[..=k - p]);
    for i in k - p + 1..=k {
        let alpha = (u - curve.knots[i]) / (curve.knots[i + p] - curve.knots[i]);
        new_cps.push(alpha * cps[i] + (1.0 - alpha) * cps[i - 1]);
    }
    new_cps.extend_from_slice(&cps[k..]);

    let mut knots = curve.knots.clone();
    knots.insert(k + 1, u);

    BSplineCurve::from_homogeneous(p, knots, &new_cps, curve.kind())
}

/// Raise every interior knot to multiplicity `degree`, splitting the curve
/// into Bezier segments that share their end control points.
pub fn decompose(curve: &BSplineCurve) -> BSplineCurve {
    let p = curve.degree;
    let mut out = curve.clone();
    let mults = knot_multiplicities(&curve.knots);
    for &(u, s) in &mults[1..mults.len() - 1] {
        for _ in s..p {
            out = insert_knot(&out, u);
        }
    }
    out
}

/// Elevate the degree by `t`, preserving the curve's shape.
///
/// Interior knots end up with multiplicity `degree + t`, i.e. the result is
/// only guaranteed C0 at former knot values.
pub fn elevate_degree(curve: &BSplineCurve, t: usize) -> BSplineCurve {
    if t == 0 {
        return curve.clone();
    }
    let p = curve.degree;
    let q = p + t;
    let bezier = decompose(curve);
    let cps = bezier.homogeneous();
    let segments = (cps.len() - 1) / p;

    let mut new_cps: Vec<DVec4> = Vec::with_capacity(segments * q + 1);
    for s in 0..segments {
        let seg = &cps[s * p..=s * p + p];
        let elevated = elevate_bezier(seg, t);
        let skip = if s == 0 { 0 } else { 1 };
        new_cps.extend_from_slice(&elevated[skip..]);
    }

    let mults = knot_multiplicities(&curve.knots);
    let last = mults.len() - 1;
    let mut knots = Vec::with_capacity(new_cps.len() + q + 1);
    for (i, &(u, _)) in mults.iter().enumerate() {
        let m = if i == 0 || i == last { q + 1 } else { q };
        knots.extend(std::iter::repeat(u).take(m));
    }

    BSplineCurve::from_homogeneous(q, knots, &new_cps, curve.kind())
}

fn elevate_bezier(cps: &[DVec4], t: usize) -> Vec<DVec4> {
    let p = cps.len() - 1;
    let q = p + t;
    (0..=q)
        .map(|i| {
            let lo = i.saturating_sub(t);
            let hi = p.min(i);
            let denom = binomial(q, i) as f64;
            (lo..=hi).fold(DVec4::ZERO, |acc, j| {
                acc + (binomial(p, j) * binomial(t, i - j)) as f64 / denom * cps[j]
            })
        })
        .collect()
}

/// Same curve traversed backwards over the same parameter domain.
pub fn reverse(curve: &BSplineCurve) -> BSplineCurve {
    let first = curve.knots[0];
    let last = curve.knots[curve.knots.len() - 1];
    BSplineCurve {
        degree: curve.degree,
        knots: curve.knots.iter().rev().map(|&k| first + last - k).collect(),
        control_points: curve.control_points.iter().rev().copied().collect(),
        weights: curve
            .weights
            .as_ref()
            .map(|w| w.iter().rev().copied().collect()),
    }
}

pub fn translate(curve: &BSplineCurve, offset: DVec3) -> BSplineCurve {
    BSplineCurve {
        control_points: curve.control_points.iter().map(|p| *p + offset).collect(),
        ..curve.clone()
    }
}

/// Same curve with unit weights.
pub fn to_rational(curve: &BSplineCurve) -> BSplineCurve {
    BSplineCurve {
        weights: Some(curve.weights.clone().unwrap_or_else(|| vec![1.0; curve.control_points.len()])),
        ..curve.clone()
    }
}

/// Concatenate `second` after `first`.
///
/// `second` is translated so that it starts at the end of `first` and its
/// domain is shifted to begin at `first`'s domain end. The joint is C0.
/// Degrees are unified by elevation and a polynomial curve is promoted when
/// the other one is rational.
pub fn concatenate(first: &BSplineCurve, second: &BSplineCurve) -> BSplineCurve {
    let degree = first.degree.max(second.degree);
    let mut a = elevate_degree(first, degree - first.degree);
    let mut b = elevate_degree(second, degree - second.degree);

    let kind = if a.is_rational() || b.is_rational() {
        a = to_rational(&a);
        b = to_rational(&b);
        SplineKind::Rational
    } else {
        SplineKind::Polynomial
    };

    b = translate(&b, a.end_point() - b.start_point());

    // Rescale the second curve's weights so both agree at the joint.
    let a_h = a.homogeneous();
    let mut b_h = b.homogeneous();
    let scale = a_h[a_h.len() - 1].w / b_h[0].w;
    for h in &mut b_h {
        *h *= scale;
    }

    let a_end = a.knots[a.knots.len() - 1];
    let shift = a_end - b.knots[0];

    let mut knots: Vec<f64> = a.knots[..a.knots.len() - 1].to_vec();
    knots.extend(b.knots[degree + 1..].iter().map(|&k| k + shift));

    let mut cps = a_h;
    cps.extend_from_slice(&b_h[1..]);

    BSplineCurve::from_homogeneous(degree, knots, &cps, kind)
}
