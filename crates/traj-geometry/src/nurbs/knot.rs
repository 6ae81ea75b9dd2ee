//! Knot vectors: span search, basis functions, and the knot layouts used for
//! fitting.

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`,
/// with special handling for the upper boundary.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        // Last non-empty span, so that the end of the domain evaluates
        let mut span = n;
        while span > degree && knots[span] >= knots[n + 1] {
            span -= 1;
        }
        return span;
    }
    if t <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the non-vanishing basis functions and their derivatives up to
/// order `n_derivs` at parameter `t` (The NURBS Book, A2.3).
///
/// Returns `ders` where `ders[k][j]` is the `k`-th derivative of
/// N_{span-degree+j, degree}(t). Derivatives above the degree are zero.
pub fn basis_function_derivs(
    degree: usize,
    knots: &[f64],
    span: usize,
    t: f64,
    n_derivs: usize,
) -> Vec<Vec<f64>> {
    let p = degree;
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            // Lower triangle holds the knot differences
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ndu[r][j - 1] / ndu[j][r];

            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders = vec![vec![0.0; p + 1]; n_derivs + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let max_k = n_derivs.min(p);
    let mut a = vec![vec![0.0; p + 1]; 2];

    for r in 0..=p {
        let mut s1 = 0usize;
        let mut s2 = 1usize;
        a[0][0] = 1.0;

        for k in 1..=max_k {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;

            if r >= k {
                a[s2][0] = a[s1][0] / ndu[pk + 1][r - k];
                d = a[s2][0] * ndu[r - k][pk];
            }

            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r <= pk + 1 { k - 1 } else { p - r };

            for j in j1..=j2 {
                let idx = (rk + j as isize) as usize;
                a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][idx];
                d += a[s2][j] * ndu[idx][pk];
            }

            if r <= pk {
                a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                d += a[s2][k] * ndu[r][pk];
            }

            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    let mut factor = p as f64;
    for k in 1..=max_k {
        for val in &mut ders[k] {
            *val *= factor;
        }
        factor *= (p - k) as f64;
    }

    ders
}

/// Compute the non-vanishing basis functions at parameter `t`.
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Clamped knot vector over `params` using the averaging technique
/// (The NURBS Book, eq. 9.8). `params` must hold one value per control point.
pub fn averaged_knots(degree: usize, params: &[f64]) -> Vec<f64> {
    let n = params.len();
    let first = params[0];
    let last = params[n - 1];

    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat(first).take(degree + 1));
    for j in 1..n - degree {
        let sum: f64 = params[j..j + degree].iter().sum();
        knots.push(sum / degree as f64);
    }
    knots.extend(std::iter::repeat(last).take(degree + 1));
    knots
}

/// Clamped knot vector on `[start, end]` with `count` control points and
/// evenly spaced interior knots.
pub fn uniform_knots(degree: usize, count: usize, start: f64, end: f64) -> Vec<f64> {
    let interior = count - degree - 1;
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat(start).take(degree + 1));
    for j in 1..=interior {
        knots.push(start + (end - start) * j as f64 / (interior + 1) as f64);
    }
    knots.extend(std::iter::repeat(end).take(degree + 1));
    knots
}

/// Distinct knot values with their multiplicities, in ascending order.
pub fn knot_multiplicities(knots: &[f64]) -> Vec<(f64, usize)> {
    let mut out: Vec<(f64, usize)> = Vec::new();
    for &k in knots {
        match out.last_mut() {
            Some((value, count)) if *value == k => *count += 1,
            _ => out.push((k, 1)),
        }
    }
    out
}

/// Whether `knots` is non-decreasing and clamped for a curve of the given
/// degree and control point count.
pub fn is_clamped(degree: usize, count: usize, knots: &[f64]) -> bool {
    if knots.len() != count + degree + 1 || count < degree + 1 {
        return false;
    }
    if knots.windows(2).any(|w| !(w[0] <= w[1])) {
        return false;
    }
    let first = knots[0];
    let last = knots[knots.len() - 1];
    first < last
        && knots[..=degree].iter().all(|&k| k == first)
        && knots[count..].iter().all(|&k| k == last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span_uniform() {
        let knots = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let n = 4;
        let degree = 2;

        assert_eq!(find_span(degree, &knots, n, 0.0), 2);
        assert_eq!(find_span(degree, &knots, n, 0.5), 2);
        assert_eq!(find_span(degree, &knots, n, 1.0), 3);
        assert_eq!(find_span(degree, &knots, n, 1.5), 3);
        assert_eq!(find_span(degree, &knots, n, 2.5), 4);
        assert_eq!(find_span(degree, &knots, n, 3.0), 4);
    }

    #[test]
    fn test_basis_functions_partition_of_unity() {
        let knots = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let degree = 2;
        let n = 4;

        for &t in &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0] {
            let span = find_span(degree, &knots, n, t);
            let basis = basis_functions(degree, &knots, span, t);
            let sum: f64 = basis.iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "Partition of unity failed at t={}: sum={}",
                t,
                sum
            );
        }
    }

    #[test]
    fn test_derivs_match_bernstein() {
        // Cubic Bezier basis: N0 = (1-t)^3, N0' = -3(1-t)^2, N0'' = 6(1-t)
        let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let t = 0.25;
        let span = find_span(3, &knots, 3, t);
        let ders = basis_function_derivs(3, &knots, span, t, 3);

        let s = 1.0 - t;
        assert!((ders[0][0] - s * s * s).abs() < 1e-12);
        assert!((ders[1][0] + 3.0 * s * s).abs() < 1e-12);
        assert!((ders[2][0] - 6.0 * s).abs() < 1e-12);
        assert!((ders[3][0] + 6.0).abs() < 1e-12);
        // N3 = t^3
        assert!((ders[0][3] - t * t * t).abs() < 1e-12);
        assert!((ders[1][3] - 3.0 * t * t).abs() < 1e-12);
        assert!((ders[2][3] - 6.0 * t).abs() < 1e-12);

        // Derivatives of a partition of unity sum to zero
        for k in 1..=3 {
            let sum: f64 = ders[k].iter().sum();
            assert!(sum.abs() < 1e-10, "derivative {} sums to {}", k, sum);
        }
    }

    #[test]
    fn test_derivs_above_degree_are_zero() {
        let knots = vec![0.0, 0.0, 1.0, 1.0];
        let ders = basis_function_derivs(1, &knots, 1, 0.5, 3);
        assert_eq!(ders.len(), 4);
        assert!(ders[2].iter().chain(ders[3].iter()).all(|&v| v == 0.0));
        assert!((ders[1][0] + 1.0).abs() < 1e-12);
        assert!((ders[1][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_averaged_knots() {
        let params = [0.0, 1.0, 3.0, 4.0, 6.0];
        let knots = averaged_knots(2, &params);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 2.0, 3.5, 6.0, 6.0, 6.0]);
        assert!(is_clamped(2, params.len(), &knots));
    }

    #[test]
    fn test_uniform_knots_and_multiplicities() {
        let knots = uniform_knots(1, 4, 0.0, 3.0);
        assert_eq!(knots, vec![0.0, 0.0, 1.0, 2.0, 3.0, 3.0]);
        let mult = knot_multiplicities(&knots);
        assert_eq!(mult, vec![(0.0, 2), (1.0, 1), (2.0, 1), (3.0, 2)]);
    }

    #[test]
    fn test_is_clamped_rejects_bad_vectors() {
        assert!(!is_clamped(2, 3, &[0.0, 0.0, 0.0, 1.0, 1.0]));
        assert!(!is_clamped(1, 2, &[0.0, 0.5, 1.0, 1.0]));
        assert!(!is_clamped(1, 3, &[0.0, 0.0, 2.0, 1.0, 1.0]));
        assert!(!is_clamped(1, 2, &[1.0, 1.0, 1.0, 1.0]));
        assert!(is_clamped(1, 2, &[0.0, 0.0, 1.0, 1.0]));
    }
}
