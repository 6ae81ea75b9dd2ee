use approx::assert_abs_diff_eq;
use traj_core::traits::BoundingBox;
use traj_core::{SplineConfig, SplineError};
use traj_geometry::{Shape, Spline, SplineKind};
use traj_math::DVec3;

fn spatial(points: &[f64]) -> Spline {
    Spline::from_points(SplineConfig::spatial(), points, None).unwrap()
}

fn straight_line() -> Spline {
    Spline::from_points(
        SplineConfig::spatial().with_order(2),
        &[0.0, 0.0, 0.0, 10.0, 0.0, 0.0],
        None,
    )
    .unwrap()
}

#[test]
fn test_fitted_endpoints_match_points() {
    let points = [0.0, 0.0, 0.0, 1.0, 2.0, 0.5, 3.0, 2.5, 1.0, 4.0, 0.0, 0.0];
    let spline = spatial(&points);
    assert_eq!(spline.start_param(), 0.0);
    let start = spline.point_at(spline.start_param()).unwrap();
    let end = spline.point_at(spline.end_param()).unwrap();
    assert_abs_diff_eq!(start, DVec3::ZERO, epsilon = 1e-9);
    assert_abs_diff_eq!(end, DVec3::new(4.0, 0.0, 0.0), epsilon = 1e-9);
}

#[test]
fn test_singleton_properties() {
    let spline = spatial(&[1.0, 2.0, 3.0]);
    assert!(spline.is_singleton());
    assert_eq!(spline.point_count(), 1);
    assert_eq!(spline.domain(), (0.0, 0.0));
    assert_eq!(spline.curve_length().unwrap(), 0.0);

    let (point, tangent) = spline.point_and_tangent_at(0.0).unwrap();
    assert_eq!(point, DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(tangent, DVec3::ZERO);
    assert!(matches!(
        spline.curvature_at(0.0),
        Err(SplineError::InvalidOperation(_))
    ));
}

#[test]
fn test_append_with_empty() {
    let curve = spatial(&[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 1.0]);

    let mut empty = Spline::new(SplineConfig::spatial()).unwrap();
    empty.append(&curve).unwrap();
    assert_eq!(empty.shape(), curve.shape());

    let mut copy = curve.clone();
    copy.append(&Spline::new(SplineConfig::spatial()).unwrap()).unwrap();
    assert_eq!(copy.shape(), curve.shape());
}

#[test]
fn test_join_within_tolerance_adds_lengths() {
    let mut a = spatial(&[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 0.0]);
    let b = spatial(&[2.0, 0.0, 0.0, 3.0, -1.0, 0.0, 4.0, 0.0, 0.0]);
    let expected = a.curve_length().unwrap() + b.curve_length().unwrap();
    a.join(&b, 0.01).unwrap();
    assert_abs_diff_eq!(a.curve_length().unwrap(), expected, epsilon = 0.1);
    assert_abs_diff_eq!(
        a.point_at(a.end_param()).unwrap(),
        DVec3::new(4.0, 0.0, 0.0),
        epsilon = 1e-9
    );
}

#[test]
fn test_join_two_singletons_gives_line() {
    let mut a = spatial(&[0.0, 0.0, 0.0]);
    let b = spatial(&[3.0, 4.0, 0.0]);
    a.join(&b, 0.1).unwrap();
    assert!(!a.is_singleton());
    assert_eq!(a.point_count(), 2);
    assert_abs_diff_eq!(a.curve_length().unwrap(), 5.0, epsilon = 1e-9);
}

#[test]
fn test_join_dimension_mismatch() {
    let mut a = spatial(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    let b = Spline::from_points(SplineConfig::planar(), &[2.0, 0.0, 3.0, 0.0], None).unwrap();
    assert!(matches!(
        a.join(&b, 0.1),
        Err(SplineError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_guess_inside_degenerate_interval() {
    // Quarter arcs of the unit circle around the origin
    let w = std::f64::consts::FRAC_1_SQRT_2;
    let mut arc = Spline::new(SplineConfig::planar()).unwrap();
    arc.reset(
        &[1.0, 0.0, 1.0, w, w, w, 0.0, 1.0, 1.0],
        &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        Some(SplineKind::Rational),
    )
    .unwrap();
    let found = arc.find_closest_points(DVec3::ZERO, 0.01);
    assert_eq!(found.intervals.len(), 1);
    assert_eq!(arc.find_one_closest_point(DVec3::ZERO, 0.42, 0.01).unwrap(), 0.42);
}

#[test]
fn test_reset_round_trip() {
    let fitted = spatial(&[0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 2.0, 2.0, 1.0, 3.0, 0.0, 1.0]);
    let mut rebuilt = Spline::new(SplineConfig::spatial()).unwrap();
    rebuilt
        .reset(&fitted.coordinates(), &fitted.knots(), Some(SplineKind::Polynomial))
        .unwrap();
    assert_eq!(rebuilt.shape(), fitted.shape());
    assert_eq!(rebuilt.bounding_box(), fitted.bounding_box());
    for i in 0..=8 {
        let t = fitted.end_param() * i as f64 / 8.0;
        assert_abs_diff_eq!(rebuilt.point_at(t).unwrap(), fitted.point_at(t).unwrap(), epsilon = 1e-12);
    }
}

#[test]
fn test_straight_line_tracking() {
    let line = straight_line();
    assert_abs_diff_eq!(line.curve_length().unwrap(), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(line.curvature_max().unwrap(), 0.0);
    for i in 0..=10 {
        assert_abs_diff_eq!(line.heading(i as f64).unwrap(), 0.0, epsilon = 1e-12);
    }

    let reference = DVec3::new(5.0, 1.0, 0.0);
    let best = line.find_one_closest_point(reference, 0.0, 0.01).unwrap();
    assert_abs_diff_eq!(best, 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(line.distance_error(reference, best).unwrap(), 1.0, epsilon = 1e-6);

    let pose = line.pose_error(reference, 0.3, 2.0).unwrap();
    assert_abs_diff_eq!(pose.distance, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(pose.heading, 0.3, epsilon = 1e-12);
    assert_abs_diff_eq!(pose.param, 5.0, epsilon = 1e-6);
}

#[test]
fn test_empty_curve_queries_fail() {
    let mut spline = straight_line();
    spline.interpolate(&[], None).unwrap();
    assert!(matches!(spline.shape(), Shape::Empty));
    assert_eq!(spline.point_count(), 0);

    assert!(matches!(spline.point_at(1.0), Err(SplineError::OutOfRange { .. })));
    assert!(matches!(spline.point_at(0.0), Err(SplineError::InvalidOperation(_))));
    assert!(matches!(spline.curve_length(), Err(SplineError::InvalidOperation(_))));
    assert!(matches!(spline.curvature_max(), Err(SplineError::InvalidOperation(_))));
    assert!(spline.frenet_frame(0.0).is_err());
    assert!(spline.heading(0.0).is_err());
    assert!(spline.pose_error(DVec3::X, 0.0, 0.0).is_err());
}

#[test]
fn test_simplify_then_query() {
    let mut points = Vec::new();
    for i in 0..20 {
        let x = i as f64 * 0.5;
        points.extend_from_slice(&[x, (0.3 * x).sin(), 0.0]);
    }
    let mut spline = spatial(&points);
    let before = spline.point_count();
    let errors = spline.simplify(Some(0.01)).unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|&e| e <= 0.01));
    assert!(spline.point_count() <= before);
    assert_abs_diff_eq!(
        spline.point_at(spline.end_param()).unwrap(),
        DVec3::new(9.5, (0.3_f64 * 9.5).sin(), 0.0),
        epsilon = 0.01
    );
}

#[test]
fn test_display_mentions_length() {
    let text = straight_line().to_string();
    assert!(text.contains("CURVE PROPERTIES"));
    assert!(text.contains("Length"));
    let empty = Spline::new(SplineConfig::spatial()).unwrap().to_string();
    assert!(empty.contains("n/a"));
}
