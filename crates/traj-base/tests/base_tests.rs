use std::time::{Duration, SystemTime};

use approx::assert_abs_diff_eq;
use traj_base::{Pointcloud, Trajectory};
use traj_core::traits::Validate;
use traj_core::{SplineConfig, SplineError};
use traj_geometry::Spline;
use traj_math::{DVec3, DVec4};

#[test]
fn test_default_trajectory() {
    let trajectory = Trajectory::default();
    assert_eq!(trajectory.speed, 0.0);
    assert!(trajectory.drive_forward());
    assert!(trajectory.spline.is_empty());
    assert_eq!(trajectory.spline.dimension(), 3);
}

#[test]
fn test_drive_direction_follows_speed_sign() {
    let spline = Spline::from_points(SplineConfig::spatial(), &[0.0, 0.0, 0.0, 4.0, 3.0, 0.0], None).unwrap();
    let backwards = Trajectory::new(-0.5, spline.clone());
    assert!(!backwards.drive_forward());
    assert!(Trajectory::new(1.2, spline).drive_forward());
    assert_abs_diff_eq!(backwards.spline.curve_length().unwrap(), 5.0, epsilon = 1e-9);
}

#[test]
fn test_trajectory_serde_round_trip() {
    let spline = Spline::from_points(
        SplineConfig::spatial(),
        &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 0.0],
        None,
    )
    .unwrap();
    let trajectory = Trajectory::new(0.8, spline);
    let json = serde_json::to_string(&trajectory).unwrap();
    let back: Trajectory = serde_json::from_str(&json).unwrap();
    assert_eq!(back.speed, 0.8);
    assert_eq!(back.spline.shape(), trajectory.spline.shape());
    assert_abs_diff_eq!(
        back.spline.curve_length().unwrap(),
        trajectory.spline.curve_length().unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_pointcloud_colors() {
    let mut cloud = Pointcloud::new(SystemTime::UNIX_EPOCH + Duration::from_secs(42));
    cloud.points = vec![DVec3::ZERO, DVec3::X];
    assert!(!cloud.is_colored());
    cloud.validate().unwrap();

    cloud.colors = vec![DVec4::ONE];
    assert!(matches!(
        cloud.validate(),
        Err(SplineError::DimensionMismatch { expected: 2, actual: 1 })
    ));

    cloud.colors.push(DVec4::new(1.0, 0.0, 0.0, 1.0));
    cloud.validate().unwrap();

    let json = serde_json::to_string(&cloud).unwrap();
    let back: Pointcloud = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cloud);
}
