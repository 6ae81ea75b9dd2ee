//! Planar angle helpers for heading computations.

use std::f64::consts::{PI, TAU};

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed difference `a - b` wrapped into `(-PI, PI]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}
