//! Frenet frame and the tracking errors a trajectory follower consumes.

use serde::{Deserialize, Serialize};
use traj_core::{Result, SplineError};
use traj_math::{angle_difference, normalize_angle, DMat3, DVec2, Point3, Vector3};

use super::Spline;
use crate::nurbs::analysis;

/// Horizontal tangent length below which the heading is undefined.
const MIN_HORIZONTAL: f64 = 1e-12;

/// Orthonormal frame at a curve parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrenetFrame {
    pub tangent: Vector3,
    pub normal: Vector3,
    pub binormal: Vector3,
}

impl FrenetFrame {
    /// The frame as a rotation matrix whose rows are tangent, normal and
    /// binormal.
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols(self.tangent, self.normal, self.binormal).transpose()
    }
}

/// Tracking error of a pose against the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseError {
    /// Signed lateral distance, positive left of the curve heading
    pub distance: f64,
    /// Actual heading minus curve heading, in `(-PI, PI]`
    pub heading: f64,
    /// Curve parameter the errors were measured at
    pub param: f64,
}

impl Spline {
    /// Frenet frame at `t`.
    ///
    /// Straight pieces get a horizontal normal, see
    /// [`analysis::frenet_frame`].
    pub fn frenet_frame(&self, t: f64) -> Result<FrenetFrame> {
        self.check_param(t)?;
        let curve = self.differential_curve("frenet_frame()")?;
        let [tangent, normal, binormal] = analysis::frenet_frame(curve, t).ok_or_else(|| {
            SplineError::Numerical(format!("frenet frame undefined at stationary point {t}"))
        })?;
        Ok(FrenetFrame {
            tangent,
            normal,
            binormal,
        })
    }

    /// Angle of the tangent projected onto the horizontal plane.
    pub fn heading(&self, t: f64) -> Result<f64> {
        let frame = self.frenet_frame(t)?;
        let axis = frame.tangent.truncate();
        if axis.length() < MIN_HORIZONTAL {
            return Err(SplineError::Numerical(format!(
                "heading undefined for a vertical tangent at {t}"
            )));
        }
        Ok(normalize_angle(axis.y.atan2(axis.x)))
    }

    pub fn heading_error(&self, actual_heading: f64, t: f64) -> Result<f64> {
        Ok(angle_difference(actual_heading, self.heading(t)?))
    }

    /// Horizontal distance from the curve point at `t` to `point`, positive
    /// when `point` lies left of the heading.
    pub fn distance_error(&self, point: Point3, t: f64) -> Result<f64> {
        let heading = self.heading(t)?;
        let error: DVec2 = (point - self.point_at(t)?).truncate();
        let distance = error.length();
        if distance == 0.0 {
            return Ok(0.0);
        }
        let side = angle_difference(error.y.atan2(error.x), heading);
        Ok(if side >= 0.0 { distance } else { -distance })
    }

    /// Distance and heading error at the closest point to `position` near
    /// `guess`, searched to the geometric resolution.
    pub fn pose_error(&self, position: Point3, heading: f64, guess: f64) -> Result<PoseError> {
        let param = self.find_one_closest_point(position, guess, self.geometric_resolution())?;
        Ok(PoseError {
            distance: self.distance_error(position, param)?,
            heading: self.heading_error(heading, param)?,
            param,
        })
    }
}
