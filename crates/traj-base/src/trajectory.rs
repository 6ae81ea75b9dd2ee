use serde::{Deserialize, Serialize};
use traj_geometry::Spline;

/// A spline to drive along, with a signed traversal speed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    /// Negative when the spline is driven backwards
    pub speed: f64,
    pub spline: Spline,
}

impl Trajectory {
    pub fn new(speed: f64, spline: Spline) -> Self {
        Self { speed, spline }
    }

    /// Whether the robot drives forward along the spline. Zero speed
    /// counts as forward.
    pub fn drive_forward(&self) -> bool {
        self.speed >= 0.0
    }
}
