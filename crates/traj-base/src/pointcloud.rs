use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use traj_core::traits::Validate;
use traj_core::{Result, SplineError};
use traj_math::{DVec3, DVec4};

/// Points captured at one instant, optionally colored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pointcloud {
    pub time: SystemTime,
    pub points: Vec<DVec3>,
    /// RGBA per point, or empty for an uncolored cloud
    pub colors: Vec<DVec4>,
}

impl Pointcloud {
    pub fn new(time: SystemTime) -> Self {
        Self {
            time,
            points: Vec::new(),
            colors: Vec::new(),
        }
    }

    pub fn is_colored(&self) -> bool {
        !self.colors.is_empty()
    }
}

impl Default for Pointcloud {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Validate for Pointcloud {
    fn validate(&self) -> Result<()> {
        if self.is_colored() && self.colors.len() != self.points.len() {
            return Err(SplineError::DimensionMismatch {
                expected: self.points.len(),
                actual: self.colors.len(),
            });
        }
        Ok(())
    }
}
