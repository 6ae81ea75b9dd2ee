use crate::error::{Result, SplineError};
use crate::traits::Validate;

/// Construction parameters of a spline curve.
///
/// `dimension` and `curve_order` are fixed for the lifetime of a curve;
/// `geometric_resolution` drives length integration, curvature sampling and
/// the default simplification tolerance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SplineConfig {
    /// Spatial dimension, 2 or 3
    pub dimension: usize,
    /// Polynomial order (degree + 1) used for fitting
    pub curve_order: usize,
    /// Tolerance of the numerical approximations (in model units)
    pub geometric_resolution: f64,
}

impl SplineConfig {
    pub const DEFAULT_ORDER: usize = 3;
    pub const DEFAULT_RESOLUTION: f64 = 0.1;

    pub fn new(dimension: usize, curve_order: usize, geometric_resolution: f64) -> Self {
        Self {
            dimension,
            curve_order,
            geometric_resolution,
        }
    }

    /// Curves in the ground plane.
    pub fn planar() -> Self {
        Self::new(2, Self::DEFAULT_ORDER, Self::DEFAULT_RESOLUTION)
    }

    pub fn spatial() -> Self {
        Self::new(3, Self::DEFAULT_ORDER, Self::DEFAULT_RESOLUTION)
    }

    pub fn with_order(mut self, curve_order: usize) -> Self {
        self.curve_order = curve_order;
        self
    }

    pub fn with_resolution(mut self, geometric_resolution: f64) -> Self {
        self.geometric_resolution = geometric_resolution;
        self
    }
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self::spatial()
    }
}

impl Validate for SplineConfig {
    fn validate(&self) -> Result<()> {
        if !(2..=3).contains(&self.dimension) {
            return Err(SplineError::InvalidConfig(format!(
                "dimension must be 2 or 3, got {}",
                self.dimension
            )));
        }
        if self.curve_order < 2 {
            return Err(SplineError::InvalidConfig(format!(
                "curve order must be at least 2, got {}",
                self.curve_order
            )));
        }
        if !(self.geometric_resolution > 0.0 && self.geometric_resolution.is_finite()) {
            return Err(SplineError::InvalidConfig(format!(
                "geometric resolution must be positive and finite, got {}",
                self.geometric_resolution
            )));
        }
        Ok(())
    }
}
