use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box, used to prune polyline pairs before exact
/// segment distance tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(*first, *first), |acc, &p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    pub fn from_segment(a: Point3, b: Point3) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Grow the box by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Self {
        let offset = Vector3::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }
}
