pub mod aabb;
pub mod angle;
pub mod segment;

pub use glam::{dvec3, DMat3, DVec2, DVec3, DVec4};
pub use aabb::Aabb3;
pub use angle::{angle_difference, normalize_angle};

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
