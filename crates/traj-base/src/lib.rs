//! Collaborators of the spline engine: trajectories and sensor samples.

pub mod distance_image;
pub mod pointcloud;
pub mod trajectory;

pub use distance_image::DistanceImage;
pub use pointcloud::Pointcloud;
pub use trajectory::Trajectory;
