//! # Pointsize Algorithms
//!
//! Spatial search and per-point size estimation for imported point clouds.
//!
//! [`KdTree`] is an arena-backed 3-d tree answering k-nearest-neighbor
//! queries; [`estimate_point_sizes`] uses it to derive an adaptive size for
//! every point and clamps statistical outliers to the global mean.

pub mod nearest_neighbor;
pub mod point_size;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use point_size::*;
