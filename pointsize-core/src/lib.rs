//! Core data structures and traits for pointsize
//!
//! This crate provides the fundamental types shared by the import pipeline:
//! decoded point records, the assembled point set, the error type, and the
//! nearest-neighbor search trait.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::Point3;
