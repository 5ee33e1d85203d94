//! Point types and related functionality

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// RGBA color, 8 bits per channel
pub type Rgba8 = [u8; 4];

/// Color given to points whose file carries no color properties.
///
/// Full intensity and fully opaque, so color-less clouds still render visibly.
pub const DEFAULT_COLOR: Rgba8 = [255, 255, 255, 255];

/// A decoded vertex: position, color and the optional adaptive size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: Point3f,
    pub color: Rgba8,
    /// Present only when adaptive sizing ran for the import
    pub size: Option<f32>,
}

impl PointRecord {
    pub fn new(position: Point3f, color: Rgba8) -> Self {
        Self {
            position,
            color,
            size: None,
        }
    }

    /// Same record with `size` attached
    pub fn with_size(self, size: f32) -> Self {
        Self {
            size: Some(size),
            ..self
        }
    }
}

impl Default for PointRecord {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            color: DEFAULT_COLOR,
            size: None,
        }
    }
}

impl From<PointRecord> for Point3f {
    fn from(record: PointRecord) -> Self {
        record.position
    }
}
