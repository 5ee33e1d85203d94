//! Core traits for pointsize

use crate::{point::*, point_cloud::*};

/// Trait for nearest neighbor search functionality
///
/// Results are `(index, distance)` pairs ordered by ascending Euclidean
/// distance, ties broken by ascending index.
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to an arbitrary query point
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

impl Drawable for PointSet {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let Some(first) = self.points.first() else {
            return (Point3f::origin(), Point3f::origin());
        };

        let mut min = first.position;
        let mut max = first.position;
        for record in &self.points {
            let p = record.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }
}
