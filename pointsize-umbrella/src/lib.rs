//! # pointsize
//!
//! Binary PLY point-cloud import with adaptive per-point sizing.
//!
//! This is the umbrella crate: it ties the header parser and body decoder in
//! `pointsize-io` to the k-d tree and size estimator in
//! `pointsize-algorithms`, and assembles the result into a renderable
//! [`PointSet`] with points topology.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pointsize::prelude::*;
//!
//! fn main() -> pointsize::Result<()> {
//!     // Average the distance to 8 neighbors per point, refusing runaway work
//!     let options = ImportOptions::with_neighbors(8).max_neighbor_work(50_000_000);
//!     let set = import("scan.ply", &options)?;
//!
//!     if let Some(uvs) = set.size_uvs() {
//!         println!("{} points, first size {}", set.len(), uvs[0][0]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Cost
//!
//! With adaptive sizing enabled an import costs O(n·k·log n). Use
//! [`ImportOptions::max_neighbor_work`] to bound `k·n` up front.

pub mod pipeline;

pub use pipeline::*;

// Re-export the member crates
pub use pointsize_algorithms as algorithms;
pub use pointsize_core::*;
pub use pointsize_io as io;

pub mod prelude {
    pub use crate::pipeline::{assemble, import, import_from_reader, ImportOptions};
    pub use pointsize_algorithms::{estimate_point_sizes, AdaptiveSizes, KdTree, Neighbor};
    pub use pointsize_core::{
        Drawable, Error, IndexFormat, NearestNeighborSearch, Point3f, PointRecord, PointSet,
        Result, Rgba8, Topology,
    };
}
