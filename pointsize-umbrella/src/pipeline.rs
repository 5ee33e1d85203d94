//! Import pipeline: header, body, optional adaptive sizing, assembly
//!
//! One call runs every stage to completion on the calling thread. Nothing
//! is cached between calls and no global configuration is consulted; every
//! knob travels in [`ImportOptions`].

use pointsize_algorithms::{estimate_point_sizes, neighbor_work, validate_neighbor_count};
use pointsize_core::{invalid_parameter, PointRecord, PointSet, Result};
use pointsize_io::PlyReader;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Configuration for a single import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
    /// Neighbors averaged per point; zero or less disables adaptive sizing
    pub neighbor_count: i32,
    /// Upper bound on `neighbor_count × vertex_count` (None for unlimited)
    pub max_neighbor_work: Option<u64>,
}

impl ImportOptions {
    /// Options with adaptive sizing over `neighbor_count` neighbors
    pub fn with_neighbors(neighbor_count: i32) -> Self {
        Self {
            neighbor_count,
            ..Self::default()
        }
    }

    /// Reject imports whose `k·n` exceeds `limit`
    pub fn max_neighbor_work(mut self, limit: u64) -> Self {
        self.max_neighbor_work = Some(limit);
        self
    }

    /// Neighbor count when adaptive sizing is enabled
    pub fn adaptive_neighbors(&self) -> Option<usize> {
        (self.neighbor_count > 0).then_some(self.neighbor_count as usize)
    }

    /// Validate these options against a file's vertex count.
    ///
    /// Runs after the header is parsed and before the body is decoded, so a
    /// doomed import never pays for decoding or index construction.
    pub fn check(&self, vertex_count: usize) -> Result<()> {
        let Some(k) = self.adaptive_neighbors() else {
            return Ok(());
        };
        validate_neighbor_count(k, vertex_count)?;

        let work = neighbor_work(k, vertex_count);
        if let Some(limit) = self.max_neighbor_work {
            if work > limit {
                tracing::warn!(work, limit, neighbor_count = k, vertex_count, "neighbor work over ceiling");
                return Err(invalid_parameter(format!(
                    "adaptive sizing needs {} neighbor lookups ({} neighbors x {} vertices), limit is {}",
                    work, k, vertex_count, limit
                )));
            }
        }
        Ok(())
    }
}

/// Import the PLY file at `path`.
///
/// The point set is named after the file stem. The file handle is released
/// before this returns, on success and on every error.
pub fn import<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<PointSet> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let set = import_from_reader(file, options)?;

    Ok(match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => set.with_name(stem),
        None => set,
    })
}

/// Import from any seekable stream positioned at the start of a PLY file
pub fn import_from_reader<R: Read + Seek>(reader: R, options: &ImportOptions) -> Result<PointSet> {
    let stream = PlyReader::open(reader)?;
    let vertex_count = stream.header().vertex_count;
    options.check(vertex_count)?;

    let points = stream.read_points()?;
    debug_assert_eq!(points.len(), vertex_count);

    let sizes = match options.adaptive_neighbors() {
        Some(k) => {
            let positions: Vec<_> = points.iter().map(|p| p.position).collect();
            Some(estimate_point_sizes(&positions, k)?.sizes)
        }
        None => None,
    };

    let set = assemble(points, sizes)?;
    tracing::info!(
        vertices = set.len(),
        adaptive = set.has_sizes(),
        index_format = ?set.index_format,
        "imported point cloud"
    );
    Ok(set)
}

/// Merge decoded records with optional final sizes into a points-topology set
pub fn assemble(points: Vec<PointRecord>, sizes: Option<Vec<f32>>) -> Result<PointSet> {
    let points = match sizes {
        None => points,
        Some(sizes) if sizes.len() == points.len() => points
            .into_iter()
            .zip(sizes)
            .map(|(record, size)| record.with_size(size))
            .collect(),
        Some(sizes) => {
            return Err(invalid_parameter(format!(
                "{} sizes for {} points",
                sizes.len(),
                points.len()
            )))
        }
    };
    Ok(PointSet::from_records(points))
}
