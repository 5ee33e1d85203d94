//! Adaptive point sizing
//!
//! Each point's size is the mean Euclidean distance to its k nearest
//! neighbors. Sizes farther than three population standard deviations from
//! the global mean are replaced by the mean, so one isolated point cannot
//! dominate the rendered point size.
//!
//! # Cost
//!
//! Building the index is O(n log n); the all-points pass issues n queries of
//! roughly O(k log n) each, so the whole estimate is O(n·k·log n). Callers
//! should bound [`neighbor_work`] before calling [`estimate_point_sizes`] on
//! large inputs rather than letting it run unchecked.

use crate::nearest_neighbor::KdTree;
use pointsize_core::{invalid_parameter, Point3f, Result};

/// Number of standard deviations tolerated before a size is clamped
pub const CLAMP_SIGMAS: f64 = 3.0;

/// Output of the adaptive size estimator
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveSizes {
    /// Mean k-NN distance per point, before clamping
    pub raw: Vec<f32>,
    /// Sizes to attach to the point set
    pub sizes: Vec<f32>,
    /// Mean of `raw`
    pub mean: f32,
    /// Population standard deviation of `raw`
    pub std_dev: f32,
    /// How many sizes were replaced by `mean`
    pub clamped: usize,
}

impl AdaptiveSizes {
    /// Inclusive range of raw sizes kept as-is
    pub fn accepted_range(&self) -> (f64, f64) {
        let spread = CLAMP_SIGMAS * self.std_dev as f64;
        (self.mean as f64 - spread, self.mean as f64 + spread)
    }
}

/// The `k·n` product that drives the cost of a size estimate
pub fn neighbor_work(neighbor_count: usize, vertex_count: usize) -> u64 {
    (neighbor_count as u64).saturating_mul(vertex_count as u64)
}

/// Check `neighbor_count` against `vertex_count` before any index is built
pub fn validate_neighbor_count(neighbor_count: usize, vertex_count: usize) -> Result<()> {
    if neighbor_count == 0 {
        return Err(invalid_parameter("neighbor count must be greater than 0"));
    }
    if neighbor_count >= vertex_count {
        return Err(invalid_parameter(format!(
            "neighbor count {} must be smaller than vertex count {}",
            neighbor_count, vertex_count
        )));
    }
    Ok(())
}

/// Estimate a size for every point from its `k` nearest neighbors.
///
/// Fails with `InvalidParameter` when `k == 0` or `k >= positions.len()`;
/// the check runs before the index is built. The index is dropped before
/// this function returns.
pub fn estimate_point_sizes(positions: &[Point3f], k: usize) -> Result<AdaptiveSizes> {
    validate_neighbor_count(k, positions.len())?;

    let tree = KdTree::build(positions)?;
    tracing::debug!(points = positions.len(), height = tree.height(), "built k-d tree");

    let raw = positions
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let neighbors = tree.query_k_nearest(i, k)?;
            let total: f32 = neighbors.iter().map(|n| n.distance).sum();
            Ok(total / k as f32)
        })
        .collect::<Result<Vec<f32>>>()?;
    drop(tree);

    let sizes = clamp_outliers(&raw);
    tracing::debug!(
        neighbor_count = k,
        mean = sizes.mean,
        std_dev = sizes.std_dev,
        clamped = sizes.clamped,
        "estimated adaptive point sizes"
    );
    Ok(sizes)
}

/// Replace values outside `mean ± 3σ` with the mean.
///
/// Mean and population standard deviation are accumulated in `f64`.
pub fn clamp_outliers(raw: &[f32]) -> AdaptiveSizes {
    if raw.is_empty() {
        return AdaptiveSizes {
            raw: Vec::new(),
            sizes: Vec::new(),
            mean: 0.0,
            std_dev: 0.0,
            clamped: 0,
        };
    }

    let n = raw.len() as f64;
    let mean = raw.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = raw
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let upper = mean + CLAMP_SIGMAS * std_dev;
    let lower = mean - CLAMP_SIGMAS * std_dev;

    let mut clamped = 0;
    let sizes = raw
        .iter()
        .map(|&v| {
            let value = v as f64;
            if value > upper || value < lower {
                clamped += 1;
                mean as f32
            } else {
                v
            }
        })
        .collect();

    AdaptiveSizes {
        raw: raw.to_vec(),
        sizes,
        mean: mean as f32,
        std_dev: std_dev as f32,
        clamped,
    }
}
