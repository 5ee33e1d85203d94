//! Assembled point sets handed to the renderer

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Largest vertex count addressable with 16-bit indices
pub const U16_INDEX_LIMIT: usize = 65_535;

/// Primitive connectivity of a point set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Every vertex is an independent primitive, no edges or faces
    Points,
}

/// Index width the renderer should upload the index list with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    /// Narrowest format able to address `vertex_count` vertices
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > U16_INDEX_LIMIT {
            IndexFormat::U32
        } else {
            IndexFormat::U16
        }
    }
}

/// Renderable point set produced by an import
///
/// `indices` is always `0..len()`, paired with [`Topology::Points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    /// Source name, the file stem when imported from a path
    pub name: Option<String>,
    pub points: Vec<PointRecord>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    pub index_format: IndexFormat,
}

impl PointSet {
    /// Build a points-topology set over `points`
    pub fn from_records(points: Vec<PointRecord>) -> Self {
        let indices = (0..points.len() as u32).collect();
        let index_format = IndexFormat::for_vertex_count(points.len());
        Self {
            name: None,
            points,
            indices,
            topology: Topology::Points,
            index_format,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Get the number of points in the set
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointRecord> {
        self.points.iter()
    }

    /// Whether adaptive sizes were attached
    pub fn has_sizes(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.size.is_some())
    }

    pub fn positions(&self) -> Vec<Point3f> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn colors(&self) -> Vec<Rgba8> {
        self.points.iter().map(|p| p.color).collect()
    }

    /// Per-point sizes laid out as `(size, size)` pairs.
    ///
    /// Output-format compatibility shim: the renderer's size slot is a
    /// 2-component texture coordinate, so the scalar is duplicated. Returns
    /// `None` when the import ran without adaptive sizing.
    pub fn size_uvs(&self) -> Option<Vec<[f32; 2]>> {
        if !self.has_sizes() {
            return None;
        }
        Some(
            self.points
                .iter()
                .filter_map(|p| p.size)
                .map(|s| [s, s])
                .collect(),
        )
    }
}

impl Index<usize> for PointSet {
    type Output = PointRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl IntoIterator for PointSet {
    type Item = PointRecord;
    type IntoIter = std::vec::IntoIter<PointRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a PointRecord;
    type IntoIter = std::slice::Iter<'a, PointRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
