//! Nearest neighbor search implementations

use pointsize_core::{invalid_parameter, NearestNeighborSearch, Point3f, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Sentinel child slot meaning "no subtree"
const NIL: u32 = u32::MAX;

/// A neighbor returned by [`KdTree::query_k_nearest`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    /// Euclidean distance to the query point
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct KdNode {
    /// Index into the original point slice
    point: u32,
    axis: u8,
    left: u32,
    right: u32,
}

/// Balanced 3-d tree over a fixed point slice
///
/// Nodes live in one arena and refer to each other and to the points by
/// `u32` index, so the whole tree is a pair of flat vectors that can be
/// serialized or dropped as a unit. The tree is immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdTree {
    points: Vec<Point3f>,
    nodes: Vec<KdNode>,
    root: u32,
}

impl KdTree {
    /// Build the tree, splitting at the median on x, y, z in turn by depth.
    ///
    /// Fails with `InvalidParameter` if any coordinate is not finite.
    pub fn build(points: &[Point3f]) -> Result<Self> {
        if points.len() >= NIL as usize {
            return Err(invalid_parameter(format!(
                "{} points exceed the k-d tree capacity",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(invalid_parameter(format!(
                "point {} has a non-finite coordinate: {:?}",
                bad, points[bad]
            )));
        }

        let mut order: Vec<u32> = (0..points.len() as u32).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = build_subtree(points, &mut order, 0, &mut nodes);

        Ok(Self {
            points: points.to_vec(),
            nodes,
            root,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of levels from the root to the deepest leaf
    pub fn height(&self) -> usize {
        fn walk(nodes: &[KdNode], node: u32) -> usize {
            if node == NIL {
                return 0;
            }
            let n = &nodes[node as usize];
            1 + walk(nodes, n.left).max(walk(nodes, n.right))
        }
        walk(&self.nodes, self.root)
    }

    /// The `k` points closest to point `point_index`, excluding itself.
    ///
    /// Ordered by ascending distance, ties broken by ascending index. Fails
    /// with `InvalidParameter` when `k == 0`, when `k >= len()` (not enough
    /// other points) or when `point_index` is out of range.
    pub fn query_k_nearest(&self, point_index: usize, k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(invalid_parameter("neighbor count must be greater than 0"));
        }
        if k >= self.len() {
            return Err(invalid_parameter(format!(
                "neighbor count {} requires more than {} points",
                k,
                self.len()
            )));
        }
        let query = self.points.get(point_index).ok_or_else(|| {
            invalid_parameter(format!(
                "point index {} out of range for {} points",
                point_index,
                self.len()
            ))
        })?;

        Ok(self
            .nearest(query, k, Some(point_index as u32))
            .into_iter()
            .map(|(index, distance)| Neighbor { index, distance })
            .collect())
    }

    fn nearest(&self, query: &Point3f, k: usize, exclude: Option<u32>) -> Vec<(usize, f32)> {
        let mut heap = BinaryHeap::with_capacity(k + 1);
        if k > 0 {
            self.search(self.root, query, k, exclude, &mut heap);
        }
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.index as usize, c.dist_sq.sqrt()))
            .collect()
    }

    fn search(
        &self,
        node: u32,
        query: &Point3f,
        k: usize,
        exclude: Option<u32>,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        if node == NIL {
            return;
        }
        let n = &self.nodes[node as usize];
        let p = &self.points[n.point as usize];

        if exclude != Some(n.point) {
            let candidate = Candidate {
                dist_sq: (p - query).norm_squared(),
                index: n.point,
            };
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        let axis = n.axis as usize;
        let diff = query[axis] - p[axis];
        let (near, far) = if diff < 0.0 {
            (n.left, n.right)
        } else {
            (n.right, n.left)
        };

        self.search(near, query, k, exclude, heap);

        // `<=` keeps equal-distance points with a smaller index reachable
        let plane_sq = diff * diff;
        if heap.len() < k || heap.peek().is_some_and(|worst| plane_sq <= worst.dist_sq) {
            self.search(far, query, k, exclude, heap);
        }
    }
}

fn build_subtree(points: &[Point3f], order: &mut [u32], depth: usize, nodes: &mut Vec<KdNode>) -> u32 {
    if order.is_empty() {
        return NIL;
    }

    let axis = depth % 3;
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        points[a as usize][axis]
            .total_cmp(&points[b as usize][axis])
            .then(a.cmp(&b))
    });

    let slot = nodes.len() as u32;
    nodes.push(KdNode {
        point: order[mid],
        axis: axis as u8,
        left: NIL,
        right: NIL,
    });

    let (lower, rest) = order.split_at_mut(mid);
    let left = build_subtree(points, lower, depth + 1, nodes);
    let right = build_subtree(points, &mut rest[1..], depth + 1, nodes);

    let node = &mut nodes[slot as usize];
    node.left = left;
    node.right = right;
    slot
}

/// Heap entry ordered by (squared distance, index)
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist_sq: f32,
    index: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        self.nearest(query, k.min(self.len()), None)
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut candidates: Vec<Candidate> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| Candidate {
                dist_sq: (point - query).norm_squared(),
                index: idx as u32,
            })
            .collect();

        candidates.sort();
        candidates.truncate(k);
        candidates
            .into_iter()
            .map(|c| (c.index as usize, c.dist_sq.sqrt()))
            .collect()
    }
}
