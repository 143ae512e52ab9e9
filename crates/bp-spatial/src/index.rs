//! Euclidean candidate lookup for destinations.
//!
//! The flow engine prefilters destinations by straight-line distance before
//! consulting the shortest-path tree.  [`CandidateIndex`] is the seam; the
//! default [`DestinationIndex`] is an R-tree over destination points.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use bp_core::{DestinationId, Point};

// ── CandidateIndex trait ──────────────────────────────────────────────────────

pub trait CandidateIndex: Send + Sync {
    /// Up to `max_candidates` destinations within `max_distance` metres of
    /// `point`, nearest first.  The radius is inclusive; pass
    /// `f64::INFINITY` to disable it.
    fn nearest(&self, point: Point, max_candidates: usize, max_distance: f64) -> Vec<DestinationId>;
}

// ── DestinationIndex ──────────────────────────────────────────────────────────

#[derive(Clone)]
struct DestinationEntry {
    point: [f64; 2],
    id:    DestinationId,
}

impl RTreeObject for DestinationEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for DestinationEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over destination positions.
pub struct DestinationIndex {
    tree: RTree<DestinationEntry>,
}

impl DestinationIndex {
    /// Bulk-load from `(id, position)` pairs.  Non-finite positions are
    /// skipped.
    pub fn new(items: impl IntoIterator<Item = (DestinationId, Point)>) -> Self {
        let entries: Vec<DestinationEntry> = items
            .into_iter()
            .filter(|(_, p)| p.is_finite())
            .map(|(id, p)| DestinationEntry { point: p.as_array(), id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl CandidateIndex for DestinationIndex {
    fn nearest(&self, point: Point, max_candidates: usize, max_distance: f64) -> Vec<DestinationId> {
        if max_candidates == 0 || max_distance.is_nan() || max_distance < 0.0 {
            return Vec::new();
        }
        let r2 = max_distance * max_distance;
        self.tree
            .nearest_neighbor_iter_with_distance_2(&point.as_array())
            .take_while(|(_, d2)| *d2 <= r2)
            .take(max_candidates)
            .map(|(e, _)| e.id)
            .collect()
    }
}
