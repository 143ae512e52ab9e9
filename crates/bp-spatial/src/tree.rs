//! Shortest-path trees and the pluggable algorithm that builds them.
//!
//! # Pluggability
//!
//! The flow engine asks for trees through the [`PathTreeAlgorithm`] trait, so
//! applications can swap in bidirectional search, contraction hierarchies or
//! a different cost model without touching the engine.  The default
//! [`Dijkstra`] is sufficient for regional networks.
//!
//! # One tree, many paths
//!
//! A tree is computed once per origin and then queried for every candidate
//! destination.  Path reconstruction walks predecessor edges and costs
//! O(path length); the tree itself costs O(E log V).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bp_core::{EdgeId, NodeId, SegmentId};

use crate::network::SegmentNetwork;
use crate::{SpatialError, SpatialResult};

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// Minimum-cost paths from one root vertex, with predecessor links.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    root:      NodeId,
    /// Best cost per vertex; `f64::INFINITY` for unreached vertices.
    cost:      Vec<f64>,
    /// Edge that reached each vertex; `EdgeId::INVALID` for the root and for
    /// unreached vertices.
    prev_edge: Vec<EdgeId>,
}

impl ShortestPathTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Cost from the root to `node`, or `None` if unreachable (or beyond the
    /// cutoff the tree was built with).
    #[inline]
    pub fn cost(&self, node: NodeId) -> Option<f64> {
        self.cost
            .get(node.index())
            .copied()
            .filter(|c| c.is_finite())
    }

    #[inline]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.cost(node).is_some()
    }

    /// Number of vertices reached, the root included.
    pub fn reached_count(&self) -> usize {
        self.cost.iter().filter(|c| c.is_finite()).count()
    }

    /// Graph edges from the root to `node`, in travel order.
    ///
    /// `Some(vec![])` for the root itself, `None` if unreachable.  `network`
    /// must be the one the tree was built on.
    pub fn edges_on_path_to(&self, network: &SegmentNetwork, node: NodeId) -> Option<Vec<EdgeId>> {
        if !self.is_reachable(node) {
            return None;
        }
        let mut edges = Vec::new();
        let mut cur = node;
        while cur != self.root {
            let e = self.prev_edge[cur.index()];
            if e == EdgeId::INVALID {
                // Reached but with no predecessor can only be the root.
                return None;
            }
            edges.push(e);
            cur = network.edge_from[e.index()];
        }
        edges.reverse();
        Some(edges)
    }

    /// Segment ids of every edge on the path to `node`, in travel order.
    ///
    /// One entry per graph edge: a segment split into several edges appears
    /// several times.  Callers that need each physical segment once must
    /// deduplicate.
    pub fn segments_on_path_to(&self, network: &SegmentNetwork, node: NodeId) -> Option<Vec<SegmentId>> {
        self.edges_on_path_to(network, node)
            .map(|edges| edges.into_iter().map(|e| network.segment_of(e)).collect())
    }
}

// ── PathTreeAlgorithm trait ───────────────────────────────────────────────────

/// Pluggable single-source shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// worker threads when origins are processed in parallel.
pub trait PathTreeAlgorithm: Send + Sync {
    /// Compute the tree rooted at `root`.
    ///
    /// With `cutoff = Some(c)`, vertices whose cost exceeds `c` are left
    /// unreached; vertices at exactly `c` are reached.
    fn tree(
        &self,
        network: &SegmentNetwork,
        root:    NodeId,
        cutoff:  Option<f64>,
    ) -> SpatialResult<ShortestPathTree>;
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR graph using `edge_cost_m`.
pub struct Dijkstra;

impl PathTreeAlgorithm for Dijkstra {
    fn tree(
        &self,
        network: &SegmentNetwork,
        root:    NodeId,
        cutoff:  Option<f64>,
    ) -> SpatialResult<ShortestPathTree> {
        dijkstra(network, root, cutoff)
    }
}

/// Heap entry.  Ordered so `BinaryHeap` pops the lowest cost first; the
/// vertex id breaks ties deterministically.
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(
    network: &SegmentNetwork,
    root:    NodeId,
    cutoff:  Option<f64>,
) -> SpatialResult<ShortestPathTree> {
    let n = network.node_count();
    if root.index() >= n {
        return Err(SpatialError::NodeNotFound(root));
    }
    let limit = cutoff.unwrap_or(f64::INFINITY);

    let mut cost      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    cost[root.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: root });

    while let Some(State { cost: c, node }) = heap.pop() {
        // Skip stale heap entries.
        if c > cost[node.index()] {
            continue;
        }
        for edge in network.out_edges(node) {
            let next = network.edge_to[edge.index()];
            let next_cost = c + network.edge_cost_m[edge.index()];
            if next_cost > limit {
                continue;
            }
            if next_cost < cost[next.index()] {
                cost[next.index()] = next_cost;
                prev_edge[next.index()] = edge;
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }

    Ok(ShortestPathTree {
        root,
        cost,
        prev_edge,
    })
}
