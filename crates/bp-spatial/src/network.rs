//! Segment network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_cost_m`, `edge_segment`)
//! are sorted by source node and indexed by `EdgeId`.  `edge_cost_m` drives
//! the shortest-path search; `edge_segment` is never read by the search and
//! only serves to recover segment identity afterwards.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over routable vertices maps an arbitrary point to
//! the nearest vertex.  Used to snap origin and destination points onto the
//! network.

use std::collections::{HashMap, HashSet};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use bp_core::{EdgeId, NodeId, Point, SegmentId};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Which way a segment may be traversed, relative to its digitised order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Both,
    Forward,
    Backward,
}

impl std::str::FromStr for Direction {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "both" | "b" => Ok(Direction::Both),
            "forward" | "f" | "oneway" => Ok(Direction::Forward),
            "backward" | "r" | "reverse" => Ok(Direction::Backward),
            other => Err(SpatialError::Parse(format!(
                "invalid direction {other:?}: expected \"both\", \"forward\" or \"backward\""
            ))),
        }
    }
}

// ── SegmentNetwork ────────────────────────────────────────────────────────────

/// Directed routing graph in CSR format plus a spatial index for snapping.
///
/// All array fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`SegmentNetworkBuilder`].
pub struct SegmentNetwork {
    /// Position of each vertex.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source vertex of each edge.  Required for path reconstruction.
    pub edge_from: Vec<NodeId>,

    /// Target vertex of each edge.
    pub edge_to: Vec<NodeId>,

    /// Traversal cost in metres.
    pub edge_cost_m: Vec<f64>,

    /// Input segment each edge was cut from.
    pub edge_segment: Vec<SegmentId>,

    /// Distinct segment ids in the order they were first added.
    segments: Vec<SegmentId>,

    spatial_idx: RTree<NodeEntry>,
}

impl SegmentNetwork {
    /// An empty network.  Snapping against it always yields `None`.
    pub fn empty() -> Self {
        SegmentNetworkBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_to.is_empty()
    }

    /// Distinct input segments, in input order.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The input segment `edge` belongs to.
    #[inline]
    pub fn segment_of(&self, edge: EdgeId) -> SegmentId {
        self.edge_segment[edge.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest routable vertex to `pos`, or `None` for an empty network.
    pub fn snap(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&pos.as_array())
            .map(|e| e.id)
    }

    /// Snap every point, preserving input order.
    pub fn snap_all(&self, points: &[Point]) -> Vec<Option<NodeId>> {
        points.iter().map(|&p| self.snap(p)).collect()
    }
}

// ── SegmentNetworkBuilder ─────────────────────────────────────────────────────

/// Construct a [`SegmentNetwork`] incrementally, then call [`build`](Self::build).
///
/// Vertices added through [`node_at`](Self::node_at) (and therefore through
/// [`add_polyline`](Self::add_polyline)) are merged on exact coordinate
/// equality, so segments that share an endpoint become connected.
///
/// # Example
///
/// ```
/// use bp_core::{Point, SegmentId};
/// use bp_spatial::{Direction, SegmentNetworkBuilder};
///
/// let mut b = SegmentNetworkBuilder::new();
/// b.add_polyline(
///     SegmentId(1),
///     &[Point::new(0.0, 0.0), Point::new(500.0, 0.0), Point::new(1_000.0, 0.0)],
///     Direction::Both,
/// ).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 3);
/// assert_eq!(net.edge_count(), 4); // two pieces, both directions
/// assert_eq!(net.segments(), &[SegmentId(1)]);
/// ```
pub struct SegmentNetworkBuilder {
    nodes:        Vec<Point>,
    node_lookup:  HashMap<(u64, u64), NodeId>,
    raw_edges:    Vec<RawEdge>,
    segments:     Vec<SegmentId>,
    seen_segment: HashSet<SegmentId>,
}

struct RawEdge {
    from:    NodeId,
    to:      NodeId,
    cost_m:  f64,
    segment: SegmentId,
}

impl SegmentNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:        Vec::new(),
            node_lookup:  HashMap::new(),
            raw_edges:    Vec::new(),
            segments:     Vec::new(),
            seen_segment: HashSet::new(),
        }
    }

    /// Pre-allocate for the expected number of vertices and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:        Vec::with_capacity(nodes),
            node_lookup:  HashMap::with_capacity(nodes),
            raw_edges:    Vec::with_capacity(edges),
            segments:     Vec::new(),
            seen_segment: HashSet::new(),
        }
    }

    /// Add a vertex unconditionally and return its `NodeId`.
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Return the vertex at exactly `pos`, creating it if needed.
    pub fn node_at(&mut self, pos: Point) -> NodeId {
        // -0.0 and 0.0 must merge.
        let key = ((pos.x + 0.0).to_bits(), (pos.y + 0.0).to_bits());
        if let Some(&id) = self.node_lookup.get(&key) {
            return id;
        }
        let id = self.add_node(pos);
        self.node_lookup.insert(key, id);
        id
    }

    /// Add a **directed** edge from `from` to `to` belonging to `segment`.
    pub fn add_directed_edge(
        &mut self,
        from:    NodeId,
        to:      NodeId,
        cost_m:  f64,
        segment: SegmentId,
    ) -> SpatialResult<()> {
        if !(cost_m.is_finite() && cost_m >= 0.0) {
            return Err(SpatialError::InvalidEdge {
                segment,
                reason: format!("cost must be finite and non-negative, got {cost_m}"),
            });
        }
        for node in [from, to] {
            if node.index() >= self.nodes.len() {
                return Err(SpatialError::NodeNotFound(node));
            }
        }
        self.register_segment(segment);
        self.raw_edges.push(RawEdge { from, to, cost_m, segment });
        Ok(())
    }

    /// Add the edge(s) for one piece of `segment` between `a` and `b`,
    /// honouring `direction`.
    pub fn add_edge(
        &mut self,
        a:         NodeId,
        b:         NodeId,
        cost_m:    f64,
        segment:   SegmentId,
        direction: Direction,
    ) -> SpatialResult<()> {
        match direction {
            Direction::Both => {
                self.add_directed_edge(a, b, cost_m, segment)?;
                self.add_directed_edge(b, a, cost_m, segment)
            }
            Direction::Forward  => self.add_directed_edge(a, b, cost_m, segment),
            Direction::Backward => self.add_directed_edge(b, a, cost_m, segment),
        }
    }

    /// Split a line geometry into one edge per consecutive vertex pair, all
    /// carrying `segment`.  Cost is the Euclidean length of each piece.
    ///
    /// Repeated consecutive vertices are skipped.  A line with fewer than two
    /// distinct vertices is rejected.
    pub fn add_polyline(
        &mut self,
        segment:   SegmentId,
        points:    &[Point],
        direction: Direction,
    ) -> SpatialResult<()> {
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(SpatialError::InvalidEdge {
                segment,
                reason: format!("non-finite vertex {bad}"),
            });
        }
        let mut pieces = 0usize;
        for pair in points.windows(2) {
            let (p, q) = (pair[0], pair[1]);
            if p == q {
                continue;
            }
            let a = self.node_at(p);
            let b = self.node_at(q);
            self.add_edge(a, b, p.distance_m(q), segment, direction)?;
            pieces += 1;
        }
        if pieces == 0 {
            return Err(SpatialError::InvalidEdge {
                segment,
                reason: "line has fewer than two distinct vertices".into(),
            });
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    fn register_segment(&mut self, segment: SegmentId) {
        if self.seen_segment.insert(segment) {
            self.segments.push(segment);
        }
    }

    /// Consume the builder and produce a [`SegmentNetwork`].
    ///
    /// Only vertices with at least one incident edge enter the snapping
    /// index, so points never snap onto an isolated vertex.
    pub fn build(self) -> SegmentNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order within a source vertex, which
        // keeps shortest-path tie-breaking reproducible.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:    Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:      Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_cost_m:  Vec<f64>       = raw.iter().map(|e| e.cost_m).collect();
        let edge_segment: Vec<SegmentId> = raw.iter().map(|e| e.segment).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        let mut routable = vec![false; node_count];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
            routable[e.from.index()] = true;
            routable[e.to.index()] = true;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| routable[*i])
            .map(|(i, pos)| NodeEntry { point: pos.as_array(), id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        SegmentNetwork {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_cost_m,
            edge_segment,
            segments: self.segments,
            spatial_idx,
        }
    }
}

impl Default for SegmentNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
