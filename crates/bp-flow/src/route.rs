//! Per-origin route construction.
//!
//! One shortest-path tree is computed per origin and reused for every
//! candidate destination of that origin.  A candidate becomes a [`Route`]
//! only if it is admissible (mapped category, positive size), snapped, and
//! reachable within the network cutoff.

use std::collections::HashSet;

use bp_catalog::Catalog;
use bp_core::{CategoryId, DestinationId, FlowConfig, Mode, NodeId, OriginId, SegmentId};
use bp_demand::{DestinationSet, Origin};
use bp_spatial::{CandidateIndex, PathTreeAlgorithm, SegmentNetwork};

use crate::{CancelToken, FlowResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// One origin → destination trip option.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub origin:      OriginId,
    pub destination: DestinationId,
    pub category:    CategoryId,
    /// Network distance in metres.
    pub distance_m:  f64,
    /// Gravity weight `size × exp(β × km)`.
    pub decay:       f64,
    pub bike_prob:   f64,
    pub ebike_prob:  f64,
    /// Physical segments from origin to destination, each listed once.
    pub segments:    Vec<SegmentId>,
}

impl Route {
    #[inline]
    pub fn probability(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Bike  => self.bike_prob,
            Mode::Ebike => self.ebike_prob,
        }
    }
}

/// Drop repeated segment ids, keeping the first occurrence of each.
///
/// A segment digitised with several vertices becomes several graph edges;
/// a path along it lists the segment once per edge.
pub fn dedup_segments(segments: Vec<SegmentId>) -> Vec<SegmentId> {
    if segments.len() < 2 {
        return segments;
    }
    let mut seen = HashSet::with_capacity(segments.len());
    segments.into_iter().filter(|s| seen.insert(*s)).collect()
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

/// Everything needed to turn an origin into routes.  Immutable and shared by
/// every worker.
pub struct RouteBuilder<'a, A: PathTreeAlgorithm + ?Sized> {
    pub network:      &'a SegmentNetwork,
    pub catalog:      &'a Catalog,
    pub destinations: &'a DestinationSet,
    /// Snapped vertex per destination, indexed by `DestinationId`.
    pub dest_nodes:   &'a [Option<NodeId>],
    pub index:        &'a dyn CandidateIndex,
    pub algorithm:    &'a A,
    pub config:       &'a FlowConfig,
}

impl<A: PathTreeAlgorithm + ?Sized> RouteBuilder<'_, A> {
    /// Routes from `origin`, whose snapped vertex is `root`.
    ///
    /// Returns `Ok(None)` if `cancel` fired part-way.
    pub fn routes_for(
        &self,
        origin: &Origin,
        root:   NodeId,
        cancel: &CancelToken,
    ) -> FlowResult<Option<Vec<Route>>> {
        let cutoff = self.config.network_cutoff();
        let scale  = self.config.mode_scale_m();
        let tree = self.algorithm.tree(self.network, root, cutoff)?;

        let candidates = self.index.nearest(
            origin.pos,
            self.config.max_candidates,
            self.config.search_radius(),
        );

        let mut routes = Vec::new();
        let mut skipped = 0usize;

        for dest_id in candidates {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let dest = self.destinations.get(dest_id);
            let Some(category) = dest.category else {
                skipped += 1;
                continue;
            };
            if dest.size <= 0.0 {
                skipped += 1;
                continue;
            }
            let Some(node) = self.dest_nodes.get(dest_id.index()).copied().flatten() else {
                skipped += 1;
                continue;
            };
            // Same vertex as the origin: no path, so no share of the trips.
            if node == root {
                skipped += 1;
                continue;
            }
            let Some(distance_m) = tree.cost(node) else {
                log::trace!("{dest_id} unreachable from origin {:?} within cutoff", origin.key);
                skipped += 1;
                continue;
            };
            if cutoff.is_some_and(|c| distance_m > c) {
                skipped += 1;
                continue;
            }
            let Some(path) = tree.segments_on_path_to(self.network, node) else {
                skipped += 1;
                continue;
            };

            routes.push(Route {
                origin:      origin.id,
                destination: dest_id,
                category,
                distance_m,
                decay:       self.catalog.decay_weight(category, dest.size, distance_m),
                bike_prob:   self.catalog.mode_probability(category, Mode::Bike, distance_m, scale),
                ebike_prob:  self.catalog.mode_probability(category, Mode::Ebike, distance_m, scale),
                segments:    dedup_segments(path),
            });
        }

        log::debug!(
            "origin {:?}: {} routes, {skipped} candidates excluded, {} vertices reached",
            origin.key,
            routes.len(),
            tree.reached_count(),
        );
        Ok(Some(routes))
    }
}
