//! The `FlowEngine` and its origin loop.

use bp_catalog::Catalog;
use bp_core::{FlowConfig, NodeId};
use bp_demand::{DestinationSet, Origin, OriginSet};
use bp_spatial::{DestinationIndex, Dijkstra, PathTreeAlgorithm, SegmentNetwork};

use crate::aggregate::aggregate_routes;
use crate::{CancelToken, FlowAccumulator, FlowObserver, FlowResult, Route, RouteBuilder};

/// Origins handed to the thread pool at once.  Between batches results are
/// delivered to the observer, bounding the number of routes held in memory.
#[cfg(feature = "parallel")]
const PARALLEL_BATCH: usize = 256;

// ── Outcome types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub origins:           usize,
    /// Origins that could not be placed on the network and produced nothing.
    pub unsnapped_origins: usize,
    pub routes:            usize,
    /// Touched `(category, mode, segment)` cells in the final accumulator.
    pub flow_cells:        usize,
}

#[derive(Debug)]
pub enum FlowOutcome {
    Complete { flows: FlowAccumulator, summary: RunSummary },
    /// The cancel token fired.  Nothing accumulated is returned.
    Cancelled { origins_done: usize },
}

impl FlowOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, FlowOutcome::Complete { .. })
    }

    pub fn into_flows(self) -> Option<FlowAccumulator> {
        match self {
            FlowOutcome::Complete { flows, .. } => Some(flows),
            FlowOutcome::Cancelled { .. } => None,
        }
    }
}

/// Result of one origin, produced (possibly on a worker thread) before
/// delivery to the observer and the global accumulator.
struct OriginWork {
    routes:  Vec<Route>,
    partial: FlowAccumulator,
}

// ── FlowEngine ────────────────────────────────────────────────────────────────

/// Owns every input of a run.  Create via [`FlowEngineBuilder`][crate::FlowEngineBuilder].
///
/// [`run`](Self::run) takes `&self`, so an engine can be run repeatedly
/// (e.g. with different observers) and always yields the same flows.
pub struct FlowEngine<A: PathTreeAlgorithm = Dijkstra> {
    pub(crate) config:       FlowConfig,
    pub(crate) catalog:      Catalog,
    pub(crate) network:      SegmentNetwork,
    pub(crate) origins:      OriginSet,
    pub(crate) destinations: DestinationSet,
    pub(crate) index:        DestinationIndex,
    /// Snapped vertex per origin, indexed by `OriginId`.
    pub(crate) origin_nodes: Vec<Option<NodeId>>,
    /// Snapped vertex per destination, indexed by `DestinationId`.
    pub(crate) dest_nodes:   Vec<Option<NodeId>>,
    pub(crate) algorithm:    A,
    pub(crate) cancel:       CancelToken,
    #[cfg(feature = "parallel")]
    pub(crate) pool:         Option<rayon::ThreadPool>,
}

impl<A: PathTreeAlgorithm> FlowEngine<A> {
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn network(&self) -> &SegmentNetwork {
        &self.network
    }

    pub fn origins(&self) -> &OriginSet {
        &self.origins
    }

    pub fn destinations(&self) -> &DestinationSet {
        &self.destinations
    }

    /// A handle that cancels this engine's runs from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn route_builder(&self) -> RouteBuilder<'_, A> {
        RouteBuilder {
            network:      &self.network,
            catalog:      &self.catalog,
            destinations: &self.destinations,
            dest_nodes:   &self.dest_nodes,
            index:        &self.index,
            algorithm:    &self.algorithm,
            config:       &self.config,
        }
    }

    /// Routes and partial flows for one origin; `None` if cancelled.
    fn process_origin(&self, builder: &RouteBuilder<'_, A>, origin: &Origin) -> FlowResult<Option<OriginWork>> {
        let mut partial = FlowAccumulator::new(self.catalog.len());
        let Some(root) = self.origin_nodes[origin.id.index()] else {
            return Ok(Some(OriginWork { routes: Vec::new(), partial }));
        };
        let Some(routes) = builder.routes_for(origin, root, &self.cancel)? else {
            return Ok(None);
        };
        aggregate_routes(&self.catalog, &self.origins, &self.config.mode_split, &routes, &mut partial);
        Ok(Some(OriginWork { routes, partial }))
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Assign flows from every origin.
    ///
    /// Returns [`FlowOutcome::Cancelled`] if the cancel token fires before
    /// the last origin completes.  Errors are reserved for faults in the
    /// path-tree algorithm; excluded destinations are never errors.
    pub fn run<O: FlowObserver>(&self, observer: &mut O) -> FlowResult<FlowOutcome> {
        let total = self.origins.len();
        let mut flows = FlowAccumulator::new(self.catalog.len());
        let mut summary = RunSummary {
            origins: total,
            unsnapped_origins: self.origin_nodes.iter().filter(|n| n.is_none()).count(),
            ..RunSummary::default()
        };

        observer.on_run_start(total);
        let builder = self.route_builder();

        #[cfg(not(feature = "parallel"))]
        {
            for (i, origin) in self.origins.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    return Ok(FlowOutcome::Cancelled { origins_done: i });
                }
                observer.on_origin_start(origin);
                let Some(work) = self.process_origin(&builder, origin)? else {
                    return Ok(FlowOutcome::Cancelled { origins_done: i });
                };
                deliver(observer, origin, work, &mut flows, &mut summary, i + 1, total);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let mut done = 0usize;
            for batch in self.origins.as_slice().chunks(PARALLEL_BATCH) {
                if self.cancel.is_cancelled() {
                    return Ok(FlowOutcome::Cancelled { origins_done: done });
                }
                let compute = || {
                    batch
                        .par_iter()
                        .map(|origin| self.process_origin(&builder, origin))
                        .collect::<Vec<_>>()
                };
                let results = match &self.pool {
                    Some(pool) => pool.install(compute),
                    None => compute(),
                };

                // Deliver sequentially in origin order so observers and the
                // merged totals do not depend on scheduling.
                for (origin, result) in batch.iter().zip(results) {
                    if self.cancel.is_cancelled() {
                        return Ok(FlowOutcome::Cancelled { origins_done: done });
                    }
                    let Some(work) = result? else {
                        return Ok(FlowOutcome::Cancelled { origins_done: done });
                    };
                    observer.on_origin_start(origin);
                    done += 1;
                    deliver(observer, origin, work, &mut flows, &mut summary, done, total);
                }
            }
        }

        summary.flow_cells = flows.cell_count();
        observer.on_run_end(&summary);
        Ok(FlowOutcome::Complete { flows, summary })
    }
}

fn deliver<O: FlowObserver>(
    observer: &mut O,
    origin:   &Origin,
    work:     OriginWork,
    flows:    &mut FlowAccumulator,
    summary:  &mut RunSummary,
    done:     usize,
    total:    usize,
) {
    observer.on_routes(origin, &work.routes);
    summary.routes += work.routes.len();
    flows.merge(work.partial);
    observer.on_origin_end(origin, done, total);
}
