//! Fluent builder for constructing a [`FlowEngine`].

use bp_catalog::Catalog;
use bp_core::FlowConfig;
use bp_demand::{DestinationSet, OriginSet};
use bp_spatial::{DestinationIndex, Dijkstra, PathTreeAlgorithm, SegmentNetwork, SpatialError};

use crate::{CancelToken, FlowEngine, FlowResult};

/// Fluent builder for [`FlowEngine<A>`].
///
/// # Required inputs
///
/// - [`Catalog`] - category calibration and class map
/// - [`SegmentNetwork`] - the routable network
/// - [`OriginSet`] and [`DestinationSet`] - from `bp-demand`
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                       |
/// |---------------------|-------------------------------|
/// | `.config(c)`        | `FlowConfig::default()`       |
/// | `.algorithm(a)`     | [`Dijkstra`]                  |
/// | `.cancel_token(t)`  | A fresh, unfired token        |
///
/// # Example
///
/// ```rust,ignore
/// let engine = FlowEngineBuilder::new(catalog, network, origins, destinations)
///     .config(FlowConfig { max_distance_m: 10_000.0, ..Default::default() })
///     .build()?;
/// ```
pub struct FlowEngineBuilder<A: PathTreeAlgorithm = Dijkstra> {
    config:       FlowConfig,
    catalog:      Catalog,
    network:      SegmentNetwork,
    origins:      OriginSet,
    destinations: DestinationSet,
    algorithm:    A,
    cancel:       CancelToken,
}

impl FlowEngineBuilder<Dijkstra> {
    pub fn new(
        catalog:      Catalog,
        network:      SegmentNetwork,
        origins:      OriginSet,
        destinations: DestinationSet,
    ) -> Self {
        Self {
            config: FlowConfig::default(),
            catalog,
            network,
            origins,
            destinations,
            algorithm: Dijkstra,
            cancel: CancelToken::new(),
        }
    }
}

impl<A: PathTreeAlgorithm> FlowEngineBuilder<A> {
    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the shortest-path algorithm.
    pub fn algorithm<B: PathTreeAlgorithm>(self, algorithm: B) -> FlowEngineBuilder<B> {
        FlowEngineBuilder {
            config:       self.config,
            catalog:      self.catalog,
            network:      self.network,
            origins:      self.origins,
            destinations: self.destinations,
            algorithm,
            cancel:       self.cancel,
        }
    }

    /// Share an existing token, e.g. one wired to a signal handler.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Validate inputs, snap origins and destinations, build the destination
    /// index and return a ready-to-run [`FlowEngine`].
    pub fn build(self) -> FlowResult<FlowEngine<A>> {
        self.config.validate()?;
        if self.network.is_empty() {
            return Err(SpatialError::EmptyNetwork.into());
        }

        // ── Snap inputs onto the network ──────────────────────────────────
        let origin_nodes = self.network.snap_all(&self.origins.positions());
        let unsnapped = origin_nodes.iter().filter(|n| n.is_none()).count();
        if unsnapped > 0 {
            log::warn!("{unsnapped} origins could not be snapped to the network and are skipped");
        }

        let dest_positions: Vec<_> = self.destinations.iter().map(|d| d.pos).collect();
        let dest_nodes = self.network.snap_all(&dest_positions);

        let index = DestinationIndex::new(self.destinations.index_items());

        // ── Worker pool ───────────────────────────────────────────────────
        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| crate::FlowError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        #[cfg(not(feature = "parallel"))]
        {
            if self.config.num_threads.is_some_and(|n| n > 1) {
                log::warn!("num_threads is ignored: built without the `parallel` feature");
            }
        }

        log::info!(
            "flow engine ready: {} origins, {} destinations ({} admissible), {} categories, cutoff {}",
            self.origins.len(),
            self.destinations.len(),
            self.destinations.admissible_count(),
            self.catalog.len(),
            match self.config.network_cutoff() {
                Some(c) => format!("{c} m"),
                None => "disabled".to_string(),
            },
        );

        Ok(FlowEngine {
            config:       self.config,
            catalog:      self.catalog,
            network:      self.network,
            origins:      self.origins,
            destinations: self.destinations,
            index,
            origin_nodes,
            dest_nodes,
            algorithm:    self.algorithm,
            cancel:       self.cancel,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
