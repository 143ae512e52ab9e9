//! `bp-spatial`: routable network, shortest-path trees, and spatial indexing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `SegmentNetwork` (CSR + R-tree + segment payload), builder    |
//! | [`tree`]    | `ShortestPathTree`, `PathTreeAlgorithm` trait, `Dijkstra`     |
//! | [`index`]   | `CandidateIndex` trait, `DestinationIndex` (R-tree)           |
//! | [`lts`]     | Level-of-traffic-stress classification and penalty ratios     |
//! | [`loader`]  | CSV + WKT network loading                                     |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                            |
//!
//! # Edge identity
//!
//! Input segments are split into one graph edge per consecutive vertex pair
//! (and per direction), so graph edges do not map 1:1 onto segments.  Every
//! edge therefore carries two values: the traversal cost the shortest-path
//! search uses, and the [`SegmentId`](bp_core::SegmentId) it was cut from.
//! Path reconstruction reads the second to recover which physical segments
//! a route used.

pub mod error;
pub mod index;
pub mod loader;
pub mod lts;
pub mod network;
pub mod tree;


pub use error::{SpatialError, SpatialResult};
pub use index::{CandidateIndex, DestinationIndex};
pub use loader::{load_network_csv, load_network_reader, NetworkLayer};
pub use lts::{Infrastructure, Lts, RoadAttributes};
pub use network::{Direction, SegmentNetwork, SegmentNetworkBuilder};
pub use tree::{Dijkstra, PathTreeAlgorithm, ShortestPathTree};
