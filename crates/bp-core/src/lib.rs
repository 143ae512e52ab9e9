//! `bp-core`: foundational types for the bicycle flow planner.
//!
//! This crate is a dependency of every other `bp-*` crate.  It intentionally
//! has no `bp-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `SegmentId`, `OriginId`, `DestinationId`, `CategoryId` |
//! | [`geo`]         | `Point` (projected, metres), Euclidean distance           |
//! | [`mode`]        | `Mode` enum (bike / e-bike)                                |
//! | [`config`]      | `FlowConfig`, `ModeSplit`                                  |
//! | [`error`]       | `BpError`, `BpResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FlowConfig, ModeSplit, DEFAULT_MAX_CANDIDATES, DEFAULT_MAX_DISTANCE_M};
pub use error::{BpError, BpResult};
pub use geo::Point;
pub use ids::{CategoryId, DestinationId, EdgeId, NodeId, OriginId, SegmentId};
pub use mode::Mode;
