//! `bp-flow`: origin/destination route building and flow assignment.
//!
//! # Run structure
//!
//! ```text
//! for origin in origins:                      (parallel with `parallel`)
//!   ① Tree:       one shortest-path tree from the origin's snapped vertex,
//!                  cut off at the maximum assignment distance.
//!   ② Candidates: destinations within the Euclidean radius, nearest first,
//!                  capped at `max_candidates`.
//!   ③ Routes:     admissible, reachable candidates become `Route`s:
//!                  deduplicated segments, gravity decay, modal probabilities.
//!   ④ Aggregate:  decay sums per category, then shares × trip rate ×
//!                  effective size × modal share × probability, added to
//!                  every segment of the route.
//! merge per-origin partial accumulators in origin order
//! ```
//!
//! Aggregation normalizes per (category, origin), so each origin is a closed
//! unit of work and partial results combine by plain addition.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs steps ①–④ on Rayon's thread pool.                 |
//! | `fx-hash`  | FxHash instead of SipHash for per-segment flow maps.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bp_flow::{FlowEngineBuilder, FlowOutcome, LogObserver};
//!
//! let engine = FlowEngineBuilder::new(catalog, network, origins, destinations)
//!     .config(config)
//!     .build()?;
//! match engine.run(&mut LogObserver::default())? {
//!     FlowOutcome::Complete { flows, .. } => { /* materialize */ }
//!     FlowOutcome::Cancelled { .. } => {}
//! }
//! ```

pub mod accumulate;
pub mod aggregate;
pub mod builder;
pub mod cancel;
pub mod engine;
pub mod error;
pub mod observer;
pub mod route;

#[cfg(test)]
mod tests;

pub use accumulate::FlowAccumulator;
pub use aggregate::{aggregate_routes, decay_sums};
pub use builder::FlowEngineBuilder;
pub use cancel::CancelToken;
pub use engine::{FlowEngine, FlowOutcome, RunSummary};
pub use error::{FlowError, FlowResult};
pub use observer::{FlowObserver, LogObserver, NoopObserver};
pub use route::{dedup_segments, Route, RouteBuilder};
