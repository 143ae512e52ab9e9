//! Spatial-subsystem error type.

use thiserror::Error;

use bp_core::{NodeId, SegmentId};

/// Errors produced by `bp-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("network has no routable vertices")]
    EmptyNetwork,

    #[error("invalid edge on {segment}: {reason}")]
    InvalidEdge { segment: SegmentId, reason: String },

    /// Only single-part line geometries can be routed.
    #[error("unsupported geometry for {segment}: {kind}")]
    UnsupportedGeometry { segment: SegmentId, kind: String },

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
