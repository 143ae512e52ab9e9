//! Planner-wide error type.
//!
//! Sub-crates define their own error enums and wrap `BpError` as one variant
//! where configuration problems need to cross crate boundaries.

use thiserror::Error;

/// The common base error for `bp-core` and the crates built on it.
#[derive(Debug, Error)]
pub enum BpError {
    /// Invalid run configuration.  Always fatal, raised before any work.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `bp-*` crates.
pub type BpResult<T> = Result<T, BpError>;
