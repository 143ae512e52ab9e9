use thiserror::Error;

use bp_catalog::CatalogError;

#[derive(Debug, Error)]
pub enum DemandError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A fixed-category layer names a category the catalog does not define.
    #[error("destination layer {layer:?} needs category {category:?}, which has no calibration")]
    MissingCategory { layer: String, category: String },

    #[error("invalid origin {key:?}: {reason}")]
    InvalidOrigin { key: String, reason: String },

    #[error("invalid destination in layer {layer:?}: {reason}")]
    InvalidDestination { layer: String, reason: String },

    #[error("origin key {0:?} appears twice")]
    DuplicateOrigin(String),

    #[error("too many {0} (id space exhausted)")]
    TooMany(&'static str),

    #[error("demand parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DemandResult<T> = Result<T, DemandError>;
