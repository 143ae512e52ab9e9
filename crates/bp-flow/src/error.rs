use thiserror::Error;

use bp_catalog::CatalogError;
use bp_core::BpError;
use bp_demand::DemandError;
use bp_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("flow configuration error: {0}")]
    Config(#[from] BpError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Demand(#[from] DemandError),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),
}

pub type FlowResult<T> = Result<T, FlowError>;
