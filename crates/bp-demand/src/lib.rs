//! `bp-demand`: who travels and where to.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`origin`]      | `Origin`, `OriginSet` (mean-normalized weights)            |
//! | [`destination`] | `Destination`, `DestinationSource`, `DestinationSet`       |
//! | [`socio`]       | Quantile points scoring, composite index, `SocioTable`     |
//! | [`loader`]      | CSV loaders for origins, POIs, sized layers, socio tables  |
//! | [`error`]       | `DemandError`, `DemandResult<T>`                           |
//!
//! # Effective origin size
//!
//! An origin's trip-producing size is `size × weight`, where `weight` is
//! normalized so that the mean weight over all weighted origins is 1.  An
//! unweighted run therefore produces the same totals as a weighted one on
//! average.

pub mod destination;
pub mod error;
pub mod loader;
pub mod origin;
pub mod socio;

#[cfg(test)]
mod tests;

pub use destination::{Destination, DestinationSet, DestinationSource, PoiRecord, SizedPoint};
pub use error::{DemandError, DemandResult};
pub use loader::{
    load_indicators_csv, load_indicators_reader, load_origins_csv, load_origins_reader, load_pois_csv, load_pois_reader, load_sized_csv,
    load_sized_reader, load_socio_csv, load_socio_reader,
};
pub use origin::{Origin, OriginSet};
pub use socio::{composite_index, points, quantile, SocioTable};
