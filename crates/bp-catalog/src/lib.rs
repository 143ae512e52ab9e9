//! `bp-catalog`: trip-purpose categories and the demand model's pure math.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`category`]    | `CategoryParams`, `ModeCoefficients`                        |
//! | [`catalog`]     | `Catalog` (immutable lookups), `CatalogBuilder`             |
//! | [`choice`]      | `mode_probability`, `gravity_weight`                        |
//! | [`calibration`] | Built-in default calibration and POI class map              |
//! | [`loader`]      | CSV loading of calibration tables and class maps            |
//! | [`error`]       | `CatalogError`, `CatalogResult<T>`                          |
//!
//! # Design notes
//!
//! The catalog is built once at start-up and then only ever borrowed.  Every
//! component that needs a coefficient receives `&Catalog`; there is no global
//! table.  Categories are addressed by [`CategoryId`](bp_core::CategoryId)
//! after construction so the hot path never hashes strings.

pub mod calibration;
pub mod catalog;
pub mod category;
pub mod choice;
pub mod error;
pub mod loader;


pub use catalog::{Catalog, CatalogBuilder};
pub use category::{CategoryParams, ModeCoefficients};
pub use choice::{gravity_weight, logistic, mode_probability};
pub use error::{CatalogError, CatalogResult};
pub use loader::{load_catalog_csv, load_catalog_reader};
