//! CSV calibration loader.
//!
//! # Calibration file
//!
//! One row per category.  Column order is free; names are fixed.
//!
//! ```csv
//! category,decay,bike_a0,bike_a1,bike_a2,bike_a3,ebike_a0,ebike_a1,ebike_a2,ebike_a3,trip_rate
//! shopping,-0.0833,-0.44,0.045,-3.90,0.57,-0.65,-0.30,-3.36,-0.73,0.18
//! work,-0.0370,0.59,-7.24,0.057,-0.18,0.072,-2.37,-1.72,-0.60,1.52
//! ```
//!
//! # Class map file
//!
//! ```csv
//! class,category
//! supermarket,shopping
//! cafe,services
//! ```
//!
//! Every `category` in the class map must appear in the calibration file.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{Catalog, CatalogBuilder, CatalogError, CatalogResult, CategoryParams, ModeCoefficients};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CalibrationRecord {
    category:  String,
    decay:     f64,
    bike_a0:   f64,
    bike_a1:   f64,
    bike_a2:   f64,
    bike_a3:   f64,
    ebike_a0:  f64,
    ebike_a1:  f64,
    ebike_a2:  f64,
    ebike_a3:  f64,
    trip_rate: f64,
}

#[derive(Deserialize)]
struct ClassRecord {
    class:    String,
    category: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`Catalog`] from a calibration CSV and an optional class map CSV.
pub fn load_catalog_csv(calibration: &Path, class_map: Option<&Path>) -> CatalogResult<Catalog> {
    let cal = std::fs::File::open(calibration)?;
    match class_map {
        Some(path) => {
            let classes = std::fs::File::open(path)?;
            load_catalog_reader(cal, Some(classes))
        }
        None => load_catalog_reader(cal, None::<std::fs::File>),
    }
}

/// Like [`load_catalog_csv`] but accepts any `Read` sources.
pub fn load_catalog_reader<R: Read, C: Read>(
    calibration: R,
    class_map:   Option<C>,
) -> CatalogResult<Catalog> {
    let mut builder = CatalogBuilder::new();

    let mut rdr = csv::Reader::from_reader(calibration);
    for result in rdr.deserialize::<CalibrationRecord>() {
        let r = result.map_err(|e| CatalogError::Parse(e.to_string()))?;
        builder.add_category(CategoryParams::new(
            r.category,
            r.decay,
            ModeCoefficients::new(r.bike_a0, r.bike_a1, r.bike_a2, r.bike_a3),
            ModeCoefficients::new(r.ebike_a0, r.ebike_a1, r.ebike_a2, r.ebike_a3),
            r.trip_rate,
        ))?;
    }

    if let Some(classes) = class_map {
        let mut rdr = csv::Reader::from_reader(classes);
        for result in rdr.deserialize::<ClassRecord>() {
            let r = result.map_err(|e| CatalogError::Parse(e.to_string()))?;
            builder.map_class(&r.class, &r.category)?;
        }
    }

    log::debug!("loaded {} categories from calibration table", builder.category_count());
    Ok(builder.build())
}
