//! CSV loaders for demand inputs.
//!
//! # Formats
//!
//! Origins (`weight` optional, raw; normalized on load):
//!
//! ```csv
//! id,x,y,size,weight
//! 0180C1010,674012.5,6580321.0,1532,
//! ```
//!
//! Classified POIs (`size` optional, default 1):
//!
//! ```csv
//! x,y,class
//! 674100.0,6580400.0,supermarket
//! ```
//!
//! Fixed-category layers such as workplaces or schools:
//!
//! ```csv
//! x,y,size
//! 674300.0,6580100.0,240
//! ```
//!
//! Socio-economic tables: a header row, the origin key in the first column
//! and the index value in the second.  Column names are free.  Raw
//! indicator tables carry any number of value columns after the key and are
//! scored into a composite index on load.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use bp_core::Point;

use crate::destination::{PoiRecord, SizedPoint};
use crate::origin::OriginSet;
use crate::socio::SocioTable;
use crate::{DemandError, DemandResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct OriginRecord {
    id:     String,
    x:      f64,
    y:      f64,
    size:   f64,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Deserialize)]
struct PoiRow {
    x:     f64,
    y:     f64,
    class: String,
    #[serde(default)]
    size:  Option<f64>,
}

#[derive(Deserialize)]
struct SizedRow {
    x:    f64,
    y:    f64,
    size: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_origins_csv(path: &Path) -> DemandResult<OriginSet> {
    load_origins_reader(std::fs::File::open(path)?)
}

pub fn load_origins_reader<R: Read>(reader: R) -> DemandResult<OriginSet> {
    let rows: Vec<OriginRecord> = read_rows(reader, "origins")?;
    let set = OriginSet::new(
        rows.into_iter()
            .map(|r| (r.id.trim().to_string(), Point::new(r.x, r.y), r.size, r.weight)),
    )?;
    log::info!("loaded {} origins", set.len());
    Ok(set)
}

pub fn load_pois_csv(path: &Path) -> DemandResult<Vec<PoiRecord>> {
    load_pois_reader(std::fs::File::open(path)?)
}

pub fn load_pois_reader<R: Read>(reader: R) -> DemandResult<Vec<PoiRecord>> {
    let rows: Vec<PoiRow> = read_rows(reader, "poi")?;
    Ok(rows
        .into_iter()
        .map(|r| PoiRecord { pos: Point::new(r.x, r.y), class: r.class, size: r.size })
        .collect())
}

pub fn load_sized_csv(path: &Path) -> DemandResult<Vec<SizedPoint>> {
    load_sized_reader(std::fs::File::open(path)?)
}

pub fn load_sized_reader<R: Read>(reader: R) -> DemandResult<Vec<SizedPoint>> {
    let rows: Vec<SizedRow> = read_rows(reader, "sized layer")?;
    Ok(rows
        .into_iter()
        .map(|r| SizedPoint { pos: Point::new(r.x, r.y), size: r.size })
        .collect())
}

pub fn load_socio_csv(path: &Path) -> DemandResult<SocioTable> {
    load_socio_reader(std::fs::File::open(path)?)
}

pub fn load_socio_reader<R: Read>(reader: R) -> DemandResult<SocioTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut table = SocioTable::new();

    for (row, result) in csv_reader.records().enumerate() {
        let rec = result.map_err(|e| DemandError::Parse(format!("socio row {}: {e}", row + 1)))?;
        let (Some(key), Some(value)) = (rec.get(0), rec.get(1)) else {
            return Err(DemandError::Parse(format!("socio row {}: expected key and index columns", row + 1)));
        };
        let value: f64 = value.trim().parse().map_err(|e| {
            DemandError::Parse(format!("socio row {}: index {value:?}: {e}", row + 1))
        })?;
        table.insert(key.trim(), value);
    }
    log::info!("loaded socio-economic index for {} keys", table.len());
    Ok(table)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_rows<R: Read, T: serde::de::DeserializeOwned>(reader: R, what: &str) -> DemandResult<Vec<T>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<T>()
        .enumerate()
        .map(|(row, r)| r.map_err(|e| DemandError::Parse(format!("{what} row {}: {e}", row + 1))))
        .collect()
}

pub fn load_indicators_csv(path: &Path) -> DemandResult<SocioTable> {
    load_indicators_reader(std::fs::File::open(path)?)
}

/// Raw indicators: a key column followed by one or more numeric columns.
/// Empty cells are missing values.  The table holds the composite index.
pub fn load_indicators_reader<R: Read>(reader: R) -> DemandResult<SocioTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let width = csv_reader
        .headers()
        .map_err(|e| DemandError::Parse(format!("indicators header: {e}")))?
        .len();
    if width < 2 {
        return Err(DemandError::Parse("indicators: expected a key and at least one indicator column".into()));
    }

    let mut keys = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); width - 1];
    for (row, result) in csv_reader.records().enumerate() {
        let rec = result.map_err(|e| DemandError::Parse(format!("indicators row {}: {e}", row + 1)))?;
        keys.push(rec.get(0).unwrap_or_default().trim().to_string());
        for (c, column) in columns.iter_mut().enumerate() {
            let cell = rec.get(c + 1).unwrap_or_default().trim();
            let value = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().map_err(|e| {
                    DemandError::Parse(format!("indicators row {}: column {}: {cell:?}: {e}", row + 1, c + 2))
                })?)
            };
            column.push(value.filter(|v| v.is_finite()));
        }
    }
    log::info!("scored {} indicators for {} keys", columns.len(), keys.len());
    Ok(SocioTable::from_indicators(&keys, &columns))
}
