//! `bp-output`: turning accumulated flows into per-segment records and
//! writing them out.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                  |
//! |-----------|---------|------------------------------------------------|
//! | *(none)*  | CSV     | `segment_flows.csv`, `routes.csv`              |
//! | `sqlite`  | SQLite  | `output.db`                                    |
//! | `parquet` | Parquet | `segment_flows.parquet`, `routes.parquet`      |
//!
//! Route files are only created when routes are exported through a
//! [`RouteExportObserver`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use bp_output::{CsvWriter, OutputWriter, ResultMaterializer, RouteExportObserver};
//!
//! let mut obs = RouteExportObserver::new(CsvWriter::new(dir)?, engine.catalog());
//! let flows = engine.run(&mut obs)?.into_flows().unwrap();
//! if let Some(e) = obs.take_error() { return Err(e.into()); }
//! let mut writer = obs.into_writer();
//! let table = ResultMaterializer::new(engine.catalog(), engine.network()).materialize(&flows);
//! writer.write_segment_flows(&table)?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod materialize;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use materialize::ResultMaterializer;
pub use observer::RouteExportObserver;
pub use row::{FlowTable, RouteRow, SegmentFlowRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
