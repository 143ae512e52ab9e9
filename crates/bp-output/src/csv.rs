//! CSV output backend.
//!
//! Creates up to two files in the configured output directory:
//! - `segment_flows.csv`, one row per network segment
//! - `routes.csv`, only when routes are exported
//!
//! Untouched flow cells are written as empty fields.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::row::ROUTE_HEADER;
use crate::writer::{check_shape, OutputWriter};
use crate::{FlowTable, OutputResult, RouteRow};

pub struct CsvWriter {
    dir:      PathBuf,
    flows:    Option<Writer<File>>,
    routes:   Option<Writer<File>>,
    finished: bool,
}

impl CsvWriter {
    /// Write into `dir`, creating it if needed.  Files are opened on first
    /// write.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir:      dir.to_path_buf(),
            flows:    None,
            routes:   None,
            finished: false,
        })
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_segment_flows(&mut self, table: &FlowTable) -> OutputResult<()> {
        check_shape(table)?;
        let mut w = Writer::from_path(self.dir.join("segment_flows.csv"))?;
        w.write_record(table.header())?;

        for row in &table.rows {
            let mut rec = Vec::with_capacity(row.values.len() + 6);
            rec.push(row.segment_id.to_string());
            rec.extend(row.values.iter().map(|v| opt(*v)));
            if table.has_infrastructure {
                rec.push(opt(row.flow_total));
                rec.push(row.lts.map(|l| l.to_string()).unwrap_or_default());
                rec.push(row.rec.map(|c| c.to_string()).unwrap_or_default());
                rec.push(opt(row.ratio));
                rec.push(opt(row.r));
            }
            w.write_record(&rec)?;
        }
        w.flush()?;
        self.flows = Some(w);
        Ok(())
    }

    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()> {
        if self.routes.is_none() {
            let mut w = Writer::from_path(self.dir.join("routes.csv"))?;
            w.write_record(ROUTE_HEADER)?;
            self.routes = Some(w);
        }
        let Some(w) = self.routes.as_mut() else {
            return Ok(());
        };
        for row in rows {
            w.write_record(&[
                row.origin.clone(),
                row.destination.to_string(),
                row.od_key.clone(),
                row.category.clone(),
                row.distance_m.to_string(),
                row.decay.to_string(),
                row.bike_prob.to_string(),
                row.ebike_prob.to_string(),
                row.segment_count.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let Some(w) = self.flows.as_mut() {
            w.flush()?;
        }
        if let Some(w) = self.routes.as_mut() {
            w.flush()?;
        }
        Ok(())
    }
}
