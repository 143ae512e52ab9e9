//! `RouteExportObserver<W>` bridges `FlowObserver` to an `OutputWriter`.

use bp_catalog::Catalog;
use bp_demand::Origin;
use bp_flow::{FlowObserver, Route, RunSummary};

use crate::row::RouteRow;
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`FlowObserver`] that writes every route to any [`OutputWriter`].
///
/// Errors from the writer are stored internally because `FlowObserver`
/// methods have no return value.  After `engine.run()` returns, check for
/// errors with [`take_error`][Self::take_error].  The writer is not
/// finished here: the segment table still has to be written.
pub struct RouteExportObserver<W: OutputWriter> {
    writer:     W,
    categories: Vec<String>,
    exported:   usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> RouteExportObserver<W> {
    pub fn new(writer: W, catalog: &Catalog) -> Self {
        Self {
            writer,
            categories: catalog.iter().map(|(_, p)| p.name.clone()).collect(),
            exported:   0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `engine.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn exported(&self) -> usize {
        self.exported
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> FlowObserver for RouteExportObserver<W> {
    fn on_routes(&mut self, origin: &Origin, routes: &[Route]) {
        if routes.is_empty() || self.last_error.is_some() {
            return;
        }
        let rows: Vec<RouteRow> = routes
            .iter()
            .map(|r| RouteRow {
                origin:        origin.key.clone(),
                destination:   r.destination.0,
                od_key:        format!("{}-{}", origin.key, r.destination.0),
                category:      self.categories[r.category.index()].clone(),
                distance_m:    r.distance_m,
                decay:         r.decay,
                bike_prob:     r.bike_prob,
                ebike_prob:    r.ebike_prob,
                segment_count: r.segments.len() as u32,
            })
            .collect();
        self.exported += rows.len();
        let result = self.writer.write_routes(&rows);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _summary: &RunSummary) {
        log::info!("exported {} routes", self.exported);
    }
}
