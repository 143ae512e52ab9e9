//! The `OutputWriter` trait implemented by all backend writers.

use crate::{FlowTable, OutputResult, RouteRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
pub trait OutputWriter {
    /// Write the final per-segment table.  Called once per run.
    fn write_segment_flows(&mut self, table: &FlowTable) -> OutputResult<()>;

    /// Append a batch of exported routes.
    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Calling it more than once is harmless.
    fn finish(&mut self) -> OutputResult<()>;
}

pub(crate) fn check_shape(table: &FlowTable) -> OutputResult<()> {
    let expected = table.value_columns.len();
    match table.rows.iter().find(|r| r.values.len() != expected) {
        Some(r) => Err(crate::OutputError::RowShape {
            segment: r.segment_id,
            expected,
            got: r.values.len(),
        }),
        None => Ok(()),
    }
}

impl<W: OutputWriter + ?Sized> OutputWriter for Box<W> {
    fn write_segment_flows(&mut self, table: &FlowTable) -> OutputResult<()> {
        (**self).write_segment_flows(table)
    }

    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()> {
        (**self).write_routes(rows)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
