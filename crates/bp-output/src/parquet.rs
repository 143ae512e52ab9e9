//! Parquet output backend (feature `parquet`).
//!
//! Creates up to two files in the configured output directory:
//! - `segment_flows.parquet`
//! - `routes.parquet`, only when routes are exported
//!
//! The flow schema depends on the catalog, so it is built from the
//! [`FlowTable`] at write time.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt32Builder, UInt64Builder, UInt8Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::{check_shape, OutputWriter};
use crate::{FlowTable, OutputResult, RouteRow};

fn flow_schema(table: &FlowTable) -> Arc<Schema> {
    let mut fields = vec![Field::new("segment_id", DataType::UInt64, false)];
    fields.extend(
        table.value_columns.iter().map(|c| Field::new(c.as_str(), DataType::Float64, true)),
    );
    if table.has_infrastructure {
        fields.push(Field::new("flow_total", DataType::Float64, true));
        fields.push(Field::new("lts",        DataType::UInt8,   true));
        fields.push(Field::new("rec",        DataType::UInt8,   true));
        fields.push(Field::new("ratio",      DataType::Float64, true));
        fields.push(Field::new("R",          DataType::Float64, true));
    }
    Arc::new(Schema::new(fields))
}

fn route_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("origin",        DataType::Utf8,    false),
        Field::new("destination",   DataType::UInt32,  false),
        Field::new("od_key",        DataType::Utf8,    false),
        Field::new("category",      DataType::Utf8,    false),
        Field::new("distance_m",    DataType::Float64, false),
        Field::new("decay",         DataType::Float64, false),
        Field::new("bike_prob",     DataType::Float64, false),
        Field::new("ebike_prob",    DataType::Float64, false),
        Field::new("segment_count", DataType::UInt32,  false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes flows and routes to Parquet files.
///
/// `finish()` **must** be called to write the footer of the routes file;
/// the flow file is closed as soon as it is written.
pub struct ParquetWriter {
    dir:          PathBuf,
    routes:       Option<ArrowWriter<File>>,
    route_schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir:          dir.to_path_buf(),
            routes:       None,
            route_schema: route_schema(),
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_segment_flows(&mut self, table: &FlowTable) -> OutputResult<()> {
        check_shape(table)?;
        let schema = flow_schema(table);

        let mut ids = UInt64Builder::with_capacity(table.rows.len());
        let mut values: Vec<Float64Builder> = table
            .value_columns
            .iter()
            .map(|_| Float64Builder::with_capacity(table.rows.len()))
            .collect();
        let mut totals = Float64Builder::new();
        let mut lts    = UInt8Builder::new();
        let mut recs   = UInt8Builder::new();
        let mut ratios = Float64Builder::new();
        let mut rs     = Float64Builder::new();

        for row in &table.rows {
            ids.append_value(row.segment_id);
            for (b, v) in values.iter_mut().zip(&row.values) {
                b.append_option(*v);
            }
            if table.has_infrastructure {
                totals.append_option(row.flow_total);
                lts.append_option(row.lts);
                recs.append_option(row.rec);
                ratios.append_option(row.ratio);
                rs.append_option(row.r);
            }
        }

        let mut columns: Vec<arrow::array::ArrayRef> = vec![Arc::new(ids.finish())];
        columns.extend(values.iter_mut().map(|b| Arc::new(b.finish()) as arrow::array::ArrayRef));
        if table.has_infrastructure {
            columns.push(Arc::new(totals.finish()));
            columns.push(Arc::new(lts.finish()));
            columns.push(Arc::new(recs.finish()));
            columns.push(Arc::new(ratios.finish()));
            columns.push(Arc::new(rs.finish()));
        }

        let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;
        let file = File::create(self.dir.join("segment_flows.parquet"))?;
        let mut writer = ArrowWriter::try_new(file, schema, Some(snappy_props()))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()> {
        if self.routes.is_none() {
            let file = File::create(self.dir.join("routes.parquet"))?;
            self.routes = Some(ArrowWriter::try_new(
                file,
                Arc::clone(&self.route_schema),
                Some(snappy_props()),
            )?);
        }
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.routes.as_mut() else {
            return Ok(());
        };

        let mut origins    = StringBuilder::new();
        let mut dests      = UInt32Builder::new();
        let mut od_keys    = StringBuilder::new();
        let mut categories = StringBuilder::new();
        let mut distances  = Float64Builder::new();
        let mut decays     = Float64Builder::new();
        let mut bikes      = Float64Builder::new();
        let mut ebikes     = Float64Builder::new();
        let mut counts     = UInt32Builder::new();

        for row in rows {
            origins.append_value(&row.origin);
            dests.append_value(row.destination);
            od_keys.append_value(&row.od_key);
            categories.append_value(&row.category);
            distances.append_value(row.distance_m);
            decays.append_value(row.decay);
            bikes.append_value(row.bike_prob);
            ebikes.append_value(row.ebike_prob);
            counts.append_value(row.segment_count);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.route_schema),
            vec![
                Arc::new(origins.finish()),
                Arc::new(dests.finish()),
                Arc::new(od_keys.finish()),
                Arc::new(categories.finish()),
                Arc::new(distances.finish()),
                Arc::new(decays.finish()),
                Arc::new(bikes.finish()),
                Arc::new(ebikes.finish()),
                Arc::new(counts.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.routes.take() {
            w.close()?;
        }
        Ok(())
    }
}
