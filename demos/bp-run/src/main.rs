//! bp-run: assign bicycle OD flows onto a network from a JSON run file.
//!
//! ```text
//! RUST_LOG=info bp-run run.json --format csv --export-routes
//! ```

mod run_file;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bp_catalog::{load_catalog_csv, Catalog};
use bp_demand::{
    load_indicators_csv, load_origins_csv, load_pois_csv, load_sized_csv, load_socio_csv,
    DestinationSet, DestinationSource, Origin,
};
use bp_flow::{FlowEngineBuilder, FlowObserver, FlowOutcome, LogObserver, Route, RunSummary};
use bp_output::{CsvWriter, OutputWriter, ResultMaterializer, RouteExportObserver};
use bp_spatial::load_network_csv;

use run_file::{Format, RunFile};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(version, about = "Bicycle origin-destination flow assignment")]
struct Cli {
    /// JSON run file.
    run_file: PathBuf,

    /// Override the output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override the output format.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Write one record per origin-destination route.
    #[arg(long)]
    export_routes: bool,

    /// Worker threads (needs the `parallel` feature).
    #[arg(long)]
    threads: Option<usize>,

    /// Progress log interval in percent of origins.
    #[arg(long, default_value_t = 10)]
    progress_step: usize,
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Progress logging plus optional route export.
struct RunObserver {
    log:    LogObserver,
    export: Option<RouteExportObserver<Box<dyn OutputWriter>>>,
}

impl FlowObserver for RunObserver {
    fn on_run_start(&mut self, origins: usize) {
        self.log.on_run_start(origins);
    }

    fn on_routes(&mut self, origin: &Origin, routes: &[Route]) {
        if let Some(e) = self.export.as_mut() {
            e.on_routes(origin, routes);
        }
    }

    fn on_origin_end(&mut self, origin: &Origin, done: usize, total: usize) {
        self.log.on_origin_end(origin, done, total);
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.log.on_run_end(summary);
        if let Some(e) = self.export.as_mut() {
            e.on_run_end(summary);
        }
    }
}

fn open_writer(format: Format, dir: &std::path::Path) -> Result<Box<dyn OutputWriter>> {
    Ok(match format {
        Format::Csv => Box::new(CsvWriter::new(dir)?),
        #[cfg(feature = "sqlite")]
        Format::Sqlite => Box::new(bp_output::SqliteWriter::new(dir)?),
        #[cfg(feature = "parquet")]
        Format::Parquet => Box::new(bp_output::ParquetWriter::new(dir)?),
        #[allow(unreachable_patterns)]
        other => bail!("output format {other:?} needs the matching cargo feature"),
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let started = Instant::now();

    let mut run = RunFile::load(&cli.run_file)?;
    if let Some(dir) = cli.output_dir {
        run.output.dir = dir;
    }
    if let Some(format) = cli.format {
        run.output.format = format;
    }
    if cli.threads.is_some() {
        run.config.num_threads = cli.threads;
    }
    let export_routes = run.output.export_routes || cli.export_routes;

    // 1. Calibration.
    let catalog = match &run.calibration {
        Some(path) => load_catalog_csv(path, run.class_map.as_deref())
            .with_context(|| format!("loading calibration {}", path.display()))?,
        None => Catalog::default_calibration(),
    };
    log::info!("{} categories, {} mapped classes", catalog.len(), catalog.class_count());

    // 2. Network.
    let layer = load_network_csv(&run.network)
        .with_context(|| format!("loading network {}", run.network.display()))?;
    let infrastructure = layer.infrastructure;

    // 3. Origins and optional socio weighting.
    let mut origins = load_origins_csv(&run.origins)
        .with_context(|| format!("loading origins {}", run.origins.display()))?;
    let socio = match (&run.socio, &run.indicators) {
        (Some(path), _) => Some(load_socio_csv(path)?),
        (None, Some(path)) => Some(load_indicators_csv(path)?),
        (None, None) => None,
    };
    if let Some(table) = socio {
        origins.apply_socio(&table)?;
    }

    // 4. Destinations.
    let pois = load_pois_csv(&run.pois)
        .with_context(|| format!("loading POIs {}", run.pois.display()))?;
    let mut sources = vec![DestinationSource::pois(pois)];
    if let Some(path) = &run.workplaces {
        sources.push(DestinationSource::workplaces(load_sized_csv(path)?));
    }
    if let Some(path) = &run.schools {
        sources.push(DestinationSource::schools(load_sized_csv(path)?));
    }
    let destinations = DestinationSet::build(&catalog, sources)?;

    // 5. Engine.
    let engine = FlowEngineBuilder::new(catalog, layer.network, origins, destinations)
        .config(run.config)
        .build()?;

    let export = if export_routes {
        Some(RouteExportObserver::new(open_writer(run.output.format, &run.output.dir)?, engine.catalog()))
    } else {
        None
    };
    let mut observer = RunObserver { log: LogObserver::new(cli.progress_step), export };

    let flows = match engine.run(&mut observer)? {
        FlowOutcome::Complete { flows, .. } => flows,
        FlowOutcome::Cancelled { origins_done } => {
            bail!("run cancelled after {origins_done} origins; nothing written")
        }
    };

    // 6. Output.
    let mut writer = match observer.export {
        Some(mut e) => {
            if let Some(err) = e.take_error() {
                return Err(err).context("writing routes");
            }
            e.into_writer()
        }
        None => open_writer(run.output.format, &run.output.dir)?,
    };
    let table = ResultMaterializer::new(engine.catalog(), engine.network())
        .with_infrastructure(&infrastructure)
        .materialize(&flows);
    writer.write_segment_flows(&table)?;
    writer.finish()?;

    log::info!(
        "wrote {} segments to {} in {:.1}s",
        table.rows.len(),
        run.output.dir.display(),
        started.elapsed().as_secs_f64(),
    );
    Ok(())
}
