//! JSON run file.
//!
//! ```json
//! {
//!   "network":    "network.csv",
//!   "origins":    "origins.csv",
//!   "pois":       "pois.csv",
//!   "workplaces": "workplaces.csv",
//!   "indicators": "deso_indicators.csv",
//!   "output":     { "dir": "out", "format": "csv", "export_routes": true },
//!   "config":     { "max_distance_m": 10000, "mode_split": { "bike": 0.8, "ebike": 0.2 } }
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the run file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bp_core::FlowConfig;
use serde::Deserialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Csv,
    Sqlite,
    Parquet,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub dir:           PathBuf,
    #[serde(default)]
    pub format:        Format,
    #[serde(default)]
    pub export_routes: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    pub network:     PathBuf,
    pub origins:     PathBuf,
    /// Classified POIs; always required.
    pub pois:        PathBuf,
    pub workplaces:  Option<PathBuf>,
    pub schools:     Option<PathBuf>,
    /// Precomputed socio-economic index, `key,index`.
    pub socio:       Option<PathBuf>,
    /// Raw indicator table, scored into a composite index.  Ignored when
    /// `socio` is given.
    pub indicators:  Option<PathBuf>,
    /// Replaces the built-in calibration when present.
    pub calibration: Option<PathBuf>,
    pub class_map:   Option<PathBuf>,
    pub output:      OutputSection,
    #[serde(default)]
    pub config:      FlowConfig,
}

impl RunFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading run file {}", path.display()))?;
        Self::parse(&text, path.parent().unwrap_or(Path::new("")))
            .with_context(|| format!("parsing run file {}", path.display()))
    }

    /// Parse run-file JSON, resolving relative paths against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self> {
        let mut run: RunFile = serde_json::from_str(text)?;
        run.resolve(base);
        Ok(run)
    }

    fn resolve(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.network);
        join(&mut self.origins);
        join(&mut self.pois);
        join(&mut self.output.dir);
        for p in [
            &mut self.workplaces,
            &mut self.schools,
            &mut self.socio,
            &mut self.indicators,
            &mut self.calibration,
            &mut self.class_map,
        ]
        .into_iter()
        .flatten()
        {
            join(p);
        }
    }
}
