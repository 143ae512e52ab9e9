//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! a `segment_flows` table (one `REAL` column per flow value, NULL when
//! untouched) and, when routes are exported, a `routes` table.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::{check_shape, OutputWriter};
use crate::{FlowTable, OutputResult, RouteRow};

pub struct SqliteWriter {
    conn:          Connection,
    routes_ready:  bool,
    finished:      bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Ok(Self { conn, routes_ready: false, finished: false })
    }
}

/// Quote an identifier; category names are user data.
fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl OutputWriter for SqliteWriter {
    fn write_segment_flows(&mut self, table: &FlowTable) -> OutputResult<()> {
        check_shape(table)?;

        let mut cols = vec!["segment_id INTEGER PRIMARY KEY".to_string()];
        cols.extend(table.value_columns.iter().map(|c| format!("{} REAL", ident(c))));
        if table.has_infrastructure {
            cols.extend(["flow_total REAL", "lts INTEGER", "rec INTEGER", "ratio REAL", "\"R\" REAL"].map(String::from));
        }
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS segment_flows; CREATE TABLE segment_flows ({});",
            cols.join(", ")
        ))?;

        let header = table.header();
        let placeholders: Vec<String> = (1..=header.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO segment_flows ({}) VALUES ({})",
            header.iter().map(|h| ident(h)).collect::<Vec<_>>().join(", "),
            placeholders.join(", "),
        );

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in &table.rows {
                let mut params: Vec<rusqlite::types::Value> = Vec::with_capacity(header.len());
                params.push((row.segment_id as i64).into());
                params.extend(row.values.iter().map(|v| (*v).into()));
                if table.has_infrastructure {
                    params.push(row.flow_total.into());
                    params.push(row.lts.map(i64::from).into());
                    params.push(row.rec.map(i64::from).into());
                    params.push(row.ratio.into());
                    params.push(row.r.into());
                }
                stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()> {
        if !self.routes_ready {
            self.conn.execute_batch(
                "DROP TABLE IF EXISTS routes;
                 CREATE TABLE routes (
                     origin        TEXT    NOT NULL,
                     destination   INTEGER NOT NULL,
                     od_key        TEXT    NOT NULL,
                     category      TEXT    NOT NULL,
                     distance_m    REAL    NOT NULL,
                     decay         REAL    NOT NULL,
                     bike_prob     REAL    NOT NULL,
                     ebike_prob    REAL    NOT NULL,
                     segment_count INTEGER NOT NULL
                 );",
            )?;
            self.routes_ready = true;
        }
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO routes \
                 (origin, destination, od_key, category, distance_m, decay, bike_prob, ebike_prob, segment_count) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.origin,
                    row.destination,
                    row.od_key,
                    row.category,
                    row.distance_m,
                    row.decay,
                    row.bike_prob,
                    row.ebike_prob,
                    row.segment_count,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
