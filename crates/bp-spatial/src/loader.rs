//! CSV + WKT network loader.
//!
//! # CSV format
//!
//! One row per input segment.  Only `segment_id` and `wkt` are required.
//!
//! ```csv
//! segment_id,wkt,direction,road_class,speed_kmh,adt,cycle_infra
//! 1,"LINESTRING (0 0, 500 0)",both,5,30,,false
//! 2,"LINESTRING (500 0, 1000 0)",forward,3,60,4500,true
//! ```
//!
//! | Column        | Meaning                                                  |
//! |---------------|----------------------------------------------------------|
//! | `segment_id`  | Stable `u64` id, reported back in output                 |
//! | `wkt`         | `LINESTRING` or single-part `MULTILINESTRING`, metres    |
//! | `direction`   | `both` (default), `forward` or `backward`                |
//! | `road_class`  | Functional class; enables LTS classification             |
//! | `speed_kmh`   | Posted speed (0 or empty = unknown)                      |
//! | `adt`         | Average daily traffic (0 or empty = unknown)             |
//! | `cycle_infra` | Separated cycle facility present                         |
//! | `lts`         | Precomputed LTS 1–4; overrides classification            |
//! | `ratio`       | Penalty ratio override; requires `lts`                   |
//!
//! Coordinates must be in a projected CRS with metre units.  Multi-part
//! lines are rejected rather than silently merged.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use geo::Geometry;
use serde::Deserialize;
use wkt::TryFromWkt;

use bp_core::{Point, SegmentId};

use crate::lts::{Infrastructure, Lts, RoadAttributes};
use crate::network::{Direction, SegmentNetwork, SegmentNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SegmentRecord {
    segment_id:  u64,
    wkt:         String,
    #[serde(default)]
    direction:   Option<String>,
    #[serde(default)]
    road_class:  Option<u8>,
    #[serde(default)]
    speed_kmh:   Option<u32>,
    #[serde(default)]
    adt:         Option<u32>,
    #[serde(default)]
    cycle_infra: Option<bool>,
    #[serde(default)]
    lts:         Option<u8>,
    #[serde(default)]
    ratio:       Option<f64>,
}

// ── NetworkLayer ──────────────────────────────────────────────────────────────

/// A loaded network plus the per-segment classification, if the input
/// carried enough attributes to produce one.
pub struct NetworkLayer {
    pub network:        SegmentNetwork,
    pub infrastructure: HashMap<SegmentId, Infrastructure>,
}

impl NetworkLayer {
    pub fn has_infrastructure(&self) -> bool {
        !self.infrastructure.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_network_csv(path: &Path) -> SpatialResult<NetworkLayer> {
    let file = std::fs::File::open(path)?;
    load_network_reader(file)
}

/// Like [`load_network_csv`] but accepts any `Read` source.
pub fn load_network_reader<R: Read>(reader: R) -> SpatialResult<NetworkLayer> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = SegmentNetworkBuilder::new();
    let mut infrastructure = HashMap::new();

    for (row, result) in csv_reader.deserialize::<SegmentRecord>().enumerate() {
        let rec = result.map_err(|e| SpatialError::Parse(format!("network row {}: {e}", row + 1)))?;
        let segment = SegmentId(rec.segment_id);

        let direction: Direction = rec.direction.as_deref().unwrap_or("").parse()?;
        let points = parse_line(segment, &rec.wkt)?;
        builder.add_polyline(segment, &points, direction)?;

        if let Some(infra) = infrastructure_of(segment, &rec)? {
            infrastructure.insert(segment, infra);
        }
    }

    let network = builder.build();
    log::info!(
        "loaded network: {} segments, {} vertices, {} directed edges, {} classified",
        network.segments().len(),
        network.node_count(),
        network.edge_count(),
        infrastructure.len(),
    );
    Ok(NetworkLayer { network, infrastructure })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_line(segment: SegmentId, wkt_str: &str) -> SpatialResult<Vec<Point>> {
    let geom = Geometry::<f64>::try_from_wkt_str(wkt_str)
        .map_err(|e| SpatialError::Parse(format!("{segment}: invalid WKT: {e}")))?;

    let line = match geom {
        Geometry::LineString(ls) => ls,
        Geometry::MultiLineString(mut mls) if mls.0.len() == 1 => mls.0.remove(0),
        Geometry::MultiLineString(mls) => {
            return Err(SpatialError::UnsupportedGeometry {
                segment,
                kind: format!("MULTILINESTRING with {} parts", mls.0.len()),
            });
        }
        other => {
            return Err(SpatialError::UnsupportedGeometry {
                segment,
                kind: geometry_kind(&other).to_string(),
            });
        }
    };
    Ok(line.coords().map(|c| Point::new(c.x, c.y)).collect())
}

fn geometry_kind(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_)              => "POINT",
        Geometry::Line(_)               => "LINE",
        Geometry::LineString(_)         => "LINESTRING",
        Geometry::Polygon(_)            => "POLYGON",
        Geometry::MultiPoint(_)         => "MULTIPOINT",
        Geometry::MultiLineString(_)    => "MULTILINESTRING",
        Geometry::MultiPolygon(_)       => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        Geometry::Rect(_)               => "RECT",
        Geometry::Triangle(_)           => "TRIANGLE",
    }
}

fn infrastructure_of(segment: SegmentId, rec: &SegmentRecord) -> SpatialResult<Option<Infrastructure>> {
    let attributes = rec.road_class.map(|class| RoadAttributes {
        road_class:  class,
        speed_kmh:   rec.speed_kmh,
        adt:         rec.adt,
        cycle_infra: rec.cycle_infra.unwrap_or(false),
    });

    if let Some(level) = rec.lts {
        let lts = Lts::from_level(level).ok_or_else(|| {
            SpatialError::Parse(format!("{segment}: lts must be 1-4, got {level}"))
        })?;
        let mut infra = Infrastructure::from(lts);
        infra.rec = attributes.as_ref().map(RoadAttributes::recommended_infrastructure);
        if let Some(ratio) = rec.ratio {
            if !ratio.is_finite() {
                return Err(SpatialError::Parse(format!("{segment}: non-finite ratio")));
            }
            infra.ratio = ratio;
        }
        return Ok(Some(infra));
    }
    if rec.ratio.is_some() {
        return Err(SpatialError::Parse(format!("{segment}: ratio given without lts")));
    }
    Ok(attributes.map(|a| a.classify()))
}
