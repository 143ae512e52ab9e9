//! Categorized destinations and the typed layers they come from.
//!
//! A run has one mandatory POI layer whose rows carry a raw class label,
//! classified through the catalog, plus any number of layers pinned to a
//! single category (workplaces, schools) whose rows carry an actual size.
//! Both kinds collapse into one [`DestinationSet`] with dense ids, so the
//! route builder is a single loop regardless of how many layers feed it.

use bp_catalog::{calibration, Catalog};
use bp_core::{CategoryId, DestinationId, Point};

use crate::{DemandError, DemandResult};

// ── Input records ─────────────────────────────────────────────────────────────

/// One row of a classified layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    pub pos:   Point,
    pub class: String,
    /// Defaults to 1.
    pub size:  Option<f64>,
}

/// One row of a fixed-category layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedPoint {
    pub pos:  Point,
    pub size: f64,
}

// ── DestinationSource ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum DestinationSource {
    /// Each row's category comes from its class label.
    Classified { name: String, records: Vec<PoiRecord> },
    /// Every row belongs to `category`.
    Fixed { name: String, category: String, records: Vec<SizedPoint> },
}

impl DestinationSource {
    pub fn pois(records: Vec<PoiRecord>) -> Self {
        Self::Classified { name: "poi".into(), records }
    }

    pub fn workplaces(records: Vec<SizedPoint>) -> Self {
        Self::fixed("work", calibration::WORK, records)
    }

    pub fn schools(records: Vec<SizedPoint>) -> Self {
        Self::fixed("school", calibration::SCHOOL, records)
    }

    pub fn fixed(name: impl Into<String>, category: impl Into<String>, records: Vec<SizedPoint>) -> Self {
        Self::Fixed { name: name.into(), category: category.into(), records }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Classified { name, .. } | Self::Fixed { name, .. } => name,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Classified { records, .. } => records.len(),
            Self::Fixed { records, .. } => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Destination ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub id:       DestinationId,
    pub pos:      Point,
    /// `None` for rows whose class label the catalog does not map.
    pub category: Option<CategoryId>,
    pub size:     f64,
}

impl Destination {
    /// Whether this destination can attract trips at all.
    #[inline]
    pub fn is_admissible(&self) -> bool {
        self.category.is_some() && self.size > 0.0
    }
}

// ── DestinationSet ────────────────────────────────────────────────────────────

/// Every destination of a run, indexed by `DestinationId`.
///
/// Inadmissible rows (unmapped class, size ≤ 0) are kept so ids stay aligned
/// with input rows; consumers skip them.
#[derive(Debug, Clone, Default)]
pub struct DestinationSet {
    items: Vec<Destination>,
}

impl DestinationSet {
    /// Classify and merge `sources`, assigning ids in source then row order.
    pub fn build<I>(catalog: &Catalog, sources: I) -> DemandResult<Self>
    where
        I: IntoIterator<Item = DestinationSource>,
    {
        let mut items = Vec::new();

        for source in sources {
            let before = items.len();
            let mut unmapped = 0usize;
            let layer = source.name().to_string();

            match source {
                DestinationSource::Classified { records, .. } => {
                    for rec in records {
                        let size = rec.size.unwrap_or(1.0);
                        let category = catalog.classify(&rec.class);
                        if category.is_none() {
                            log::trace!("{layer}: class {:?} is not mapped; excluded", rec.class);
                            unmapped += 1;
                        }
                        push(&mut items, &layer, rec.pos, category, size)?;
                    }
                }
                DestinationSource::Fixed { category, records, .. } => {
                    let id = catalog.category_id(&category).ok_or_else(|| {
                        DemandError::MissingCategory { layer: layer.clone(), category: category.clone() }
                    })?;
                    for rec in records {
                        push(&mut items, &layer, rec.pos, Some(id), rec.size)?;
                    }
                }
            }

            let added = &items[before..];
            let empty = added.iter().filter(|d| d.category.is_some() && d.size <= 0.0).count();
            log::info!(
                "destination layer {layer:?}: {} rows, {unmapped} unmapped, {empty} with size <= 0",
                added.len()
            );
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Panics on an id not issued by this set.
    #[inline]
    pub fn get(&self, id: DestinationId) -> &Destination {
        &self.items[id.index()]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Destination> {
        self.items.iter()
    }

    pub fn admissible_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_admissible()).count()
    }

    /// `(id, position)` pairs for building a spatial index.
    pub fn index_items(&self) -> impl Iterator<Item = (DestinationId, Point)> + '_ {
        self.items.iter().map(|d| (d.id, d.pos))
    }
}

fn push(
    items:    &mut Vec<Destination>,
    layer:    &str,
    pos:      Point,
    category: Option<CategoryId>,
    size:     f64,
) -> DemandResult<()> {
    if !pos.is_finite() {
        return Err(DemandError::InvalidDestination {
            layer:  layer.to_string(),
            reason: format!("non-finite position {pos}"),
        });
    }
    if !size.is_finite() {
        return Err(DemandError::InvalidDestination {
            layer:  layer.to_string(),
            reason: format!("non-finite size {size}"),
        });
    }
    let id = DestinationId::try_from(items.len()).map_err(|_| DemandError::TooMany("destinations"))?;
    items.push(Destination { id, pos, category, size });
    Ok(())
}
