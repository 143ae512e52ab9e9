//! Trip-producing origin zones.

use std::collections::{HashMap, HashSet};

use bp_core::{OriginId, Point};

use crate::socio::SocioTable;
use crate::{DemandError, DemandResult};

// ── Origin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub id:     OriginId,
    /// External identifier, used to join side tables and in route exports.
    pub key:    String,
    pub pos:    Point,
    /// Raw size, e.g. resident population.
    pub size:   f64,
    /// Multiplicative weight, mean 1 over the set.  `1.0` when unweighted.
    pub weight: f64,
}

impl Origin {
    /// `size × weight`: the quantity trips are generated from.
    #[inline]
    pub fn effective_size(&self) -> f64 {
        self.size * self.weight
    }
}

// ── OriginSet ─────────────────────────────────────────────────────────────────

/// All origins of a run, indexed by `OriginId`.
///
/// Ids are assigned densely in input order.  Weights supplied at
/// construction (or joined later via [`apply_socio`](Self::apply_socio)) are
/// rescaled so that their mean is exactly 1; origins without a weight keep
/// the neutral weight 1.
#[derive(Debug, Clone, Default)]
pub struct OriginSet {
    origins: Vec<Origin>,
}

impl OriginSet {
    /// Build from `(key, position, size, optional raw weight)` tuples.
    pub fn new<I>(items: I) -> DemandResult<Self>
    where
        I: IntoIterator<Item = (String, Point, f64, Option<f64>)>,
    {
        let mut origins = Vec::new();
        let mut raw_weights = Vec::new();
        let mut seen = HashSet::new();

        for (i, (key, pos, size, weight)) in items.into_iter().enumerate() {
            let id = OriginId::try_from(i).map_err(|_| DemandError::TooMany("origins"))?;
            if !seen.insert(key.clone()) {
                return Err(DemandError::DuplicateOrigin(key));
            }
            if !pos.is_finite() {
                return Err(invalid(&key, "non-finite position"));
            }
            if !size.is_finite() || size < 0.0 {
                return Err(invalid(&key, format!("size must be finite and non-negative, got {size}")));
            }
            origins.push(Origin { id, key, pos, size, weight: 1.0 });
            raw_weights.push(weight);
        }

        let mut set = Self { origins };
        set.set_weights(&raw_weights)?;
        Ok(set)
    }

    /// Replace every origin's weight with its socio-economic index, then
    /// normalize.  Origins whose key is absent from `table` get weight 1.
    ///
    /// Returns the number of origins that had no match.
    pub fn apply_socio(&mut self, table: &SocioTable) -> DemandResult<usize> {
        let raw: Vec<Option<f64>> = self.origins.iter().map(|o| table.get(&o.key)).collect();
        let missing = raw.iter().filter(|w| w.is_none()).count();
        if missing > 0 {
            log::warn!(
                "{missing} of {} origins have no socio-economic index; using weight 1",
                self.origins.len()
            );
        }
        for (o, w) in self.origins.iter().zip(&raw) {
            if w.is_none() {
                log::trace!("origin {:?}: no socio-economic index", o.key);
            }
        }
        self.set_weights(&raw)?;
        Ok(missing)
    }

    fn set_weights(&mut self, raw: &[Option<f64>]) -> DemandResult<()> {
        let mut sum = 0.0;
        let mut n = 0usize;
        for (o, w) in self.origins.iter().zip(raw) {
            if let Some(w) = *w {
                if !w.is_finite() || w < 0.0 {
                    return Err(invalid(&o.key, format!("weight must be finite and non-negative, got {w}")));
                }
                sum += w;
                n += 1;
            }
        }
        let mean = if n > 0 { sum / n as f64 } else { 1.0 };
        if mean <= 0.0 {
            return Err(DemandError::Parse("origin weights are all zero".into()));
        }
        for (o, w) in self.origins.iter_mut().zip(raw) {
            o.weight = w.map_or(1.0, |w| w / mean);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Panics on an id not issued by this set.
    #[inline]
    pub fn get(&self, id: OriginId) -> &Origin {
        &self.origins[id.index()]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Origin> {
        self.origins.iter()
    }

    pub fn as_slice(&self) -> &[Origin] {
        &self.origins
    }

    pub fn positions(&self) -> Vec<Point> {
        self.origins.iter().map(|o| o.pos).collect()
    }

    /// Lookup table from external key to id.
    pub fn key_index(&self) -> HashMap<&str, OriginId> {
        self.origins.iter().map(|o| (o.key.as_str(), o.id)).collect()
    }

    pub fn total_effective_size(&self) -> f64 {
        self.origins.iter().map(Origin::effective_size).sum()
    }
}

impl<'a> IntoIterator for &'a OriginSet {
    type Item = &'a Origin;
    type IntoIter = std::slice::Iter<'a, Origin>;

    fn into_iter(self) -> Self::IntoIter {
        self.origins.iter()
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> DemandError {
    DemandError::InvalidOrigin { key: key.to_string(), reason: reason.into() }
}
