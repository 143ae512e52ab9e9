//! Socio-economic weighting of origins.
//!
//! Each origin zone can carry several deprivation indicators (share
//! unemployed, share without upper-secondary education, share on income
//! support, ...).  Every indicator is scored against its own distribution:
//!
//! | Value                      | Points |
//! |----------------------------|--------|
//! | ≤ 20th percentile          | 3      |
//! | ≥ 80th percentile          | 1      |
//! | otherwise (or missing)     | 2      |
//!
//! The composite index of a zone is its summed points divided by the mean of
//! the summed points, so the index averages 1 and scales trip production up
//! in zones that score high.

use std::collections::HashMap;

/// Quantile of an ascending-sorted slice with linear interpolation between
/// closest ranks.  `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Points for one indicator column.  Missing or non-finite values score 2.
pub fn points(values: &[Option<f64>]) -> Vec<u8> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let (Some(low), Some(high)) = (quantile(&sorted, 0.2), quantile(&sorted, 0.8)) else {
        return vec![2; values.len()];
    };

    values
        .iter()
        .map(|v| match (*v).filter(|v| v.is_finite()) {
            // High wins when both bounds coincide.
            Some(v) if v >= high => 1,
            Some(v) if v <= low  => 3,
            _ => 2,
        })
        .collect()
}

/// Composite index over several indicator columns of equal length.
///
/// Returns one value per row, with mean 1.  An empty input yields an empty
/// result.
pub fn composite_index(columns: &[Vec<Option<f64>>]) -> Vec<f64> {
    let rows = columns.first().map_or(0, Vec::len);
    if rows == 0 {
        return Vec::new();
    }
    let mut sums = vec![0u32; rows];
    for column in columns {
        debug_assert_eq!(column.len(), rows);
        for (sum, p) in sums.iter_mut().zip(points(column)) {
            *sum += u32::from(p);
        }
    }
    let mean = sums.iter().map(|&s| f64::from(s)).sum::<f64>() / rows as f64;
    if mean <= 0.0 {
        return vec![1.0; rows];
    }
    sums.into_iter().map(|s| f64::from(s) / mean).collect()
}

// ── SocioTable ────────────────────────────────────────────────────────────────

/// Index value per origin key.
#[derive(Debug, Clone, Default)]
pub struct SocioTable {
    by_key: HashMap<String, f64>,
}

impl SocioTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the index for `key`.
    pub fn insert(&mut self, key: impl Into<String>, index: f64) {
        self.by_key.insert(key.into(), index);
    }

    /// Score raw indicator columns and build the table from the composite.
    pub fn from_indicators(keys: &[String], columns: &[Vec<Option<f64>>]) -> Self {
        let index = composite_index(columns);
        let by_key = keys.iter().cloned().zip(index).collect();
        Self { by_key }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.by_key.get(key.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl FromIterator<(String, f64)> for SocioTable {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self { by_key: iter.into_iter().collect() }
    }
}
