//! Per-category, per-mode segment flow totals.

use bp_core::{CategoryId, Mode, SegmentId};

#[cfg(feature = "fx-hash")]
type SegmentMap = rustc_hash::FxHashMap<SegmentId, f64>;
#[cfg(not(feature = "fx-hash"))]
type SegmentMap = std::collections::HashMap<SegmentId, f64>;

/// `(category, mode) → segment → flow`.
///
/// Values only ever grow.  A segment absent from a map was never touched by
/// a route of that category, which output reports as null rather than 0.
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulator {
    /// Indexed by `category.index() * 2 + mode.index()`.
    maps: Vec<SegmentMap>,
}

impl FlowAccumulator {
    pub fn new(category_count: usize) -> Self {
        Self {
            maps: (0..category_count * Mode::ALL.len()).map(|_| SegmentMap::default()).collect(),
        }
    }

    #[inline]
    fn slot(category: CategoryId, mode: Mode) -> usize {
        category.index() * Mode::ALL.len() + mode.index()
    }

    fn map_mut(&mut self, category: CategoryId, mode: Mode) -> &mut SegmentMap {
        let slot = Self::slot(category, mode);
        if slot >= self.maps.len() {
            self.maps.resize_with(slot + 1, SegmentMap::default);
        }
        &mut self.maps[slot]
    }

    /// Add `flow` to `segment`, marking it touched even when `flow` is 0.
    #[inline]
    pub fn add(&mut self, category: CategoryId, mode: Mode, segment: SegmentId, flow: f64) {
        *self.map_mut(category, mode).entry(segment).or_insert(0.0) += flow;
    }

    pub fn get(&self, category: CategoryId, mode: Mode, segment: SegmentId) -> Option<f64> {
        self.maps
            .get(Self::slot(category, mode))
            .and_then(|m| m.get(&segment).copied())
    }

    /// Every touched segment of one `(category, mode)`, in arbitrary order.
    pub fn iter(&self, category: CategoryId, mode: Mode) -> impl Iterator<Item = (SegmentId, f64)> + '_ {
        self.maps
            .get(Self::slot(category, mode))
            .into_iter()
            .flat_map(|m| m.iter().map(|(&s, &f)| (s, f)))
    }

    /// Sum over all categories and modes; `None` if never touched.
    pub fn total(&self, segment: SegmentId) -> Option<f64> {
        let mut touched = false;
        let mut sum = 0.0;
        for m in &self.maps {
            if let Some(f) = m.get(&segment) {
                touched = true;
                sum += f;
            }
        }
        touched.then_some(sum)
    }

    /// Fold `other` into `self` by addition.
    pub fn merge(&mut self, other: FlowAccumulator) {
        if self.maps.len() < other.maps.len() {
            self.maps.resize_with(other.maps.len(), SegmentMap::default);
        }
        for (dst, src) in self.maps.iter_mut().zip(other.maps) {
            if dst.is_empty() {
                *dst = src;
                continue;
            }
            for (segment, flow) in src {
                *dst.entry(segment).or_insert(0.0) += flow;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.maps.iter().all(|m| m.is_empty())
    }

    /// Number of `(category, mode, segment)` cells touched.
    pub fn cell_count(&self) -> usize {
        self.maps.iter().map(|m| m.len()).sum()
    }
}
