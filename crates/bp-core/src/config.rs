//! Run configuration.
//!
//! # Distances
//!
//! Two independent bounds govern which destinations an origin can reach:
//!
//! | Field             | Applies to                                   |
//! |-------------------|----------------------------------------------|
//! | `max_distance_m`  | network cost (authoritative cutoff)          |
//! | `search_radius_m` | straight-line candidate pre-filter           |
//!
//! Because a network path is never shorter than the straight line between
//! its ends, the pre-filter only stays lossless while
//! `search_radius_m >= max_distance_m`.  [`FlowConfig::validate`] rejects any
//! configuration that breaks this.

use crate::{BpError, BpResult};

/// Default network cutoff in metres.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 30_000.0;

/// Default cap on nearest-neighbour candidates per origin.  Large enough to
/// mean "everything within the radius" for city-scale inputs.
pub const DEFAULT_MAX_CANDIDATES: usize = 9_001;

// ── ModeSplit ─────────────────────────────────────────────────────────────────

/// Global share of trips allocated to each bicycle class.
///
/// Applied multiplicatively alongside the distance-dependent mode-choice
/// probability of each route.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSplit {
    pub bike:  f64,
    pub ebike: f64,
}

impl ModeSplit {
    pub fn share(&self, mode: crate::Mode) -> f64 {
        match mode {
            crate::Mode::Bike  => self.bike,
            crate::Mode::Ebike => self.ebike,
        }
    }
}

impl Default for ModeSplit {
    fn default() -> Self {
        Self { bike: 0.8, ebike: 0.2 }
    }
}

// ── FlowConfig ────────────────────────────────────────────────────────────────

/// Top-level assignment configuration.
///
/// Typically loaded from a JSON run file by the application crate and passed
/// to the engine builder.  Immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowConfig {
    /// Network-cost cutoff in metres.  `<= 0` (or non-finite) disables it.
    pub max_distance_m: f64,

    /// Straight-line radius for the candidate pre-filter.  `None` reuses the
    /// network cutoff (or no bound at all when the cutoff is disabled).
    pub search_radius_m: Option<f64>,

    /// Maximum candidates returned by the nearest-neighbour query.
    pub max_candidates: usize,

    /// Global bike / e-bike allocation.
    pub mode_split: ModeSplit,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_distance_m:  DEFAULT_MAX_DISTANCE_M,
            search_radius_m: None,
            max_candidates:  DEFAULT_MAX_CANDIDATES,
            mode_split:      ModeSplit::default(),
            num_threads:     None,
        }
    }
}

impl FlowConfig {
    /// The authoritative network cutoff, or `None` when disabled.
    #[inline]
    pub fn network_cutoff(&self) -> Option<f64> {
        (self.max_distance_m.is_finite() && self.max_distance_m > 0.0)
            .then_some(self.max_distance_m)
    }

    /// The straight-line candidate radius.  `f64::INFINITY` means unbounded.
    pub fn search_radius(&self) -> f64 {
        match (self.search_radius_m, self.network_cutoff()) {
            (Some(r), _) if r > 0.0 => r,
            (_, Some(cutoff))       => cutoff,
            _                       => f64::INFINITY,
        }
    }

    /// Scale used to make distances dimensionless in the mode-choice curve.
    ///
    /// The coefficients are calibrated against the cutoff distance; when the
    /// cutoff is disabled the default distance is used instead.
    #[inline]
    pub fn mode_scale_m(&self) -> f64 {
        self.network_cutoff().unwrap_or(DEFAULT_MAX_DISTANCE_M)
    }

    /// Check internal consistency.  Called by the engine builder before any
    /// work is done.
    pub fn validate(&self) -> BpResult<()> {
        if self.max_candidates == 0 {
            return Err(BpError::Config("max_candidates must be at least 1".into()));
        }
        if let Some(r) = self.search_radius_m {
            if r.is_nan() || r <= 0.0 {
                return Err(BpError::Config(format!(
                    "search_radius_m must be positive, got {r}"
                )));
            }
            match self.network_cutoff() {
                Some(cutoff) if r < cutoff => {
                    return Err(BpError::Config(format!(
                        "search_radius_m ({r}) is smaller than max_distance_m ({cutoff}); \
                         destinations within the network cutoff would be missed"
                    )));
                }
                None if r.is_finite() => {
                    return Err(BpError::Config(format!(
                        "search_radius_m ({r}) bounds candidates while the network cutoff is disabled"
                    )));
                }
                _ => {}
            }
        }
        let ModeSplit { bike, ebike } = self.mode_split;
        if !(bike.is_finite() && ebike.is_finite()) || bike < 0.0 || ebike < 0.0 {
            return Err(BpError::Config(format!(
                "mode split shares must be finite and non-negative, got bike={bike} ebike={ebike}"
            )));
        }
        if self.num_threads == Some(0) {
            return Err(BpError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
