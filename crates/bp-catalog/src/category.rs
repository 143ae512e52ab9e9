//! Per-category calibration constants.

use bp_core::Mode;

use crate::choice::mode_probability;

/// Coefficients `(a0, a1, a2, a3)` of the mode-choice logistic curve.
///
/// See [`mode_probability`] for the functional form.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModeCoefficients(pub [f64; 4]);

impl ModeCoefficients {
    #[inline]
    pub fn new(a0: f64, a1: f64, a2: f64, a3: f64) -> Self {
        Self([a0, a1, a2, a3])
    }

    /// Selection probability at `distance_m`, scaled by `scale_m`.
    #[inline]
    pub fn probability(&self, distance_m: f64, scale_m: f64) -> f64 {
        mode_probability(self, distance_m, scale_m)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

/// Everything the demand model needs to know about one trip purpose.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryParams {
    /// Unique name, also used as the output column prefix.
    pub name: String,

    /// Gravity decay coefficient β, per kilometre.  Negative: attractiveness
    /// falls with distance.
    pub decay_coefficient: f64,

    /// Mode-choice coefficients for conventional bicycles.
    pub bike: ModeCoefficients,

    /// Mode-choice coefficients for e-bikes.
    pub ebike: ModeCoefficients,

    /// Trips per unit of origin size per day.
    pub trip_rate: f64,
}

impl CategoryParams {
    pub fn new(
        name:              impl Into<String>,
        decay_coefficient: f64,
        bike:              ModeCoefficients,
        ebike:             ModeCoefficients,
        trip_rate:         f64,
    ) -> Self {
        Self { name: name.into(), decay_coefficient, bike, ebike, trip_rate }
    }

    #[inline]
    pub fn coefficients(&self, mode: Mode) -> &ModeCoefficients {
        match mode {
            Mode::Bike  => &self.bike,
            Mode::Ebike => &self.ebike,
        }
    }
}
