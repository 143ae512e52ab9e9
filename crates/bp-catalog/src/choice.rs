//! Destination-choice and mode-choice functions.
//!
//! Both are pure numeric functions with no lookups; [`Catalog`](crate::Catalog)
//! wraps them with per-category coefficients.

use crate::ModeCoefficients;

/// Standard logistic function `1 / (1 + e^-z)`, saturating instead of failing.
///
/// `exp` overflows to `+inf` once `-z` exceeds ~709, which IEEE arithmetic
/// turns into exactly `0.0`; an infinite `z` in either direction lands on
/// `0.0` or `1.0`.  A NaN argument (only reachable through NaN coefficients)
/// maps to `0.0` so that no non-numeric value reaches the accumulators.
#[inline]
pub fn logistic(z: f64) -> f64 {
    if z.is_nan() {
        return 0.0;
    }
    (1.0 / (1.0 + (-z).exp())).clamp(0.0, 1.0)
}

/// Probability of choosing the mode described by `c` for a trip of
/// `distance_m` metres.
///
/// ```text
/// x = distance / scale
/// S = 1 / (1 + exp(-(a0 + a1·x + a2·x² + a3·√x)))
/// ```
///
/// `scale_m` is the maximum assignment distance the coefficients were
/// calibrated against.  Negative distances are treated as zero.
pub fn mode_probability(c: &ModeCoefficients, distance_m: f64, scale_m: f64) -> f64 {
    debug_assert!(scale_m > 0.0, "mode scale must be positive");
    let x = (distance_m / scale_m).max(0.0);
    let [a0, a1, a2, a3] = c.0;
    logistic(a0 + a1 * x + a2 * x * x + a3 * x.sqrt())
}

/// Gravity-model attractiveness of a destination.
///
/// `size · exp(β · distance_km)` with the distance given in metres and β per
/// kilometre.
#[inline]
pub fn gravity_weight(size: f64, decay_coefficient: f64, distance_m: f64) -> f64 {
    size * (decay_coefficient * distance_m / 1_000.0).exp()
}
