//! Chi-squared distribution utility.
//!
//! Thin wrapper over the [`special`](crate::special) functions exposing
//! the density, CDF, q-value, and inverse CDF of the chi-squared
//! distribution for a configurable degrees-of-freedom parameter. The
//! [`crosstab`](crate::crosstab) module feeds contingency-table
//! statistics through this type to obtain significance values.

use crate::error::StatError;
use crate::special::{incomplete_gamma_p, inverse_incomplete_gamma_p, ln_gamma};

/// Chi-squared distribution with `nu` degrees of freedom.
///
/// The log-normalization constant is recomputed whenever `nu` is set,
/// so the two fields are always in sync.
///
/// ```
/// use tabstat::chi2::Chi2;
///
/// let dist = Chi2::new(3.0);
/// let x = 4.2;
/// let cdf = dist.cdf(x).unwrap();
/// let q = dist.q_value(x).unwrap();
/// assert!((cdf + q - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Chi2 {
    nu: f64,
    fac: f64,
}

impl Chi2 {
    /// Creates a distribution with the given degrees of freedom.
    ///
    /// NaN, non-finite, and sub-1 inputs fall back to 1; fractional
    /// values are floored to an integer.
    pub fn new(nu: f64) -> Self {
        let mut dist = Self { nu: 1.0, fac: 0.0 };
        dist.set_nu(nu);
        dist
    }

    /// Returns the current degrees of freedom.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Sets the degrees of freedom, sanitizing invalid input to 1, and
    /// recomputes the normalization constant.
    pub fn set_nu(&mut self, nu: f64) {
        let nu = if nu.is_finite() && nu >= 1.0 {
            nu.floor()
        } else {
            1.0
        };
        self.nu = nu;
        // ln_gamma cannot fail for nu >= 1.
        let gln = ln_gamma(0.5 * nu).unwrap_or(0.0);
        self.fac = std::f64::consts::LN_2 * (0.5 * nu) + gln;
    }

    /// Probability density at `x2`; 0 for non-positive input.
    pub fn density(&self, x2: f64) -> f64 {
        if x2 <= 0.0 {
            return 0.0;
        }
        (-0.5 * (x2 - (self.nu - 2.0) * x2.ln()) - self.fac).exp()
    }

    /// Cumulative distribution at `x2`; 0 for non-positive input.
    pub fn cdf(&self, x2: f64) -> Result<f64, StatError> {
        if x2 <= 0.0 {
            return Ok(0.0);
        }
        incomplete_gamma_p(0.5 * self.nu, 0.5 * x2)
    }

    /// Probability of observing a deviation at least this large by
    /// chance: `1 − cdf(x2)`.
    ///
    /// Returns the −1 sentinel for non-positive input, signalling an
    /// invalid chi-squared statistic to the caller.
    pub fn q_value(&self, x2: f64) -> Result<f64, StatError> {
        if x2 <= 0.0 {
            return Ok(-1.0);
        }
        Ok(1.0 - incomplete_gamma_p(0.5 * self.nu, 0.5 * x2)?)
    }

    /// Inverse CDF; out-of-range probabilities are clamped to 0.
    pub fn inverse_cdf(&self, p: f64) -> Result<f64, StatError> {
        let p = if (0.0..1.0).contains(&p) { p } else { 0.0 };
        Ok(2.0 * inverse_incomplete_gamma_p(p, 0.5 * self.nu)?)
    }
}

impl Default for Chi2 {
    fn default() -> Self {
        Self::new(1.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nu_is_sanitized() {
        assert_eq!(Chi2::new(3.7).nu(), 3.0);
        assert_eq!(Chi2::new(0.2).nu(), 1.0);
        assert_eq!(Chi2::new(-5.0).nu(), 1.0);
        assert_eq!(Chi2::new(f64::NAN).nu(), 1.0);
        assert_eq!(Chi2::new(f64::INFINITY).nu(), 1.0);
    }

    #[test]
    fn set_nu_keeps_constant_in_sync() {
        let mut dist = Chi2::new(2.0);
        let d2 = dist.density(1.0);
        dist.set_nu(6.0);
        let d6 = dist.density(1.0);
        // Different normalization constants give different densities.
        assert!((d2 - d6).abs() > 1e-6);
        // nu = 2 density is exp(-x/2)/2.
        assert!((d2 - 0.5 * (-0.5_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn density_is_zero_left_of_origin() {
        let dist = Chi2::new(4.0);
        assert_eq!(dist.density(0.0), 0.0);
        assert_eq!(dist.density(-1.0), 0.0);
        assert!(dist.density(1.0) > 0.0);
    }

    #[test]
    fn cdf_known_values() {
        // nu = 2: CDF(x) = 1 - exp(-x/2)
        let dist = Chi2::new(2.0);
        for x in [0.5, 1.0, 3.0, 8.0] {
            let expected = 1.0 - (-0.5 * x as f64).exp();
            assert!((dist.cdf(x).unwrap() - expected).abs() < 1e-10);
        }
        assert_eq!(dist.cdf(0.0).unwrap(), 0.0);
        assert_eq!(dist.cdf(-2.0).unwrap(), 0.0);
    }

    #[test]
    fn cdf_plus_q_value_is_one() {
        for nu in [1.0, 2.0, 5.0, 30.0] {
            let dist = Chi2::new(nu);
            for x in [0.1, 1.0, 4.5, 20.0] {
                let total = dist.cdf(x).unwrap() + dist.q_value(x).unwrap();
                assert!((total - 1.0).abs() < 1e-12, "nu={nu}, x={x}");
            }
        }
    }

    #[test]
    fn q_value_sentinel_for_invalid_input() {
        let dist = Chi2::new(3.0);
        assert_eq!(dist.q_value(0.0).unwrap(), -1.0);
        assert_eq!(dist.q_value(-4.0).unwrap(), -1.0);
    }

    #[test]
    fn inverse_cdf_round_trip() {
        for nu in [1.0, 3.0, 10.0] {
            let dist = Chi2::new(nu);
            for p in [0.05, 0.5, 0.95] {
                let x = dist.inverse_cdf(p).unwrap();
                assert!((dist.cdf(x).unwrap() - p).abs() < 1e-6, "nu={nu}, p={p}");
            }
        }
    }

    #[test]
    fn inverse_cdf_clamps_out_of_range() {
        let dist = Chi2::new(2.0);
        assert_eq!(dist.inverse_cdf(-0.5).unwrap(), 0.0);
        assert_eq!(dist.inverse_cdf(1.5).unwrap(), 0.0);
    }
}
