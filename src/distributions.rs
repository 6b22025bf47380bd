//! Reference distributions used by the uniformity tests.
//!
//! Normal and chi-squared come from `statrs`. The limiting Kolmogorov
//! distribution (the law of `sqrt(n) * D` for large n) is not part of
//! `statrs`, so it is evaluated here with the usual two-series expansion.

use std::f64::consts::PI;

use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF, Normal};

use crate::error::{Result, UniformityError};

/// Below this argument the theta-function series converges faster than the
/// alternating one.
const KOLMOGOROV_SERIES_SWITCH: f64 = 1.18;

/// Upper end of the quantile search; the CDF is 1 to machine precision here.
const KOLMOGOROV_QUANTILE_MAX: f64 = 10.0;

const BISECTION_STEPS: usize = 100;

/// Relative step size at which the chi-squared quantile search stops.
const QUANTILE_TOLERANCE: f64 = 1e-12;

pub fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| UniformityError::Distribution(e.to_string()))
}

pub fn chi_squared(degrees_of_freedom: f64) -> Result<ChiSquared> {
    ChiSquared::new(degrees_of_freedom).map_err(|e| UniformityError::Distribution(e.to_string()))
}

/// Upper tail `1 - F(x)` of a chi-squared distribution.
pub fn chi_squared_upper_tail(statistic: f64, degrees_of_freedom: f64) -> Result<f64> {
    Ok(1.0 - chi_squared(degrees_of_freedom)?.cdf(statistic))
}

/// Quantile of a chi-squared distribution.
///
/// `statrs` only gives a coarse estimate here, so it is polished with Newton
/// steps on the CDF, falling back to bisection whenever a step would leave
/// the current bracket.
pub fn chi_squared_quantile(probability: f64, degrees_of_freedom: f64) -> Result<f64> {
    let distribution = chi_squared(degrees_of_freedom)?;
    if probability <= 0.0 {
        return Ok(0.0);
    }
    if probability >= 1.0 {
        return Ok(f64::INFINITY);
    }

    let mut low = 0.0;
    let mut high = degrees_of_freedom.max(1.0);
    while distribution.cdf(high) < probability {
        low = high;
        high *= 2.0;
    }

    let estimate = distribution.inverse_cdf(probability);
    let mut x = if estimate > low && estimate < high {
        estimate
    } else {
        0.5 * (low + high)
    };

    for _ in 0..BISECTION_STEPS {
        let error = distribution.cdf(x) - probability;
        if error == 0.0 {
            return Ok(x);
        }
        if error < 0.0 {
            low = x;
        } else {
            high = x;
        }

        let density = distribution.pdf(x);
        let newton = x - error / density;
        let next = if density > 0.0 && newton > low && newton < high {
            newton
        } else {
            0.5 * (low + high)
        };
        if (next - x).abs() <= QUANTILE_TOLERANCE * x.max(1.0) {
            return Ok(next);
        }
        x = next;
    }
    Ok(x)
}

/// CDF of the limiting Kolmogorov distribution.
pub fn kolmogorov_cdf(z: f64) -> f64 {
    if z <= 0.0 {
        return 0.0;
    }
    if z < KOLMOGOROV_SERIES_SWITCH {
        let factor = (2.0 * PI).sqrt() / z;
        let term = (-PI * PI / (8.0 * z * z)).exp();
        (factor * (term + term.powi(9) + term.powi(25) + term.powi(49))).clamp(0.0, 1.0)
    } else {
        1.0 - kolmogorov_sf(z)
    }
}

/// Survival function `1 - CDF(z)` of the limiting Kolmogorov distribution.
pub fn kolmogorov_sf(z: f64) -> f64 {
    if z <= 0.0 {
        return 1.0;
    }
    if z < KOLMOGOROV_SERIES_SWITCH {
        1.0 - kolmogorov_cdf(z)
    } else {
        let term = (-2.0 * z * z).exp();
        (2.0 * (term - term.powi(4) + term.powi(9))).clamp(0.0, 1.0)
    }
}

/// Inverse of [`kolmogorov_cdf`], found by bisection.
pub fn kolmogorov_quantile(probability: f64) -> f64 {
    if probability <= 0.0 {
        return 0.0;
    }
    if probability >= 1.0 {
        return f64::INFINITY;
    }

    let (mut low, mut high) = (0.0, KOLMOGOROV_QUANTILE_MAX);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (low + high);
        if kolmogorov_cdf(mid) < probability {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}

/// One-sample Kolmogorov-Smirnov distances against the uniform(0,1) CDF.
///
/// Takes the sample in ascending order and returns `(D+, D-)`.
pub fn ks_uniform_distances(sorted: &[f64]) -> (f64, f64) {
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .fold((0.0_f64, 0.0_f64), |(d_plus, d_minus), (i, &x)| {
            let cdf = x.clamp(0.0, 1.0);
            let rank = i as f64;
            (
                d_plus.max((rank + 1.0) / n - cdf),
                d_minus.max(cdf - rank / n),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kolmogorov_known_quantile() {
        // sqrt(n) * D critical value at the 5% level
        let q = kolmogorov_quantile(0.95);
        assert!((q - 1.3581).abs() < 1e-3, "got {q}");
        assert!((kolmogorov_sf(q) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_kolmogorov_series_agree_at_switch() {
        let below = kolmogorov_cdf(KOLMOGOROV_SERIES_SWITCH - 1e-9);
        let above = kolmogorov_cdf(KOLMOGOROV_SERIES_SWITCH + 1e-9);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn test_kolmogorov_limits() {
        assert_eq!(kolmogorov_cdf(0.0), 0.0);
        assert_eq!(kolmogorov_sf(0.0), 1.0);
        assert!(kolmogorov_sf(5.0) < 1e-20);
        assert_eq!(kolmogorov_quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn test_chi_squared_helpers() {
        let upper = chi_squared_upper_tail(16.918978, 9.0).unwrap();
        assert!((upper - 0.05).abs() < 1e-7);
        let q = chi_squared_quantile(0.95, 9.0).unwrap();
        assert!((q - 16.918978).abs() < 1e-6, "got {q}");
    }

    #[test]
    fn test_chi_squared_quantile_known_values() {
        // (probability, degrees of freedom, quantile)
        let cases = [
            (0.95, 1.0, 3.841459),
            (0.95, 19.0, 30.143527),
            (0.99, 9.0, 21.665994),
            (0.05, 9.0, 3.325113),
        ];
        for (p, df, expected) in cases {
            let q = chi_squared_quantile(p, df).unwrap();
            assert!((q - expected).abs() < 1e-5, "df={df}, p={p}: got {q}");
        }
    }

    #[test]
    fn test_chi_squared_quantile_large_freedom() {
        let q = chi_squared_quantile(0.95, 999.0).unwrap();
        assert!((q - 1073.642651).abs() < 1e-4, "got {q}");

        let distribution = chi_squared(999.0).unwrap();
        assert!((distribution.cdf(q) - 0.95).abs() < 1e-10);
    }

    #[test]
    fn test_chi_squared_quantile_limits() {
        assert_eq!(chi_squared_quantile(0.0, 5.0).unwrap(), 0.0);
        assert_eq!(chi_squared_quantile(1.0, 5.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_chi_squared_rejects_zero_freedom() {
        assert!(chi_squared(0.0).is_err());
    }

    #[test]
    fn test_ks_distances_uniform_grid() {
        // Midpoints of 4 equal cells: every step misses the CDF by 1/8
        let (d_plus, d_minus) = ks_uniform_distances(&[0.125, 0.375, 0.625, 0.875]);
        assert!((d_plus - 0.125).abs() < 1e-12);
        assert!((d_minus - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_ks_distances_clamp_outside_support() {
        let (d_plus, d_minus) = ks_uniform_distances(&[-1.0, 2.0]);
        assert!((d_plus - 0.5).abs() < 1e-12);
        assert!((d_minus - 0.5).abs() < 1e-12);
    }
}
