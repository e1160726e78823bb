//! Variance-ratio test of the random-walk hypothesis.
//!
//! For a level series `a_0..a_{n-1}` with increments `d_t = a_t - a_{t-1}`, the
//! ratio compares the variance of `lag`-period increments with `lag` times the
//! variance of one-period increments:
//!
//! ```text
//! μ     = Σ d_t / n
//! b     = Σ (d_t - μ)² / (n - 1)
//! m     = (n - q + 1) (1 - q / n)
//! t     = Σ_{i>=q} (a_i - a_{i-q} - q μ)² / m
//! VR(q) = t / (q b)
//! ```
//!
//! Under a random walk `VR(q) ≈ 1`. The z-score uses either the homoskedastic
//! asymptotic variance or the Lo–MacKinlay heteroskedasticity-consistent one,
//! and the p-value is two-sided.

use tracing::debug;

use crate::domain::{Correction, VarianceRatio};
use crate::error::StatError;
use crate::math::two_sided_p;

/// Variance ratio of `series` at `lag`.
pub fn vratio(series: &[f64], lag: usize, correction: Correction) -> Result<VarianceRatio, StatError> {
    if lag < 2 {
        return Err(StatError::invalid(format!("lag must be >= 2, got {lag}")));
    }
    let n = series.len();
    if n <= lag {
        return Err(StatError::invalid(format!(
            "series of length {n} is too short for lag {lag}"
        )));
    }
    if let Some(idx) = series.iter().position(|v| !v.is_finite()) {
        return Err(StatError::invalid(format!(
            "series has a non-finite value at index {idx}"
        )));
    }

    let n_f = n as f64;
    let q = lag as f64;

    let increments: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let mu = increments.iter().sum::<f64>() / n_f;
    let dev: Vec<f64> = increments.iter().map(|d| d - mu).collect();
    let sum_sq: f64 = dev.iter().map(|e| e * e).sum();
    if !(sum_sq > 0.0) {
        return Err(StatError::invalid("series increments have zero variance"));
    }

    let b = sum_sq / (n_f - 1.0);
    let m = (n_f - q + 1.0) * (1.0 - q / n_f);
    let t = series[lag..]
        .iter()
        .zip(series)
        .map(|(hi, lo)| (hi - lo - q * mu).powi(2))
        .sum::<f64>()
        / m;
    let ratio = t / (q * b);

    let variance = match correction {
        Correction::Homoskedastic => 2.0 * (2.0 * q - 1.0) * (q - 1.0) / (3.0 * q * n_f),
        Correction::Heteroskedastic => (1..lag)
            .map(|j| {
                let weight = 2.0 * (q - j as f64) / q;
                let delta = dev[j..]
                    .iter()
                    .zip(&dev)
                    .map(|(now, then)| now * now * then * then)
                    .sum::<f64>()
                    / (sum_sq * sum_sq);
                weight * weight * delta
            })
            .sum(),
    };
    if !(variance.is_finite() && variance > 0.0) {
        return Err(StatError::invalid(
            "variance-ratio asymptotic variance is degenerate for this series",
        ));
    }

    let z_score = (ratio - 1.0) / variance.sqrt();
    let p_value = two_sided_p(z_score);

    debug!(
        lag,
        correction = correction.display_name(),
        n,
        ratio,
        z_score,
        p_value,
        "variance ratio"
    );

    Ok(VarianceRatio {
        lag,
        correction,
        n_obs: n,
        ratio,
        variance,
        z_score,
        p_value,
    })
}

/// Variance ratios of `series` at each of `lags`, in the given order.
pub fn vratio_profile(
    series: &[f64],
    lags: &[usize],
    correction: Correction,
) -> Result<Vec<VarianceRatio>, StatError> {
    if lags.is_empty() {
        return Err(StatError::invalid("at least one lag is required"));
    }
    lags.iter()
        .map(|&lag| vratio(series, lag, correction))
        .collect()
}
