//! Seeded synthetic data for demos and tests.
//!
//! Everything here is deterministic given the seed: the same spec always
//! produces the same dataset, which keeps selection runs reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Dataset;
use crate::error::StatError;

/// Shape of a synthetic linear-regression problem.
///
/// Features `f1..fk` are iid `N(0, 1)`. The target is
/// `intercept + Σ coefficients[j] * f(j+1) + noise_sd * N(0, 1)`; features past
/// the end of `coefficients` are pure noise.
#[derive(Debug, Clone)]
pub struct RegressionSpec {
    pub n_rows: usize,
    pub n_features: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub noise_sd: f64,
    pub seed: u64,
}

impl Default for RegressionSpec {
    /// `y = 2 * f1 + noise` with two pure-noise features.
    fn default() -> Self {
        Self {
            n_rows: 200,
            n_features: 3,
            coefficients: vec![2.0],
            intercept: 0.0,
            noise_sd: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegressionSample {
    pub dataset: Dataset,
    pub target: Vec<f64>,
}

pub fn regression_sample(spec: &RegressionSpec) -> Result<RegressionSample, StatError> {
    if spec.n_rows == 0 {
        return Err(StatError::invalid("sample row count must be > 0"));
    }
    if spec.n_features == 0 {
        return Err(StatError::invalid("sample feature count must be > 0"));
    }
    if spec.coefficients.len() > spec.n_features {
        return Err(StatError::invalid(format!(
            "{} coefficients given for {} features",
            spec.coefficients.len(),
            spec.n_features
        )));
    }
    if !(spec.noise_sd.is_finite() && spec.noise_sd >= 0.0) {
        return Err(StatError::invalid("noise standard deviation must be finite and >= 0"));
    }
    if !spec.intercept.is_finite() || spec.coefficients.iter().any(|c| !c.is_finite()) {
        return Err(StatError::invalid("sample coefficients must be finite"));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| StatError::invalid(format!("noise distribution error: {e}")))?;

    let mut columns = vec![Vec::with_capacity(spec.n_rows); spec.n_features];
    let mut target = Vec::with_capacity(spec.n_rows);

    for _ in 0..spec.n_rows {
        let mut y = spec.intercept;
        for (j, column) in columns.iter_mut().enumerate() {
            let v: f64 = normal.sample(&mut rng);
            if let Some(beta) = spec.coefficients.get(j) {
                y += beta * v;
            }
            column.push(v);
        }
        let noise: f64 = normal.sample(&mut rng);
        target.push(y + spec.noise_sd * noise);
    }

    let dataset = Dataset::new(
        columns
            .into_iter()
            .enumerate()
            .map(|(j, values)| (format!("f{}", j + 1), values))
            .collect(),
    )?;

    Ok(RegressionSample { dataset, target })
}

/// Gaussian random walk of `len` levels starting at 0.
pub fn random_walk(len: usize, step_sd: f64, seed: u64) -> Result<Vec<f64>, StatError> {
    if len == 0 {
        return Err(StatError::invalid("random walk length must be > 0"));
    }
    if !(step_sd.is_finite() && step_sd > 0.0) {
        return Err(StatError::invalid("random walk step size must be finite and > 0"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, step_sd)
        .map_err(|e| StatError::invalid(format!("step distribution error: {e}")))?;

    let mut level = 0.0;
    let mut out = Vec::with_capacity(len);
    out.push(level);
    for _ in 1..len {
        let step: f64 = normal.sample(&mut rng);
        level += step;
        out.push(level);
    }
    Ok(out)
}
