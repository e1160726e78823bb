//! Ordinary least squares with coefficient inference.
//!
//! The stepwise selector fits many small regressions of the form
//!
//! ```text
//! y = β0 + β1 x1 + ... + βk xk + ε
//! ```
//!
//! and only ever looks at their coefficient p-values and R². This module owns
//! that fit.
//!
//! Implementation choices:
//! - We solve with an SVD of the design matrix. It handles tall matrices
//!   directly and hands us the singular values needed for the rank check.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Rank deficiency is an error, never a pseudo-inverse fallback: a silently
//!   regularised fit would produce p-values that mislead the selector.
//! - `(XᵀX)⁻¹ = V Σ⁻² Vᵀ`, so standard errors come from the same decomposition.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::domain::{Coefficient, Dataset, INTERCEPT, OlsFit};
use crate::error::StatError;

/// Singular values at or below `RANK_TOL * σ_max` count as zero.
const RANK_TOL: f64 = 1e-10;

/// Least-squares solution plus the diagonal of `(XᵀX)⁻¹`.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    pub xtx_inv_diag: Vec<f64>,
}

/// Solve a full-rank least squares problem using SVD.
///
/// Returns `None` if `x` is rank deficient (or not finite).
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquares> {
    let k = x.ncols();
    if k == 0 || x.nrows() < k {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma = &svd.singular_values;
    let sigma_max = sigma.iter().copied().fold(0.0_f64, f64::max);
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }
    let cutoff = RANK_TOL * sigma_max;
    if sigma.iter().any(|&s| !(s > cutoff)) {
        return None;
    }

    let beta = svd.solve(y, cutoff).ok()?;
    if !beta.iter().all(|v| v.is_finite()) {
        return None;
    }

    // diag(V Σ⁻² Vᵀ)_j = Σ_i v_t[i, j]² / σ_i²
    let v_t = svd.v_t.as_ref()?;
    let xtx_inv_diag = (0..k)
        .map(|j| {
            (0..sigma.len())
                .map(|i| {
                    let v = v_t[(i, j)];
                    v * v / (sigma[i] * sigma[i])
                })
                .sum()
        })
        .collect();

    Some(LeastSquares { beta, xtx_inv_diag })
}

/// Fit `y` on the named `features` of `x`, optionally with an intercept.
///
/// The intercept, when requested, is the first coefficient and is named
/// [`INTERCEPT`].
pub fn fit_ols(
    x: &Dataset,
    features: &[String],
    y: &[f64],
    add_intercept: bool,
) -> Result<OlsFit, StatError> {
    let n = x.n_rows();
    if y.len() != n {
        return Err(StatError::invalid(format!(
            "target has {} rows, dataset has {n}",
            y.len()
        )));
    }

    let mut names = Vec::with_capacity(features.len() + 1);
    let mut columns = Vec::with_capacity(features.len());
    if add_intercept {
        names.push(INTERCEPT.to_string());
    }
    for feature in features {
        let column = x
            .column(feature)
            .ok_or_else(|| StatError::invalid(format!("unknown feature `{feature}`")))?;
        names.push(feature.clone());
        columns.push(column);
    }

    let k = names.len();
    if k == 0 {
        return Err(StatError::invalid("no regressors to fit"));
    }
    if n <= k {
        return Err(StatError::fit(format!(
            "{n} observations cannot identify {k} parameters with residual degrees of freedom"
        )));
    }

    let offset = usize::from(add_intercept);
    let design = DMatrix::from_fn(n, k, |i, j| {
        if j < offset { 1.0 } else { columns[j - offset][i] }
    });
    let target = DVector::from_column_slice(y);

    let solution = solve_least_squares(&design, &target).ok_or_else(|| {
        StatError::fit(format!(
            "design matrix [{}] is rank deficient",
            names.join(", ")
        ))
    })?;

    let residuals = &target - &design * &solution.beta;
    let sse = residuals.norm_squared();
    let df_resid = n - k;
    let sigma2 = sse / df_resid as f64;

    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| StatError::fit(format!("Student-t distribution error: {e}")))?;

    let coefficients = names
        .into_iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = solution.beta[j];
            let std_error = (sigma2 * solution.xtx_inv_diag[j]).sqrt();
            let (t_value, p_value) = if std_error > 0.0 {
                let t = estimate / std_error;
                (t, (2.0 * t_dist.sf(t.abs())).min(1.0))
            } else if estimate == 0.0 {
                // Exact fit with a zero coefficient: nothing to reject.
                (0.0, 1.0)
            } else {
                (estimate.signum() * f64::INFINITY, 0.0)
            };
            Coefficient {
                name,
                estimate,
                std_error,
                t_value,
                p_value,
            }
        })
        .collect();

    let n_f = n as f64;
    let (tss, df_total) = if add_intercept {
        let mean = y.iter().sum::<f64>() / n_f;
        (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>(), n_f - 1.0)
    } else {
        (y.iter().map(|v| v * v).sum::<f64>(), n_f)
    };
    let r_squared = if tss > 0.0 { 1.0 - sse / tss } else { 0.0 };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * df_total / df_resid as f64;

    let log_likelihood = -0.5 * n_f * ((2.0 * std::f64::consts::PI).ln() + (sse / n_f).ln() + 1.0);
    let k_f = k as f64;

    Ok(OlsFit {
        coefficients,
        r_squared,
        adj_r_squared,
        sse,
        n_obs: n,
        df_resid,
        log_likelihood,
        aic: -2.0 * log_likelihood + 2.0 * k_f,
        bic: -2.0 * log_likelihood + k_f * n_f.ln(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(cols: &[(&str, &[f64])]) -> Dataset {
        Dataset::new(
            cols.iter()
                .map(|(name, values)| (name.to_string(), values.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let ls = solve_least_squares(&x, &y).unwrap();
        assert!((ls.beta[0] - 2.0).abs() < 1e-10);
        assert!((ls.beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_rejects_collinear_columns() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }

    #[test]
    fn simple_regression_matches_textbook_inference() {
        // y = 2.2 + 0.6x, SSE = 2.4, SST = 6, df = 3.
        let ds = dataset(&[("x", &[1.0, 2.0, 3.0, 4.0, 5.0])]);
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];

        let fit = fit_ols(&ds, &names(&["x"]), &y, true).unwrap();
        assert_eq!(fit.coefficients[0].name, INTERCEPT);
        assert_eq!(fit.df_resid, 3);

        assert!((fit.estimate(INTERCEPT).unwrap() - 2.2).abs() < 1e-10);
        assert!((fit.estimate("x").unwrap() - 0.6).abs() < 1e-10);
        assert!((fit.sse - 2.4).abs() < 1e-10);
        assert!((fit.r_squared - 0.6).abs() < 1e-10);
        assert!((fit.adj_r_squared - (1.0 - 0.4 * 4.0 / 3.0)).abs() < 1e-10);

        let slope = fit.coefficient("x").unwrap();
        assert!((slope.std_error - (0.08f64).sqrt()).abs() < 1e-10);
        assert!((slope.t_value - 0.6 / (0.08f64).sqrt()).abs() < 1e-9);
        // Closed form for df = 3: p = 0.124026...
        assert!((slope.p_value - 0.124026).abs() < 1e-4, "p={}", slope.p_value);

        let intercept = fit.coefficient(INTERCEPT).unwrap();
        assert!((intercept.std_error - (0.88f64).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn intercept_only_fit_is_the_mean() {
        let ds = dataset(&[("x", &[1.0, 2.0, 3.0, 4.0])]);
        let y = [1.0, 3.0, 5.0, 7.0];

        let fit = fit_ols(&ds, &[], &y, true).unwrap();
        assert_eq!(fit.coefficients.len(), 1);
        assert!((fit.estimate(INTERCEPT).unwrap() - 4.0).abs() < 1e-12);
        assert!(fit.r_squared.abs() < 1e-12);
        assert_eq!(fit.feature_coefficients().count(), 0);
    }

    #[test]
    fn exact_fit_has_zero_p_values() {
        let ds = dataset(&[("x", &[0.0, 1.0, 2.0, 3.0])]);
        let y = [2.0, 5.0, 8.0, 11.0];

        let fit = fit_ols(&ds, &names(&["x"]), &y, true).unwrap();
        assert!((fit.estimate("x").unwrap() - 3.0).abs() < 1e-10);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.p_value("x").unwrap() < 1e-6);
    }

    #[test]
    fn without_intercept_uses_uncentered_r_squared() {
        let ds = dataset(&[("x", &[1.0, 2.0, 3.0])]);
        let y = [2.0, 4.0, 6.0];

        let fit = fit_ols(&ds, &names(&["x"]), &y, false).unwrap();
        assert!(fit.coefficient(INTERCEPT).is_none());
        assert!((fit.estimate("x").unwrap() - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn collinear_features_are_a_fit_failure() {
        let ds = dataset(&[
            ("a", &[1.0, 2.0, 3.0, 4.0, 5.0]),
            ("b", &[2.0, 4.0, 6.0, 8.0, 10.0]),
        ]);
        let y = [1.0, 0.0, 2.0, 1.0, 3.0];

        let err = fit_ols(&ds, &names(&["a", "b"]), &y, true).unwrap_err();
        assert!(matches!(err, StatError::FitFailure(_)), "{err}");
    }

    #[test]
    fn too_few_observations_is_a_fit_failure() {
        let ds = dataset(&[("a", &[1.0, 2.0]), ("b", &[0.0, 5.0])]);
        let y = [1.0, 2.0];

        let err = fit_ols(&ds, &names(&["a"]), &y, true).unwrap_err();
        assert!(matches!(err, StatError::FitFailure(_)));
    }

    #[test]
    fn bad_arguments_are_invalid_input() {
        let ds = dataset(&[("a", &[1.0, 2.0, 3.0])]);
        assert!(matches!(
            fit_ols(&ds, &names(&["zz"]), &[1.0, 2.0, 3.0], true),
            Err(StatError::InvalidInput(_))
        ));
        assert!(matches!(
            fit_ols(&ds, &names(&["a"]), &[1.0, 2.0], true),
            Err(StatError::InvalidInput(_))
        ));
        assert!(matches!(
            fit_ols(&ds, &[], &[1.0, 2.0, 3.0], false),
            Err(StatError::InvalidInput(_))
        ));
    }

    #[test]
    fn information_criteria_follow_gaussian_likelihood() {
        let ds = dataset(&[("x", &[1.0, 2.0, 3.0, 4.0, 5.0])]);
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = fit_ols(&ds, &names(&["x"]), &y, true).unwrap();

        let n: f64 = 5.0;
        let llf = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (2.4 / n).ln() + 1.0);
        assert!((fit.log_likelihood - llf).abs() < 1e-10);
        assert!((fit.aic - (-2.0 * llf + 4.0)).abs() < 1e-10);
        assert!((fit.bic - (-2.0 * llf + 2.0 * n.ln())).abs() < 1e-10);
    }
}
