//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the selection/statistics code stays free of printing
//! - output changes are localized (important for snapshot-style tests)

use crate::domain::{Coefficient, SelectionOutcome, StepEvent, VarianceRatio};
use crate::io::ingest::{LoadedDataset, RowError};

/// Maximum number of skipped rows listed individually.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// One line per Add/Drop, e.g.
/// `Iteration 1\tAdd  f1                             with p-value 1.2e-40\tR-Squared=0.801234`.
pub fn format_step_event(event: &StepEvent) -> String {
    format!(
        "Iteration {}\t{:<4} {:<30} with p-value {:.6}\tR-Squared={:.6}",
        event.step,
        event.action.label(),
        event.feature,
        event.p_value,
        event.r_squared
    )
}

/// Summary banner printed after a run converges.
pub fn format_selection_summary(outcome: &SelectionOutcome) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&"====".repeat(20));
    out.push('\n');
    out.push_str(&format!("{} results:\n", outcome.name));
    out.push_str(&format!(
        "Selected variables: [{}]\n",
        outcome.included.iter().collect::<Vec<_>>().join(", ")
    ));
    out.push_str(&format!("R-Squared = {}\n", outcome.r_squared));
    out.push_str(&format!(
        "Adj. R-Squared = {:.6} | AIC = {:.3} | BIC = {:.3} | n = {} | passes = {}\n",
        outcome.fit.adj_r_squared,
        outcome.fit.aic,
        outcome.fit.bic,
        outcome.fit.n_obs,
        outcome.iterations
    ));

    out.push('\n');
    out.push_str(&format_coefficients(&outcome.fit.coefficients));
    out
}

/// Coefficient table (estimate, standard error, t, p).
pub fn format_coefficients(coefficients: &[Coefficient]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<30} {:>12} {:>12} {:>9} {:>10}\n",
        "term", "coef", "std err", "t", "P>|t|"
    ));
    for c in coefficients {
        out.push_str(&format!(
            "{:<30} {:>12.6} {:>12.6} {:>9.3} {:>10.4}\n",
            c.name, c.estimate, c.std_error, c.t_value, c.p_value
        ));
    }
    out
}

/// Header describing what was loaded and what was skipped.
pub fn format_dataset_summary(loaded: &LoadedDataset) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Target: {} | candidates: {} | rows used: {}/{}\n",
        loaded.target_name,
        loaded.dataset.n_features(),
        loaded.dataset.n_rows(),
        loaded.rows_read
    ));
    out.push_str(&format_row_errors(&loaded.row_errors));
    out
}

pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    if errors.is_empty() {
        return out;
    }
    out.push_str(&format!("Skipped rows: {}\n", errors.len()));
    for e in errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!("  ... {} more\n", errors.len() - MAX_ROW_ERRORS_SHOWN));
    }
    out
}

/// One line per lag.
pub fn format_vratio_table(results: &[VarianceRatio]) -> String {
    let mut out = String::new();
    if let Some(first) = results.first() {
        out.push_str(&format!(
            "Variance ratio ({}, n={})\n",
            first.correction.display_name(),
            first.n_obs
        ));
    }
    out.push_str(&format!(
        "{:>5} {:>10} {:>10} {:>10}\n",
        "lag", "ratio", "z", "p-value"
    ));
    for vr in results {
        out.push_str(&format!(
            "{:>5} {:>10.6} {:>10.4} {:>10.6}\n",
            vr.lag, vr.ratio, vr.z_score, vr.p_value
        ));
    }
    out
}
