//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during selection
//! - exported to JSON
//! - printed by the report module without reaching back into the math code

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::StatError;

/// Name of the intercept term appended by `fit_ols`.
///
/// Reserved: a dataset may not contain a feature with this name.
pub const INTERCEPT: &str = "const";

/// Ordered, named numeric feature columns of equal length.
///
/// Immutable once built; validation happens in [`Dataset::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from `(name, values)` pairs, preserving their order.
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self, StatError> {
        let Some(n_rows) = columns.first().map(|(_, values)| values.len()) else {
            return Err(StatError::invalid("dataset has no feature columns"));
        };
        if n_rows == 0 {
            return Err(StatError::invalid("dataset has no rows"));
        }

        let mut names: Vec<String> = Vec::with_capacity(columns.len());
        let mut values_out = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            if name.trim().is_empty() {
                return Err(StatError::invalid("feature names must be non-empty"));
            }
            if name == INTERCEPT {
                return Err(StatError::invalid(format!(
                    "feature name `{INTERCEPT}` is reserved for the intercept"
                )));
            }
            if names.contains(&name) {
                return Err(StatError::invalid(format!("duplicate feature name `{name}`")));
            }
            if values.len() != n_rows {
                return Err(StatError::invalid(format!(
                    "feature `{name}` has {} rows, expected {n_rows}",
                    values.len()
                )));
            }
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(StatError::invalid(format!(
                    "feature `{name}` has a non-finite value at row {row}"
                )));
            }
            names.push(name);
            values_out.push(values);
        }

        Ok(Self {
            names,
            columns: values_out,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Feature names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index_of(name).map(|idx| self.columns[idx].as_slice())
    }

    pub fn column_at(&self, idx: usize) -> Option<&[f64]> {
        self.columns.get(idx).map(Vec::as_slice)
    }
}

/// Insertion-ordered set of feature names currently in the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from names, rejecting duplicates.
    pub fn from_names<I, S>(names: I) -> Result<Self, StatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for name in names {
            let name = name.into();
            if !set.push(name.clone()) {
                return Err(StatError::invalid(format!(
                    "feature `{name}` listed more than once"
                )));
            }
        }
        Ok(set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Append `name`; returns `false` (and leaves the set unchanged) if it is
    /// already present.
    pub fn push(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Remove `name`, keeping the order of the remaining names.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.0.iter().position(|n| n == name) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// One fitted regression coefficient with its inference statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    /// Two-sided p-value of `estimate == 0` under the Student-t distribution.
    pub p_value: f64,
}

/// Output of a single ordinary-least-squares fit.
///
/// Coefficients are in design order: the intercept (if requested) first, then
/// the regressors in the order they were passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub sse: f64,
    pub n_obs: usize,
    pub df_resid: usize,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
}

impl OlsFit {
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    pub fn p_value(&self, name: &str) -> Option<f64> {
        self.coefficient(name).map(|c| c.p_value)
    }

    pub fn estimate(&self, name: &str) -> Option<f64> {
        self.coefficient(name).map(|c| c.estimate)
    }

    /// Coefficients excluding the intercept.
    pub fn feature_coefficients(&self) -> impl Iterator<Item = &Coefficient> {
        self.coefficients.iter().filter(|c| c.name != INTERCEPT)
    }
}

/// Membership change made by one stepwise step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Add,
    Drop,
}

impl StepAction {
    pub fn label(self) -> &'static str {
        match self {
            StepAction::Add => "Add",
            StepAction::Drop => "Drop",
        }
    }
}

/// A single Add/Drop decision, in the order it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Running 1-based index over all Add/Drop events of the run.
    pub step: usize,
    /// 1-based forward/backward pass in which the event happened.
    pub iteration: usize,
    pub action: StepAction,
    pub feature: String,
    pub p_value: f64,
    /// R² of the fit the decision was based on.
    pub r_squared: f64,
}

/// Final result of a stepwise run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub name: String,
    pub included: FeatureSet,
    pub r_squared: f64,
    /// Fit of the converged feature set plus intercept.
    pub fit: OlsFit,
    /// Number of forward/backward passes executed (including the final,
    /// unchanged one).
    pub iterations: usize,
    pub trace: Vec<StepEvent>,
}

/// Asymptotic-variance formula used by the variance-ratio z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    /// Homoskedastic increments.
    #[value(name = "hom")]
    Homoskedastic,
    /// Heteroskedasticity-consistent (Lo–MacKinlay).
    #[value(name = "het")]
    Heteroskedastic,
}

impl Correction {
    pub fn display_name(self) -> &'static str {
        match self {
            Correction::Homoskedastic => "homoskedastic",
            Correction::Heteroskedastic => "heteroskedastic",
        }
    }
}

/// Variance-ratio statistic for one lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRatio {
    pub lag: usize,
    pub correction: Correction,
    pub n_obs: usize,
    pub ratio: f64,
    /// Asymptotic variance of `ratio` under the random-walk null.
    pub variance: f64,
    pub z_score: f64,
    /// Two-sided normal p-value of `z_score`.
    pub p_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: &[f64]) -> (String, Vec<f64>) {
        (name.to_string(), values.to_vec())
    }

    #[test]
    fn dataset_keeps_column_order() {
        let ds = Dataset::new(vec![col("b", &[1.0, 2.0]), col("a", &[3.0, 4.0])]).unwrap();
        assert_eq!(ds.names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column("a"), Some(&[3.0, 4.0][..]));
        assert_eq!(ds.index_of("a"), Some(1));
        assert!(ds.column("c").is_none());
    }

    #[test]
    fn dataset_rejects_bad_shapes_and_names() {
        assert!(matches!(Dataset::new(vec![]), Err(StatError::InvalidInput(_))));
        assert!(Dataset::new(vec![col("a", &[])]).is_err());
        assert!(Dataset::new(vec![col("a", &[1.0]), col("b", &[1.0, 2.0])]).is_err());
        assert!(Dataset::new(vec![col("a", &[1.0]), col("a", &[2.0])]).is_err());
        assert!(Dataset::new(vec![col(INTERCEPT, &[1.0])]).is_err());
        assert!(Dataset::new(vec![col("a", &[f64::NAN])]).is_err());
    }

    #[test]
    fn feature_set_preserves_insertion_order_without_duplicates() {
        let mut set = FeatureSet::new();
        assert!(set.push("x2"));
        assert!(set.push("x1"));
        assert!(!set.push("x2"));
        assert_eq!(set.as_slice(), &["x2".to_string(), "x1".to_string()]);

        assert!(set.remove("x2"));
        assert!(!set.remove("x2"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["x1"]);

        assert!(FeatureSet::from_names(["a", "a"]).is_err());
    }

    #[test]
    fn feature_set_serializes_as_array() {
        let set = FeatureSet::from_names(["f1", "f3"]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["f1","f3"]"#);
    }
}
