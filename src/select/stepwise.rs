//! Forward-backward stepwise feature selection driven by coefficient p-values.
//!
//! Each pass runs two steps against the current feature set `included`:
//!
//! 1. **Forward**: fit `included ∪ {c}` + intercept for every excluded
//!    feature `c`. The candidate with the smallest p-value on its own
//!    coefficient enters if that p-value is `< threshold_in`.
//! 2. **Backward**: fit `included` + intercept. The feature with the largest
//!    p-value leaves if that p-value is `> threshold_out`.
//!
//! The search stops after the first pass that changes nothing. The backward fit
//! of that pass was made on the final feature set, so it is the final fit.
//!
//! Determinism rules:
//! - candidates are enumerated in dataset column order and ties on the
//!   minimum p-value go to the earliest column
//! - ties on the maximum p-value go to the earliest position in `included`
//! - parallel candidate fits are collected in candidate order before reducing,
//!   so parallel and sequential runs return identical outcomes

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::domain::{Dataset, FeatureSet, OlsFit, SelectionOutcome, StepAction, StepEvent};
use crate::error::StatError;
use crate::math::fit_ols;
use crate::select::observer::{NoopObserver, StepObserver};

/// Run name used when the caller does not provide one.
pub const DEFAULT_RUN_NAME: &str = "mdl";

/// Thresholds and guards for a stepwise run.
#[derive(Debug, Clone, PartialEq)]
pub struct StepwiseConfig {
    /// A candidate enters if its p-value is strictly below this.
    ///
    /// `0.0` disables additions.
    pub threshold_in: f64,
    /// An included feature leaves if its p-value is strictly above this.
    ///
    /// `1.0` disables removals.
    pub threshold_out: f64,
    /// Upper bound on forward/backward passes.
    ///
    /// `None` never gives up. With inconsistent thresholds (for example
    /// `threshold_in > threshold_out`) a feature can enter and leave on every
    /// pass, and an unbounded run then never returns. A bound turns that case
    /// into `StatError::NotConverged`.
    pub max_iterations: Option<usize>,
    /// Evaluate forward-step candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for StepwiseConfig {
    fn default() -> Self {
        Self {
            threshold_in: 0.05,
            threshold_out: 0.1,
            max_iterations: None,
            parallel: true,
        }
    }
}

impl StepwiseConfig {
    pub fn validate(&self) -> Result<(), StatError> {
        check_threshold("threshold_in", self.threshold_in)?;
        check_threshold("threshold_out", self.threshold_out)?;
        if self.max_iterations == Some(0) {
            return Err(StatError::invalid("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

fn check_threshold(label: &str, value: f64) -> Result<(), StatError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(StatError::invalid(format!(
            "{label} must be within [0, 1], got {value}"
        )))
    }
}

/// Stepwise selector with validated configuration.
#[derive(Debug, Clone)]
pub struct StepwiseSelector {
    config: StepwiseConfig,
}

/// Best forward-step candidate.
#[derive(Debug, Clone)]
struct Candidate {
    feature: String,
    p_value: f64,
    r_squared: f64,
}

impl StepwiseSelector {
    pub fn new(config: StepwiseConfig) -> Result<Self, StatError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StepwiseConfig {
        &self.config
    }

    /// Run the selection starting from `initial`.
    pub fn select(
        &self,
        name: &str,
        x: &Dataset,
        y: &[f64],
        initial: &[String],
    ) -> Result<SelectionOutcome, StatError> {
        self.select_with_observer(name, x, y, initial, &mut NoopObserver)
    }

    /// Run the selection, reporting every Add/Drop to `observer`.
    pub fn select_with_observer(
        &self,
        name: &str,
        x: &Dataset,
        y: &[f64],
        initial: &[String],
        observer: &mut dyn StepObserver,
    ) -> Result<SelectionOutcome, StatError> {
        validate_target(x, y)?;
        let mut included = resolve_initial(x, initial)?;
        let mut trace_events: Vec<StepEvent> = Vec::new();
        let mut iteration = 0usize;

        loop {
            iteration += 1;
            let mut changed = false;

            if let Some(best) = self.best_candidate(x, y, &included)? {
                trace!(
                    iteration,
                    feature = %best.feature,
                    p_value = best.p_value,
                    "forward step best candidate"
                );
                if best.p_value < self.config.threshold_in {
                    included.push(best.feature.clone());
                    changed = true;
                    record(
                        &mut trace_events,
                        observer,
                        iteration,
                        StepAction::Add,
                        best.feature,
                        best.p_value,
                        best.r_squared,
                    );
                }
            }

            let fit = fit_ols(x, included.as_slice(), y, true)?;
            if let Some((worst_feature, worst_p)) = worst_feature(&fit) {
                trace!(
                    iteration,
                    feature = %worst_feature,
                    p_value = worst_p,
                    "backward step worst feature"
                );
                if worst_p > self.config.threshold_out {
                    included.remove(&worst_feature);
                    changed = true;
                    record(
                        &mut trace_events,
                        observer,
                        iteration,
                        StepAction::Drop,
                        worst_feature,
                        worst_p,
                        fit.r_squared,
                    );
                }
            }

            if !changed {
                info!(
                    run = name,
                    iterations = iteration,
                    selected = included.len(),
                    r_squared = fit.r_squared,
                    "stepwise selection converged"
                );
                return Ok(SelectionOutcome {
                    name: name.to_string(),
                    included,
                    r_squared: fit.r_squared,
                    fit,
                    iterations: iteration,
                    trace: trace_events,
                });
            }

            if let Some(limit) = self.config.max_iterations {
                if iteration >= limit {
                    return Err(StatError::NotConverged { limit });
                }
            }
        }
    }

    /// Forward step: fit every excluded feature and return the most significant.
    fn best_candidate(
        &self,
        x: &Dataset,
        y: &[f64],
        included: &FeatureSet,
    ) -> Result<Option<Candidate>, StatError> {
        let candidates: Vec<&String> = x
            .names()
            .iter()
            .filter(|name| !included.contains(name))
            .collect();

        let evaluate = |feature: &&String| -> Result<Candidate, StatError> {
            let mut features = included.as_slice().to_vec();
            features.push((*feature).clone());
            let fit = fit_ols(x, &features, y, true)?;
            let p_value = fit.p_value(feature).ok_or_else(|| {
                StatError::fit(format!("fit is missing coefficient for `{feature}`"))
            })?;
            Ok(Candidate {
                feature: (*feature).clone(),
                p_value,
                r_squared: fit.r_squared,
            })
        };

        // Collect every result before looking at errors so the reported error
        // is the first in candidate order, parallel or not.
        let results: Vec<Result<Candidate, StatError>> = if self.config.parallel {
            candidates.par_iter().map(evaluate).collect()
        } else {
            candidates.iter().map(evaluate).collect()
        };

        let mut best: Option<Candidate> = None;
        for result in results {
            let candidate = result?;
            let better = match &best {
                Some(current) => candidate.p_value < current.p_value,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        Ok(best)
    }
}

/// Convenience wrapper: default run name, unbounded iterations, parallel
/// candidate fits.
pub fn select(
    x: &Dataset,
    y: &[f64],
    initial: &[String],
    threshold_in: f64,
    threshold_out: f64,
) -> Result<SelectionOutcome, StatError> {
    let selector = StepwiseSelector::new(StepwiseConfig {
        threshold_in,
        threshold_out,
        ..StepwiseConfig::default()
    })?;
    selector.select(DEFAULT_RUN_NAME, x, y, initial)
}

fn validate_target(x: &Dataset, y: &[f64]) -> Result<(), StatError> {
    if y.is_empty() {
        return Err(StatError::invalid("target is empty"));
    }
    if y.len() != x.n_rows() {
        return Err(StatError::invalid(format!(
            "target has {} rows, dataset has {}",
            y.len(),
            x.n_rows()
        )));
    }
    if let Some(row) = y.iter().position(|v| !v.is_finite()) {
        return Err(StatError::invalid(format!(
            "target has a non-finite value at row {row}"
        )));
    }
    Ok(())
}

fn resolve_initial(x: &Dataset, initial: &[String]) -> Result<FeatureSet, StatError> {
    if let Some(unknown) = initial.iter().find(|name| x.index_of(name).is_none()) {
        return Err(StatError::invalid(format!(
            "initial feature `{unknown}` is not a dataset column"
        )));
    }
    FeatureSet::from_names(initial.iter().cloned())
}

/// Backward step: the non-intercept coefficient with the largest p-value.
fn worst_feature(fit: &OlsFit) -> Option<(String, f64)> {
    let mut worst: Option<(&str, f64)> = None;
    for c in fit.feature_coefficients() {
        let worse = match worst {
            Some((_, p)) => c.p_value > p,
            None => true,
        };
        if worse {
            worst = Some((c.name.as_str(), c.p_value));
        }
    }
    worst.map(|(name, p)| (name.to_string(), p))
}

fn record(
    events: &mut Vec<StepEvent>,
    observer: &mut dyn StepObserver,
    iteration: usize,
    action: StepAction,
    feature: String,
    p_value: f64,
    r_squared: f64,
) {
    let event = StepEvent {
        step: events.len() + 1,
        iteration,
        action,
        feature,
        p_value,
        r_squared,
    };
    debug!(
        step = event.step,
        iteration,
        action = action.label(),
        feature = %event.feature,
        p_value,
        r_squared,
        "stepwise step"
    );
    observer.on_step(&event);
    events.push(event);
}
