//! Shared workflows used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core steps:
//! CSV ingest -> stepwise selection, and CSV ingest -> variance ratios.
//! The subcommand handlers then only deal with presentation.

use std::path::PathBuf;

use crate::domain::{Correction, SelectionOutcome, StepEvent, VarianceRatio};
use crate::error::AppError;
use crate::io::ingest::{LoadedDataset, LoadedSeries, load_dataset, load_series};
use crate::select::{StepObserver, StepwiseConfig, StepwiseSelector};
use crate::stats::vratio_profile;

/// A stepwise run as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct SelectRun {
    pub csv_path: PathBuf,
    pub target: String,
    pub features: Option<Vec<String>>,
    pub initial: Vec<String>,
    pub name: String,
    pub stepwise: StepwiseConfig,
}

/// A variance-ratio run as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct VratioRun {
    pub csv_path: PathBuf,
    pub column: String,
    pub lags: Vec<usize>,
    pub correction: Correction,
}

/// All computed outputs of a single `stepreg select` run.
#[derive(Debug, Clone)]
pub struct SelectOutput {
    pub loaded: LoadedDataset,
    pub outcome: SelectionOutcome,
}

#[derive(Debug, Clone)]
pub struct VratioOutput {
    pub loaded: LoadedSeries,
    pub results: Vec<VarianceRatio>,
}

/// Load the CSV and run stepwise selection, streaming steps to `on_step`.
pub fn run_select(run: &SelectRun, on_step: &mut dyn FnMut(&StepEvent)) -> Result<SelectOutput, AppError> {
    let loaded = load_dataset(&run.csv_path, &run.target, run.features.as_deref())?;
    let selector = StepwiseSelector::new(run.stepwise.clone())?;

    let mut observer = |event: &StepEvent| on_step(event);
    let outcome = selector.select_with_observer(
        &run.name,
        &loaded.dataset,
        &loaded.target,
        &run.initial,
        &mut observer as &mut dyn StepObserver,
    )?;

    Ok(SelectOutput { loaded, outcome })
}

/// Load the CSV column and compute the variance ratio at every lag.
pub fn run_vratio(run: &VratioRun) -> Result<VratioOutput, AppError> {
    let loaded = load_series(&run.csv_path, &run.column)?;
    let results = vratio_profile(&loaded.values, &run.lags, run.correction)?;
    Ok(VratioOutput { loaded, results })
}
