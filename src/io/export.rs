//! Export a stepwise run to JSON.
//!
//! The export is the portable record of a run: thresholds, the selected
//! features, the final fit and the Add/Drop trace.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::SelectionOutcome;
use crate::error::AppError;
use crate::select::StepwiseConfig;

/// On-disk representation of a stepwise run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionFile {
    pub tool: String,
    pub generated: DateTime<Local>,
    pub target: String,
    pub threshold_in: f64,
    pub threshold_out: f64,
    pub max_iterations: Option<usize>,
    pub outcome: SelectionOutcome,
}

impl SelectionFile {
    pub fn new(target: &str, config: &StepwiseConfig, outcome: &SelectionOutcome) -> Self {
        Self {
            tool: "stepreg".to_string(),
            generated: Local::now(),
            target: target.to_string(),
            threshold_in: config.threshold_in,
            threshold_out: config.threshold_out,
            max_iterations: config.max_iterations,
            outcome: outcome.clone(),
        }
    }
}

/// Write a selection JSON file.
pub fn write_selection_json(
    path: &Path,
    target: &str,
    config: &StepwiseConfig,
    outcome: &SelectionOutcome,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create selection JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &SelectionFile::new(target, config, outcome))
        .map_err(|e| AppError::new(2, format!("Failed to write selection JSON: {e}")))?;

    Ok(())
}

/// Read a selection JSON file.
pub fn read_selection_json(path: &Path) -> Result<SelectionFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open selection JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid selection JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{RegressionSpec, regression_sample};
    use crate::select::select;

    #[test]
    fn selection_json_round_trips_the_outcome() {
        let sample = regression_sample(&RegressionSpec::default()).unwrap();
        let outcome = select(&sample.dataset, &sample.target, &[], 0.05, 0.1).unwrap();
        let config = StepwiseConfig::default();

        let path = std::env::temp_dir().join(format!("stepreg_export_{}.json", std::process::id()));
        write_selection_json(&path, "y", &config, &outcome).unwrap();
        let back = read_selection_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.tool, "stepreg");
        assert_eq!(back.target, "y");
        assert_eq!(back.threshold_in, 0.05);
        assert_eq!(back.outcome.included, outcome.included);
        assert_eq!(back.outcome.trace.len(), outcome.trace.len());
    }
}
