//! Command-line parsing for `stepreg`.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! statistics code. Flags are turned into plain config structs in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Correction;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "stepreg",
    version,
    about = "Stepwise OLS feature selection and variance-ratio tests"
)]
pub struct Cli {
    /// Log selection steps and diagnostics to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run forward-backward stepwise selection on a CSV dataset.
    Select(SelectArgs),
    /// Compute variance ratios of a CSV column.
    Vratio(VratioArgs),
    /// Run both utilities on seeded synthetic data.
    Demo(DemoArgs),
}

/// Thresholds shared by `select` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct ThresholdArgs {
    /// Add a feature if its p-value is below this.
    #[arg(long, default_value_t = 0.05)]
    pub threshold_in: f64,

    /// Drop a feature if its p-value is above this.
    #[arg(long, default_value_t = 0.1)]
    pub threshold_out: f64,

    /// Stop with an error after this many forward/backward passes
    /// (default: unbounded).
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Fit forward-step candidates one at a time instead of in parallel.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SelectArgs {
    /// Input CSV with a header row.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Target column.
    #[arg(short = 'y', long)]
    pub target: String,

    /// Candidate feature columns (default: every column except the target).
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Features included before the first step.
    #[arg(long, value_delimiter = ',')]
    pub initial: Vec<String>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Run name shown in the summary.
    #[arg(long, default_value = "mdl")]
    pub name: String,

    /// Do not print the per-step trace.
    #[arg(short, long)]
    pub quiet: bool,

    /// Export the run (thresholds, outcome, trace) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct VratioArgs {
    /// Input CSV with a header row.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Column holding the level series (e.g. log prices).
    #[arg(long)]
    pub column: String,

    /// Lag(s) to test; repeat or comma-separate for several.
    #[arg(long, value_delimiter = ',', default_value = "2")]
    pub lag: Vec<usize>,

    /// Asymptotic variance used for the z-score.
    #[arg(long, value_enum, default_value_t = Correction::Homoskedastic)]
    pub correction: Correction,
}

#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Number of synthetic observations.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub rows: usize,

    /// Random seed for the synthetic data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Noise standard deviation in `y = 2 * f1 + noise`.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_parses_lists_and_defaults() {
        let cli = Cli::parse_from([
            "stepreg",
            "select",
            "--csv",
            "data.csv",
            "-y",
            "ret",
            "--features",
            "a,b,c",
            "--initial",
            "b",
        ]);
        let Command::Select(args) = cli.command else {
            panic!("expected select");
        };
        assert_eq!(args.target, "ret");
        assert_eq!(args.features, Some(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(args.initial, vec!["b".to_string()]);
        assert_eq!(args.thresholds.threshold_in, 0.05);
        assert_eq!(args.thresholds.threshold_out, 0.1);
        assert_eq!(args.thresholds.max_iterations, None);
        assert_eq!(args.name, "mdl");
    }

    #[test]
    fn vratio_parses_lags_and_correction() {
        let cli = Cli::parse_from([
            "stepreg", "-v", "vratio", "--csv", "p.csv", "--column", "close", "--lag", "2,4",
            "--correction", "het",
        ]);
        assert!(cli.verbose);
        let Command::Vratio(args) = cli.command else {
            panic!("expected vratio");
        };
        assert_eq!(args.lag, vec![2, 4]);
        assert_eq!(args.correction, Correction::Heteroskedastic);
    }
}
