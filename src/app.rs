//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - loads CSV data or generates synthetic samples
//! - runs stepwise selection or variance-ratio tests
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DemoArgs, SelectArgs, ThresholdArgs, VratioArgs};
use crate::data::{RegressionSpec, random_walk, regression_sample};
use crate::domain::Correction;
use crate::error::AppError;
use crate::report::{format_dataset_summary, format_row_errors, format_selection_summary, format_step_event, format_vratio_table};
use crate::select::{StepwiseConfig, StepwiseSelector};
use crate::stats::vratio_profile;

pub mod pipeline;

/// Random-walk length used by `stepreg demo`.
const DEMO_WALK_LEN: usize = 1000;

/// Lags tested by `stepreg demo`.
const DEMO_LAGS: [usize; 2] = [2, 4];

/// Entry point for the `stepreg` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Select(args) => handle_select(args),
        Command::Vratio(args) => handle_vratio(args),
        Command::Demo(args) => handle_demo(args),
    }
}

/// Log to stderr when `-v` is given or `RUST_LOG` is set.
fn init_tracing(verbose: bool) {
    if !verbose && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env()
    };
    // A second init (e.g. from tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    let run = select_run_from_args(&args);
    let quiet = args.quiet;

    let output = pipeline::run_select(&run, &mut |event| {
        if !quiet {
            println!("{}", format_step_event(event));
        }
    })?;

    if !quiet {
        print!("{}", format_dataset_summary(&output.loaded));
    }
    println!("{}", format_selection_summary(&output.outcome));

    if let Some(path) = &args.export {
        crate::io::export::write_selection_json(path, &run.target, &run.stepwise, &output.outcome)?;
        info!(path = %path.display(), "wrote selection JSON");
    }

    Ok(())
}

fn handle_vratio(args: VratioArgs) -> Result<(), AppError> {
    let run = pipeline::VratioRun {
        csv_path: args.csv,
        column: args.column,
        lags: args.lag,
        correction: args.correction,
    };
    let output = pipeline::run_vratio(&run)?;

    print!("{}", format_row_errors(&output.loaded.row_errors));
    print!("{}", format_vratio_table(&output.results));
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let spec = RegressionSpec {
        n_rows: args.rows,
        noise_sd: args.noise,
        seed: args.seed,
        ..RegressionSpec::default()
    };
    let sample = regression_sample(&spec)?;
    println!(
        "Synthetic regression: y = 2 * f1 + noise (sd {}), {} rows, seed {}",
        spec.noise_sd, spec.n_rows, spec.seed
    );

    let selector = StepwiseSelector::new(stepwise_config_from_args(&args.thresholds))?;
    let mut print_step = |event: &crate::domain::StepEvent| println!("{}", format_step_event(event));
    let outcome = selector.select_with_observer("demo", &sample.dataset, &sample.target, &[], &mut print_step)?;
    println!("{}", format_selection_summary(&outcome));

    let walk = random_walk(DEMO_WALK_LEN, 1.0, args.seed)?;
    println!("Synthetic random walk: {DEMO_WALK_LEN} steps, seed {}", args.seed);
    for correction in [Correction::Homoskedastic, Correction::Heteroskedastic] {
        let results = vratio_profile(&walk, &DEMO_LAGS, correction)?;
        print!("{}", format_vratio_table(&results));
    }
    Ok(())
}

fn select_run_from_args(args: &SelectArgs) -> pipeline::SelectRun {
    pipeline::SelectRun {
        csv_path: args.csv.clone(),
        target: args.target.clone(),
        features: args.features.clone(),
        initial: args.initial.clone(),
        name: args.name.clone(),
        stepwise: stepwise_config_from_args(&args.thresholds),
    }
}

pub fn stepwise_config_from_args(args: &ThresholdArgs) -> StepwiseConfig {
    StepwiseConfig {
        threshold_in: args.threshold_in,
        threshold_out: args.threshold_out,
        max_iterations: args.max_iterations,
        parallel: !args.sequential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    #[test]
    fn threshold_flags_map_to_config() {
        let cli = Cli::parse_from([
            "stepreg",
            "demo",
            "--threshold-in",
            "0.01",
            "--threshold-out",
            "0.2",
            "--max-iterations",
            "7",
            "--sequential",
        ]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        let config = stepwise_config_from_args(&args.thresholds);
        assert_eq!(
            config,
            StepwiseConfig {
                threshold_in: 0.01,
                threshold_out: 0.2,
                max_iterations: Some(7),
                parallel: false,
            }
        );
    }

    #[test]
    fn invalid_thresholds_exit_with_code_2() {
        let cli = Cli::parse_from(["stepreg", "demo", "--threshold-in", "1.5"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        let err = handle_demo(args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
