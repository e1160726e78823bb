//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the input data (`Dataset`) and the evolving model membership (`FeatureSet`)
//! - regression output (`OlsFit`, `Coefficient`)
//! - stepwise output (`SelectionOutcome`, `StepEvent`)
//! - variance-ratio output (`VarianceRatio`, `Correction`)

pub mod types;

pub use types::*;
