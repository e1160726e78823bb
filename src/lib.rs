//! `stepreg` library crate.
//!
//! Two independent statistical utilities:
//!
//! - forward-backward stepwise OLS feature selection driven by p-values
//!   (`select`, on top of `math::fit_ols`)
//! - the Lo-MacKinlay variance-ratio random-walk test (`stats::vratio`)
//!
//! The binary (`stepreg`) is a thin wrapper around this library so the core
//! logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod select;
pub mod stats;
