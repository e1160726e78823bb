//! Stepwise feature selection.
//!
//! Responsibilities:
//!
//! - validate the run (thresholds, initial features, target)
//! - alternate forward and backward steps until nothing changes
//! - report each Add/Drop to an observer

pub mod observer;
pub mod stepwise;

pub use observer::*;
pub use stepwise::*;
