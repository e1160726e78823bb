//! Reporting utilities: trace lines, run summaries and statistic tables.

pub mod format;

pub use format::*;
