//! Standalone test statistics.

pub mod vratio;

pub use vratio::*;
