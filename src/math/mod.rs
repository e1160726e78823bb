//! Mathematical utilities: least squares with inference and the normal CDF.

pub mod normal;
pub mod ols;

pub use normal::*;
pub use ols::*;
