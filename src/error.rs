//! Error types.
//!
//! - `StatError` is what the library returns. Every variant is terminal for the
//!   call in progress: there is no partial result and no retry.
//! - `AppError` is what the binary returns. It carries the process exit code.

use thiserror::Error;

/// Library-level failure of a selection, fit or statistic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    /// Malformed arguments: mismatched lengths, out-of-range thresholds,
    /// unknown feature names, degenerate series.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The least-squares collaborator could not produce a solution
    /// (rank-deficient design, no residual degrees of freedom).
    #[error("fit failure: {0}")]
    FitFailure(String),

    /// The opt-in iteration cap of the stepwise search was reached while the
    /// feature set was still changing.
    #[error("stepwise selection did not converge within {limit} iterations")]
    NotConverged { limit: usize },
}

impl StatError {
    pub fn invalid(message: impl Into<String>) -> Self {
        StatError::InvalidInput(message.into())
    }

    pub fn fit(message: impl Into<String>) -> Self {
        StatError::FitFailure(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<StatError> for AppError {
    fn from(err: StatError) -> Self {
        let exit_code = match err {
            StatError::InvalidInput(_) => 2,
            StatError::FitFailure(_) | StatError::NotConverged { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_errors_map_to_exit_codes() {
        let invalid: AppError = StatError::invalid("lag must be >= 2").into();
        assert_eq!(invalid.exit_code(), 2);
        assert!(invalid.to_string().contains("lag must be >= 2"));

        let fit: AppError = StatError::fit("singular").into();
        assert_eq!(fit.exit_code(), 4);

        let cap: AppError = StatError::NotConverged { limit: 7 }.into();
        assert_eq!(cap.exit_code(), 4);
        assert!(cap.to_string().contains('7'));
    }
}
