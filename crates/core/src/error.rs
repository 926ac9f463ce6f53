//! Error types for the analytics core.
//!
//! Callers need to distinguish "the input was unusable" from "the
//! computation could not finish" from "the configuration was wrong",
//! so each gets its own variant rather than a single opaque error.

use thiserror::Error;

/// Errors produced by the calculators and the compliance checker.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input data is malformed or insufficient (too few points,
    /// non-positive prices, misaligned dates, missing OHLC fields).
    /// Raised before any computation begins.
    #[error("validation error: {0}")]
    Validation(String),

    /// A numeric computation failed to complete (solver
    /// non-convergence, singular matrix). The message carries the
    /// underlying diagnostic.
    #[error("computation error: {0}")]
    Computation(String),

    /// A configuration value is out of range or a required field is
    /// missing (e.g. Black-Litterman without views).
    #[error("configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Builds a validation error from anything displayable.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Builds a computation error from anything displayable.
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Builds a configuration error from anything displayable.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_are_distinguishable() {
        let v = AnalysisError::validation("need 31 prices, got 10");
        let c = AnalysisError::computation("solver did not converge");
        let k = AnalysisError::config("confidence_level out of range");

        assert!(matches!(v, AnalysisError::Validation(_)));
        assert!(matches!(c, AnalysisError::Computation(_)));
        assert!(matches!(k, AnalysisError::Config(_)));
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = AnalysisError::validation("need 31 prices, got 10");
        assert_eq!(
            err.to_string(),
            "validation error: need 31 prices, got 10"
        );
    }
}
