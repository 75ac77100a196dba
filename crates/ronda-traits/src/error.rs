//! Error types for the Ronda backtester.
//!
//! Every fallible operation in the workspace returns [`RondaError`]. The
//! variants separate configuration mistakes, which are caught before any
//! window is processed, from numeric failures raised while a run is in
//! progress.

use thiserror::Error;

/// The main error type for Ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// The backtest was configured with an unusable parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two registered policies report the same display name.
    #[error("Duplicate policy name: {0}")]
    DuplicatePolicy(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A covariance matrix could not be inverted.
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// Total portfolio value collapsed to zero while drifting weights.
    #[error("Degenerate portfolio: {0}")]
    DegeneratePortfolio(String),

    /// A policy failed to produce a usable weight vector.
    #[error("Policy '{policy}' failed: {message}")]
    PolicyComputation {
        /// Display name of the failing policy.
        policy: String,
        /// What went wrong.
        message: String,
    },

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;
