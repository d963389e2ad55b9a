//! Error types for numerical differentiation.

use thiserror::Error;

/// Errors raised before any function evaluation takes place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumDiffError {
    /// The variable to differentiate does not exist in the argument vector.
    #[error("variable index {index} out of range for argument of dimension {dim}")]
    VariableOutOfRange {
        /// Requested variable index
        index: usize,
        /// Dimension of the argument vector
        dim: usize,
    },

    /// The step size is zero, negative or not finite.
    #[error("invalid step size {step}")]
    InvalidStep {
        /// The offending step
        step: f64,
    },
}

/// A specialized `Result` type for differentiation.
pub type Result<T> = std::result::Result<T, NumDiffError>;
