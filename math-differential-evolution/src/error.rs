//! Error types for the Differential Evolution optimizer.
//!
//! Precondition violations are reported before any objective evaluation and
//! are never retried. Failures of the residual functor itself are not errors:
//! the optimizer converts them into a rejection sentinel.

use math_carto_matrix::MatrixError;
use thiserror::Error;

/// Errors that can occur during Differential Evolution optimization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DEError {
    /// The bound vectors disagree on the problem dimension.
    #[error("lower bounds have {lower_len} entries but upper bounds have {upper_len}")]
    BoundsMismatch {
        /// Entries in `lower`
        lower_len: usize,
        /// Entries in `upper`
        upper_len: usize,
    },

    /// An interval is empty or has a NaN end point.
    #[error("bound {index} is not an interval: [{lower}, {upper}]")]
    InvalidBounds {
        /// Variable index
        index: usize,
        /// Lower end
        lower: f64,
        /// Upper end
        upper: f64,
    },

    /// Population is too small for the dimension or the mutation strategy.
    #[error("population size ({population}) must be >= {required}")]
    InsufficientPopulation {
        /// The configured population size
        population: usize,
        /// Smallest admissible population
        required: usize,
    },

    /// Mutation factor is out of valid range [0, 2].
    #[error("invalid mutation factor: {factor} (must be in [0, 2])")]
    InvalidMutationFactor {
        /// The invalid mutation factor
        factor: f64,
    },

    /// Crossover rate is out of valid range [0, 1].
    #[error("invalid crossover rate: {rate} (must be in [0, 1])")]
    InvalidCrossoverRate {
        /// The invalid crossover rate
        rate: f64,
    },

    /// Initial guess (x0) has wrong dimension.
    #[error("x0 dimension mismatch: expected {expected}, got {got}")]
    X0DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        got: usize,
    },

    /// Strategy name not recognised by `Strategy::from_str`.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Control mode name not recognised by `AdaptiveControl::from_str`.
    #[error("unknown adaptive control: {0}")]
    UnknownControl(String),

    /// The weight matrix cannot be applied to the residual vector.
    #[error("weight matrix incompatible with residuals: {0}")]
    Weights(#[from] MatrixError),
}

/// A specialized `Result` type for DE operations.
pub type Result<T> = std::result::Result<T, DEError>;

impl DEError {
    /// Returns `true` if this is a bounds-related error.
    ///
    /// This includes `BoundsMismatch` and `InvalidBounds` variants.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            DEError::BoundsMismatch { .. } | DEError::InvalidBounds { .. }
        )
    }

    /// Returns `true` if this is a configuration-related error.
    ///
    /// This includes `InsufficientPopulation`, `InvalidMutationFactor`,
    /// `InvalidCrossoverRate` and the unknown strategy or control names.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DEError::InsufficientPopulation { .. }
                | DEError::InvalidMutationFactor { .. }
                | DEError::InvalidCrossoverRate { .. }
                | DEError::UnknownStrategy(_)
                | DEError::UnknownControl(_)
        )
    }

    /// Returns `true` if this is a dimension mismatch error.
    ///
    /// This includes `X0DimensionMismatch` and `Weights`.
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            DEError::X0DimensionMismatch { .. } | DEError::Weights(_)
        )
    }
}
