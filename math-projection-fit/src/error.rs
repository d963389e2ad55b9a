//! Error types for projection fitting.

use math_carto_differential_evolution::DEError;
use math_carto_matrix::MatrixError;
use math_carto_numdiff::NumDiffError;
use thiserror::Error;

use crate::projection::ProjectionError;

/// Errors raised while fitting a projection to control points.
#[derive(Debug, Error)]
pub enum FitError {
    /// A point could not be projected with the current parameters.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Too few control points to determine a similarity transform.
    #[error("at least {required} control points are needed, got {got}")]
    InsufficientPoints {
        /// Minimum number of points
        required: usize,
        /// Points supplied
        got: usize,
    },

    /// The projected points collapse onto a single location.
    #[error("degenerate configuration: {0}")]
    Degenerate(String),

    /// No projection of that name exists in the catalogue.
    #[error("unknown projection: {0}")]
    UnknownProjection(String),

    /// A configuration value was rejected.
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Optimizer precondition failure.
    #[error("optimizer: {0}")]
    Optimizer(#[from] DEError),

    /// Linear algebra failure.
    #[error("matrix: {0}")]
    Matrix(#[from] MatrixError),

    /// Numerical differentiation failure.
    #[error("derivative: {0}")]
    Derivative(#[from] NumDiffError),

    /// Configuration file could not be read.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`FitConfig`](crate::FitConfig).
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for fitting operations.
pub type Result<T> = std::result::Result<T, FitError>;

impl FitError {
    /// Returns `true` for errors caused by the input data rather than the
    /// configuration or the environment.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            FitError::Projection(_) | FitError::InsufficientPoints { .. } | FitError::Degenerate(_)
        )
    }
}
