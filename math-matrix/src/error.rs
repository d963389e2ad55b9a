//! Error types for dense matrix operations.
//!
//! Every operation that can be handed incompatible operands fails fast with
//! one of these variants; nothing is ever broadcast, truncated or padded.

use thiserror::Error;

/// Errors returned by [`Matrix`](crate::Matrix) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible for the requested operation.
    #[error("dimension mismatch in {op}: left is {}x{}, right is {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        /// Name of the operation that failed
        op: &'static str,
        /// Shape (rows, cols) of the left operand
        left: (usize, usize),
        /// Shape (rows, cols) of the right operand
        right: (usize, usize),
    },

    /// A row or column index lies outside the matrix.
    #[error("{axis} index {index} out of range (extent {extent})")]
    IndexOutOfRange {
        /// "row" or "column"
        axis: &'static str,
        /// The offending index
        index: usize,
        /// Number of rows or columns available
        extent: usize,
    },

    /// A sub-block written by `replace` does not fit inside the target.
    #[error(
        "block {}x{} at ({row}, {col}) does not fit into {}x{} matrix",
        block.0, block.1, target.0, target.1
    )]
    BlockOutOfBounds {
        /// Top row of the requested placement
        row: usize,
        /// Left column of the requested placement
        col: usize,
        /// Shape of the block being written
        block: (usize, usize),
        /// Shape of the target matrix
        target: (usize, usize),
    },

    /// Operation requires a square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Matrix elements are too large to invert reliably.
    #[error("matrix element magnitude {value:e} exceeds inversion limit {limit:e}")]
    Overflow {
        /// Largest absolute element found
        value: f64,
        /// Configured limit
        limit: f64,
    },

    /// Column-pivoted QR needs at least as many rows as columns.
    #[error("pivoted QR needs rows >= cols, got {rows}x{cols}")]
    Underdetermined {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// The matrix has no elements.
    #[error("operation {op} is undefined on an empty matrix")]
    Empty {
        /// Name of the operation that failed
        op: &'static str,
    },

    /// Element count does not match the requested shape.
    #[error("cannot shape {len} elements into {rows}x{cols}")]
    InvalidShape {
        /// Number of elements supplied
        len: usize,
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
    },
}

/// A specialized `Result` type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;

impl MatrixError {
    /// Returns `true` for shape incompatibilities between operands.
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            MatrixError::DimensionMismatch { .. }
                | MatrixError::InvalidShape { .. }
                | MatrixError::Underdetermined { .. }
        )
    }

    /// Returns `true` for index and block placement errors.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            MatrixError::IndexOutOfRange { .. } | MatrixError::BlockOutOfBounds { .. }
        )
    }
}
