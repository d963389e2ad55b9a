//! Dense linear algebra for projection fitting
//!
//! This crate provides a small, value-semantic dense matrix over `f64`
//! together with the factorizations needed by the parameter-estimation layer.
//!
//! # Features
//!
//! - **Arithmetic**: sum, difference, product, Hadamard product, transpose,
//!   all dimension-checked (no broadcasting)
//! - **Reductions**: min/max with position, row/column sums, norms, sorting
//! - **LU**: scaled partial pivoting with near-singularity fallback,
//!   determinant and inverse
//! - **QR**: Gram-Schmidt with reorthogonalization, Householder with
//!   column pivoting
//! - **Pseudo-inverse**: rank-revealing double QR
//!
//! # Example
//!
//! ```rust
//! use math_carto_matrix::Matrix;
//! use ndarray::array;
//!
//! let a = Matrix::from(array![[1.0, 2.0], [2.0, 4.0], [1.0, 0.0]]);
//! let p = a.pinv().expect("pinv never fails on a well-formed matrix");
//! let apa = a.mult(&p)?.mult(&a)?;
//! assert!(apa.approx_eq(&a, 1e-10));
//! # Ok::<(), math_carto_matrix::MatrixError>(())
//! ```

pub mod error;
pub mod lu;
pub mod matrix;
pub mod pinv;
pub mod qr;

pub use error::{MatrixError, Result};
pub use lu::{DEFAULT_INVERSION_LIMIT, LuDecomposition, TINY_PIVOT};
pub use matrix::Matrix;
pub use qr::{Householder, PivotedQr, QrDecomposition};
