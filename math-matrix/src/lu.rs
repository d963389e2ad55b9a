//! LU decomposition with scaled partial pivoting, determinant and inverse.
//!
//! Crout elimination where the pivot row is the one maximising
//! `|u_ij| * scale_i`, `scale_i` being the reciprocal of the largest
//! magnitude in row `i` of the input. Exactly zero pivots are replaced by
//! [`TINY_PIVOT`] instead of failing, so singular and nearly singular
//! matrices still factor; their determinant comes out at (or near) zero and
//! their inverse is huge rather than an error.

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Substitute for an exactly zero pivot.
pub const TINY_PIVOT: f64 = 1.0e-20;

/// Largest element magnitude accepted by [`Matrix::inv`].
pub const DEFAULT_INVERSION_LIMIT: f64 = 1.0e100;

/// Result of [`Matrix::lu`]: `P * A = L * U`.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Unit lower triangular factor.
    pub l: Matrix,
    /// Upper triangular factor.
    pub u: Matrix,
    /// Row permutation matrix.
    pub p: Matrix,
    /// Sign of the permutation, `+1` or `-1`.
    pub sign: f64,
    /// `perm[i]` is the row of `A` that ended up in row `i`.
    pub perm: Vec<usize>,
}

impl LuDecomposition {
    /// Determinant of the factored matrix.
    pub fn det(&self) -> f64 {
        (0..self.u.rows()).fold(self.sign, |acc, i| acc * self.u[(i, i)])
    }

    /// Solves `A X = B` for every column of `B`.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        let n = self.u.rows();
        if b.rows() != n {
            return Err(MatrixError::DimensionMismatch {
                op: "lu_solve",
                left: self.u.shape(),
                right: b.shape(),
            });
        }
        let mut x = Matrix::zeros(n, b.cols());
        for c in 0..b.cols() {
            // forward substitution on the permuted right-hand side
            let mut y = vec![0.0; n];
            for i in 0..n {
                let mut sum = b[(self.perm[i], c)];
                for k in 0..i {
                    sum -= self.l[(i, k)] * y[k];
                }
                y[i] = sum;
            }
            for i in (0..n).rev() {
                let mut sum = y[i];
                for k in (i + 1)..n {
                    sum -= self.u[(i, k)] * x[(k, c)];
                }
                x[(i, c)] = sum / self.u[(i, i)];
            }
        }
        Ok(x)
    }
}

impl Matrix {
    /// LU factorisation with scaled partial pivoting.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::NotSquare` on rectangular input.
    pub fn lu(&self) -> Result<LuDecomposition> {
        let (rows, cols) = self.shape();
        if rows != cols {
            return Err(MatrixError::NotSquare { rows, cols });
        }
        let n = rows;
        let mut a = self.clone();
        let mut perm: Vec<usize> = (0..n).collect();
        let mut sign = 1.0;

        let mut scale = vec![1.0; n];
        for (i, s) in scale.iter_mut().enumerate() {
            let big = (0..n).fold(0.0_f64, |acc, j| acc.max(a[(i, j)].abs()));
            if big > 0.0 {
                *s = 1.0 / big;
            } else {
                log::debug!("lu: row {i} is identically zero");
            }
        }

        for j in 0..n {
            for i in 0..j {
                let mut sum = a[(i, j)];
                for k in 0..i {
                    sum -= a[(i, k)] * a[(k, j)];
                }
                a[(i, j)] = sum;
            }

            let mut big = -1.0;
            let mut imax = j;
            for i in j..n {
                let mut sum = a[(i, j)];
                for k in 0..j {
                    sum -= a[(i, k)] * a[(k, j)];
                }
                a[(i, j)] = sum;
                let weighted = scale[i] * sum.abs();
                if weighted > big {
                    big = weighted;
                    imax = i;
                }
            }

            if imax != j {
                a.swap_rows(imax, j)?;
                scale.swap(imax, j);
                perm.swap(imax, j);
                sign = -sign;
            }

            if a[(j, j)] == 0.0 {
                a[(j, j)] = TINY_PIVOT;
            }

            let pivot = a[(j, j)];
            for i in (j + 1)..n {
                a[(i, j)] /= pivot;
            }
        }

        let mut l = Matrix::identity(n);
        let mut u = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                if j < i {
                    l[(i, j)] = a[(i, j)];
                } else {
                    u[(i, j)] = a[(i, j)];
                }
            }
        }
        let mut p = Matrix::zeros(n, n);
        for (i, &src) in perm.iter().enumerate() {
            p[(i, src)] = 1.0;
        }

        Ok(LuDecomposition {
            l,
            u,
            p,
            sign,
            perm,
        })
    }

    /// Determinant via LU.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::NotSquare` on rectangular input.
    pub fn det(&self) -> Result<f64> {
        Ok(self.lu()?.det())
    }

    /// Inverse via LU, rejecting matrices whose elements exceed
    /// [`DEFAULT_INVERSION_LIMIT`].
    pub fn inv(&self) -> Result<Matrix> {
        self.inv_with_limit(DEFAULT_INVERSION_LIMIT)
    }

    /// Inverse via LU with an explicit element-magnitude limit.
    ///
    /// The factors are solved against the identity, which yields
    /// `(P A)^-1`; multiplying by `P` on the right restores `A^-1`.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::NotSquare` on rectangular input and
    /// `MatrixError::Overflow` when the largest element exceeds `limit`.
    pub fn inv_with_limit(&self, limit: f64) -> Result<Matrix> {
        let (rows, cols) = self.shape();
        if rows != cols {
            return Err(MatrixError::NotSquare { rows, cols });
        }
        let value = self.max_abs();
        if value > limit {
            return Err(MatrixError::Overflow { value, limit });
        }
        let lu = self.lu()?;
        let n = rows;

        let mut x = Matrix::zeros(n, n);
        for c in 0..n {
            let mut y = vec![0.0; n];
            for i in 0..n {
                let mut sum = if i == c { 1.0 } else { 0.0 };
                for k in 0..i {
                    sum -= lu.l[(i, k)] * y[k];
                }
                y[i] = sum;
            }
            for i in (0..n).rev() {
                let mut sum = y[i];
                for k in (i + 1)..n {
                    sum -= lu.u[(i, k)] * x[(k, c)];
                }
                x[(i, c)] = sum / lu.u[(i, i)];
            }
        }
        x.mult(&lu.p)
    }

    /// Solves `self * X = b` through LU.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        self.lu()?.solve(b)
    }
}
