//! QR decompositions and Householder reflections.
//!
//! Two variants are provided:
//!
//! - [`Matrix::qr`]: modified Gram-Schmidt with reorthogonalisation
//!   (W. Gander, "Algorithms for the QR-decomposition", 1980). A column whose
//!   norm drops by more than a factor ten during orthogonalisation is
//!   orthogonalised again; a column that collapses to the rounding level is
//!   treated as linearly dependent and gets a zero `R` diagonal.
//! - [`Matrix::qr_pivoted`]: Householder QR with column pivoting
//!   (Businger & Golub 1965, Golub & Van Loan Alg. 5.4.1), the rank-revealing
//!   factorisation behind [`Matrix::pinv`].

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Upper bound on reorthogonalisation passes for a single column.
const MAX_REORTHOGONALIZATIONS: usize = 4;

/// `A = Q R` with `Q` (`m x n`) and `R` (`n x n`, upper triangular).
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    /// Orthonormal columns (zero columns for dependent input columns).
    pub q: Matrix,
    /// Upper triangular factor.
    pub r: Matrix,
}

/// `A P = Q R` with `Q` orthogonal (`m x m`), `R` upper trapezoidal (`m x n`)
/// and `P` a column permutation (`n x n`).
#[derive(Debug, Clone)]
pub struct PivotedQr {
    /// Orthogonal factor.
    pub q: Matrix,
    /// Upper trapezoidal factor with non-increasing diagonal magnitudes.
    pub r: Matrix,
    /// Column permutation matrix.
    pub p: Matrix,
    /// `perm[j]` is the column of `A` moved to position `j`.
    pub perm: Vec<usize>,
}

/// Householder reflection `H = I - beta v vᵗ` with `v[0] = 1`.
#[derive(Debug, Clone)]
pub struct Householder {
    /// Reflection vector (column).
    pub v: Matrix,
    /// Scaling factor.
    pub beta: f64,
}

impl Householder {
    fn from_slice(x: &[f64]) -> (Vec<f64>, f64) {
        let n = x.len();
        let mut v = vec![0.0; n];
        if n == 0 {
            return (v, 0.0);
        }
        v[0] = 1.0;
        let sigma: f64 = x[1..].iter().map(|xi| xi * xi).sum();
        v[1..].copy_from_slice(&x[1..]);
        let x0 = x[0];

        if sigma == 0.0 {
            // already a multiple of e1; flip the sign if needed
            let beta = if x0 >= 0.0 { 0.0 } else { 2.0 };
            return (v, beta);
        }

        let mu = (x0 * x0 + sigma).sqrt();
        let v0 = if x0 <= 0.0 {
            x0 - mu
        } else {
            -sigma / (x0 + mu)
        };
        let beta = 2.0 * v0 * v0 / (sigma + v0 * v0);
        for vi in v.iter_mut().skip(1) {
            *vi /= v0;
        }
        (v, beta)
    }
}

impl Matrix {
    /// Householder vector for the sub-column `self[i..j, 0]`.
    ///
    /// `self` must be a column vector. Applying the returned reflection to the
    /// sub-column maps it onto a multiple of the first unit vector.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::DimensionMismatch` when `self` has more than one
    /// column, and `MatrixError::IndexOutOfRange` when `i >= j` or `j > rows`.
    pub fn hous(&self, i: usize, j: usize) -> Result<Householder> {
        if self.cols() != 1 {
            return Err(MatrixError::DimensionMismatch {
                op: "hous",
                left: self.shape(),
                right: (self.rows(), 1),
            });
        }
        if j > self.rows() {
            return Err(MatrixError::IndexOutOfRange {
                axis: "row",
                index: j,
                extent: self.rows(),
            });
        }
        if i >= j {
            return Err(MatrixError::IndexOutOfRange {
                axis: "row",
                index: i,
                extent: j,
            });
        }
        let x: Vec<f64> = (i..j).map(|k| self[(k, 0)]).collect();
        let (v, beta) = Householder::from_slice(&x);
        Ok(Householder {
            v: Matrix::from_vec(v.len(), 1, v)?,
            beta,
        })
    }

    /// Thin QR by modified Gram-Schmidt with reorthogonalisation.
    pub fn qr(&self) -> QrDecomposition {
        let (m, n) = self.shape();
        let mut a = self.clone();
        let mut q = Matrix::zeros(m, n);
        let mut r = Matrix::zeros(n, n);
        let eps = f64::EPSILON;

        for k in 0..n {
            let mut t = column_norm(&a, k, 0);
            let mut tt = t;
            for pass in 0..MAX_REORTHOGONALIZATIONS {
                for j in 0..k {
                    let s: f64 = (0..m).map(|i| q[(i, j)] * a[(i, k)]).sum();
                    r[(j, k)] += s;
                    for i in 0..m {
                        a[(i, k)] -= s * q[(i, j)];
                    }
                }
                tt = column_norm(&a, k, 0);
                if tt > 10.0 * eps * t && tt < t / 10.0 && pass + 1 < MAX_REORTHOGONALIZATIONS {
                    t = tt;
                    continue;
                }
                if tt < 10.0 * eps * t {
                    tt = 0.0;
                }
                break;
            }
            r[(k, k)] = tt;
            if tt > 0.0 {
                for i in 0..m {
                    q[(i, k)] = a[(i, k)] / tt;
                }
            }
        }

        QrDecomposition { q, r }
    }

    /// Householder QR with column pivoting.
    ///
    /// Column norms are downdated after every step and recomputed only when
    /// cancellation makes the running value unreliable.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::Underdetermined` when `rows < cols`.
    pub fn qr_pivoted(&self) -> Result<PivotedQr> {
        let (m, n) = self.shape();
        if m < n {
            return Err(MatrixError::Underdetermined { rows: m, cols: n });
        }
        let mut a = self.clone();
        let mut q = Matrix::identity(m);
        let mut perm: Vec<usize> = (0..n).collect();
        let mut c: Vec<f64> = (0..n).map(|j| column_norm(&a, j, 0).powi(2)).collect();
        let mut c_ref = c.clone();
        let downdate_tol = f64::EPSILON.sqrt();

        let mut r = 0;
        while r < n {
            let (k, tau) = (r..n).fold((r, -1.0), |(bk, bv), j| {
                if c[j] > bv { (j, c[j]) } else { (bk, bv) }
            });
            if tau <= 0.0 {
                break;
            }

            a.swap_cols(r, k)?;
            c.swap(r, k);
            c_ref.swap(r, k);
            perm.swap(r, k);

            let x: Vec<f64> = (r..m).map(|i| a[(i, r)]).collect();
            let (v, beta) = Householder::from_slice(&x);

            if beta != 0.0 {
                // A[r.., r..] -= beta v (vᵗ A[r.., r..])
                for j in r..n {
                    let w: f64 = (r..m).map(|i| v[i - r] * a[(i, j)]).sum();
                    let w = beta * w;
                    for i in r..m {
                        a[(i, j)] -= w * v[i - r];
                    }
                }
                // Q[.., r..] -= beta (Q[.., r..] v) vᵗ
                for i in 0..m {
                    let w: f64 = (r..m).map(|l| q[(i, l)] * v[l - r]).sum();
                    let w = beta * w;
                    for l in r..m {
                        q[(i, l)] -= w * v[l - r];
                    }
                }
            }
            for i in (r + 1)..m {
                a[(i, r)] = 0.0;
            }

            for j in (r + 1)..n {
                c[j] -= a[(r, j)] * a[(r, j)];
                if c[j] <= downdate_tol * c_ref[j] {
                    c[j] = column_norm(&a, j, r + 1).powi(2);
                    c_ref[j] = c[j];
                }
            }
            r += 1;
        }

        let mut p = Matrix::zeros(n, n);
        for (j, &src) in perm.iter().enumerate() {
            p[(src, j)] = 1.0;
        }

        Ok(PivotedQr { q, r: a, p, perm })
    }
}

fn column_norm(a: &Matrix, col: usize, from_row: usize) -> f64 {
    (from_row..a.rows())
        .map(|i| a[(i, col)] * a[(i, col)])
        .sum::<f64>()
        .sqrt()
}
