//! Rank-revealing Moore-Penrose pseudo-inverse.
//!
//! Follows the double-QR construction of Golub & Van Loan (section 5.5):
//!
//! 1. Wide inputs are transposed, `pinv(A) = pinv(Aᵗ)ᵗ`.
//! 2. `A P = Q R` with column pivoting; the numerical rank `k` is the number
//!    of leading `|r_ii|` above `max(m, n) * ||A|| * eps`.
//! 3. Full column rank: `pinv(A) = P R₁⁻¹ Q₁ᵗ` with `R₁` the leading `n x n` block.
//! 4. Rank deficient: the `k x n` block `S` of `R` is factored again,
//!    `Sᵗ P₂ = Z T`, and `pinv(A) = P Z₁ (T₁ᵗ)⁻¹ P₂ᵗ Q₁ᵗ`.
//!
//! Rank deficiency is the expected, handled case and never an error.

use crate::error::Result;
use crate::matrix::Matrix;

impl Matrix {
    /// Numerical rank tolerance used by [`pinv`](Self::pinv).
    pub fn rank_tolerance(&self) -> f64 {
        let (m, n) = self.shape();
        m.max(n) as f64 * self.norm() * f64::EPSILON
    }

    /// Numerical rank from the pivoted QR diagonal.
    pub fn rank(&self) -> Result<usize> {
        if self.rows() < self.cols() {
            return self.trans().rank();
        }
        let qr = self.qr_pivoted()?;
        let tol = self.rank_tolerance();
        Ok((0..self.cols())
            .take_while(|&i| qr.r[(i, i)].abs() > tol)
            .count())
    }

    /// Moore-Penrose pseudo-inverse (`cols x rows`).
    pub fn pinv(&self) -> Result<Matrix> {
        let (m, n) = self.shape();
        if m < n {
            return Ok(self.trans().pinv()?.trans());
        }
        if self.is_empty() {
            return Ok(Matrix::zeros(n, m));
        }

        let qr = self.qr_pivoted()?;
        let tol = self.rank_tolerance();
        let k = (0..n).take_while(|&i| qr.r[(i, i)].abs() > tol).count();
        if k == 0 {
            return Ok(Matrix::zeros(n, m));
        }

        let q1t = qr.q.block(0, 0, m, k)?.trans();
        if k == n {
            let r1 = qr.r.block(0, 0, n, n)?;
            return qr.p.mult(&r1.inv()?)?.mult(&q1t);
        }

        log::debug!("pinv: rank {k} < {n}, second QR on the leading block");
        let s = qr.r.block(0, 0, k, n)?;
        let second = s.trans().qr_pivoted()?;
        let z1 = second.q.block(0, 0, n, k)?;
        let t1t_inv = second.r.block(0, 0, k, k)?.trans().inv()?;

        qr.p
            .mult(&z1)?
            .mult(&t1t_inv)?
            .mult(&second.p.trans())?
            .mult(&q1t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pinv_of_invertible_is_inverse() {
        let a = Matrix::from(array![[4.0, 7.0], [2.0, 6.0]]);
        let p = a.pinv().unwrap();
        let inv = a.inv().unwrap();
        assert!(p.approx_eq(&inv, 1e-12));
    }

    #[test]
    fn test_pinv_rank_one() {
        let a = Matrix::from(array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]]);
        assert_eq!(a.rank().unwrap(), 1);
        let p = a.pinv().unwrap();
        assert_eq!(p.shape(), (2, 3));
        // rank one: pinv = Aᵗ / ||A||²
        let expected = a.trans().scale(1.0 / a.sum2());
        assert!(p.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_pinv_zero_matrix() {
        let a = Matrix::zeros(3, 2);
        let p = a.pinv().unwrap();
        assert_eq!(p.shape(), (2, 3));
        assert_eq!(p.sum2(), 0.0);
    }

    #[test]
    fn test_pinv_wide() {
        let a = Matrix::from(array![[1.0, 0.0, 1.0], [0.0, 1.0, 1.0]]);
        let p = a.pinv().unwrap();
        assert_eq!(p.shape(), (3, 2));
        // full row rank: A pinv(A) = I
        let ap = a.mult(&p).unwrap();
        assert!(ap.approx_eq(&Matrix::identity(2), 1e-12));
    }
}
