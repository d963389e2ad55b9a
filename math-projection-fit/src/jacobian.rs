//! Jacobian of the centred Helmert model.
//!
//! With projected coordinates `X_i(θ), Y_i(θ)` reduced to their weighted
//! centroid, the model is
//!
//! ```text
//! x̂_i = a X̃_i - b Ỹ_i
//! ŷ_i = b X̃_i + a Ỹ_i
//! ```
//!
//! and its derivatives with respect to `[θ_free…, a, b]` need the centred
//! partials `∂X̃_i/∂θ_k`, obtained from per-point Stirling derivatives by
//! subtracting their weighted column mean.

use math_carto_matrix::Matrix;
use math_carto_numdiff::{DerivativeOrder, try_derivative};
use ndarray::{Array1, Array2};

use crate::error::{FitError, Result};
use crate::helmert::center;
use crate::projection::ProjectionParams;
use crate::residual::HelmertResidual;

/// Numerical Jacobian of the centred Helmert model over the free parameters.
pub struct JacobianFunctor<'a> {
    residual: HelmertResidual<'a>,
    free: Vec<usize>,
    step: f64,
    weights: Array1<f64>,
}

impl<'a> JacobianFunctor<'a> {
    /// `free` lists parameter-vector indices; `step` is the Stirling step in degrees.
    pub fn new(residual: HelmertResidual<'a>, free: &[usize], step: f64) -> Self {
        let weights = Array1::from_iter(residual.points().iter().map(|p| p.weight));
        Self {
            residual,
            free: free.to_vec(),
            step,
            weights,
        }
    }

    /// Number of columns: free parameters plus `a` and `b`.
    pub fn columns(&self) -> usize {
        self.free.len() + 2
    }

    /// Centred partial derivatives of the projected coordinates,
    /// `(∂X̃/∂θ, ∂Ỹ/∂θ)`, each `n x k`.
    pub fn projected_derivatives(&self, v: &Array1<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        let projection = self.residual.projection();
        let points = self.residual.points();
        let n = points.len();
        let k = self.free.len();
        let mut dx = Array2::zeros((n, k));
        let mut dy = Array2::zeros((n, k));

        for (i, p) in points.iter().enumerate() {
            let x_of = |u: &Array1<f64>| -> Result<f64> {
                Ok(projection
                    .project(p.lat, p.lon, &ProjectionParams::from_vector(u))?
                    .0)
            };
            let y_of = |u: &Array1<f64>| -> Result<f64> {
                Ok(projection
                    .project(p.lat, p.lon, &ProjectionParams::from_vector(u))?
                    .1)
            };
            for (col, &index) in self.free.iter().enumerate() {
                dx[[i, col]] = try_derivative::<_, FitError>(
                    &x_of,
                    v,
                    DerivativeOrder::First,
                    index,
                    self.step,
                )?;
                dy[[i, col]] = try_derivative::<_, FitError>(
                    &y_of,
                    v,
                    DerivativeOrder::First,
                    index,
                    self.step,
                )?;
            }
        }

        let total = self.weights.sum();
        if total.is_nan() || total <= 0.0 {
            return Err(FitError::Degenerate("weights sum to zero".to_string()));
        }
        for m in [&mut dx, &mut dy] {
            for mut column in m.columns_mut() {
                let mean = column.dot(&self.weights) / total;
                column.mapv_inplace(|d| d - mean);
            }
        }
        Ok((dx, dy))
    }

    /// Jacobian (`2n x (k + 2)`) of the interleaved centred model at `v`
    /// for the similarity coefficients `a`, `b`.
    pub fn jacobian(&self, v: &Array1<f64>, a: f64, b: f64) -> Result<Matrix> {
        let params = ProjectionParams::from_vector(v);
        let projected = self.residual.project_all(&params)?;
        let (centred, _) = center(&projected, &self.weights)?;
        let (dx, dy) = self.projected_derivatives(v)?;

        let k = self.free.len();
        let mut j = Matrix::zeros(2 * centred.nrows(), k + 2);
        for (i, p) in centred.outer_iter().enumerate() {
            for col in 0..k {
                j[(2 * i, col)] = a * dx[[i, col]] - b * dy[[i, col]];
                j[(2 * i + 1, col)] = b * dx[[i, col]] + a * dy[[i, col]];
            }
            j[(2 * i, k)] = p[0];
            j[(2 * i + 1, k)] = p[1];
            j[(2 * i, k + 1)] = -p[1];
            j[(2 * i + 1, k + 1)] = p[0];
        }
        Ok(j)
    }
}
