//! Residual functor handed to the optimizers.

use math_carto_differential_evolution::Residuals;
use math_carto_matrix::Matrix;
use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::helmert::Helmert;
use crate::points::{ControlPoint, validate_points};
use crate::projection::{Projection, ProjectionParams};

/// Maps a parameter vector to the map residuals left after the best Helmert
/// transform of the projected control points.
///
/// Residuals are interleaved, `(x_0 - x̂_0, y_0 - ŷ_0, x_1 - x̂_1, …)`, and
/// weighted by `W = diag(w_0, w_0, w_1, w_1, …)`.
#[derive(Clone, Copy)]
pub struct HelmertResidual<'a> {
    projection: &'a dyn Projection,
    points: &'a [ControlPoint],
}

impl<'a> HelmertResidual<'a> {
    /// Fails when the control points cannot support a fit.
    pub fn new(projection: &'a dyn Projection, points: &'a [ControlPoint]) -> Result<Self> {
        validate_points(points)?;
        Ok(Self { projection, points })
    }

    /// The projection being fitted.
    pub fn projection(&self) -> &'a dyn Projection {
        self.projection
    }

    /// The control points.
    pub fn points(&self) -> &'a [ControlPoint] {
        self.points
    }

    /// Projected coordinates of every control point (`n x 2`).
    pub fn project_all(&self, params: &ProjectionParams) -> Result<Array2<f64>> {
        let mut out = Array2::zeros((self.points.len(), 2));
        for (mut row, p) in out.outer_iter_mut().zip(self.points) {
            let (x, y) = self.projection.project(p.lat, p.lon, params)?;
            row[0] = x;
            row[1] = y;
        }
        Ok(out)
    }

    /// Best Helmert transform at `v` and the residuals it leaves.
    pub fn evaluate(&self, v: &Array1<f64>) -> Result<(Helmert, Array1<f64>)> {
        let params = ProjectionParams::from_vector(v);
        let projected = self.project_all(&params)?;
        let helmert = Helmert::fit(&projected, self.points)?;

        let mut r = Array1::zeros(2 * self.points.len());
        for (i, (p, q)) in self.points.iter().zip(projected.outer_iter()).enumerate() {
            let (x, y) = helmert.apply(q[0], q[1]);
            r[2 * i] = p.x - x;
            r[2 * i + 1] = p.y - y;
        }
        Ok((helmert, r))
    }

    /// `W = diag(w_0, w_0, w_1, w_1, …)`
    pub fn weight_matrix(&self) -> Matrix {
        let diag: Vec<f64> = self
            .points
            .iter()
            .flat_map(|p| [p.weight, p.weight])
            .collect();
        Matrix::from_diagonal(&diag)
    }

    /// `rᵗ W r` without building `W`.
    pub fn objective(&self, r: &Array1<f64>) -> f64 {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| p.weight * (r[2 * i] * r[2 * i] + r[2 * i + 1] * r[2 * i + 1]))
            .sum()
    }
}

impl Residuals for HelmertResidual<'_> {
    type Error = crate::error::FitError;

    fn residuals(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.evaluate(x).map(|(_, r)| r)
    }
}
