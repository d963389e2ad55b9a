//! Gauss-Newton refinement of projection parameters.
//!
//! The unknowns are the free projection parameters plus the similarity
//! coefficients `a`, `b`. Each iteration solves the linearised weighted
//! problem with the pseudo-inverse of the row-scaled Jacobian, so a
//! rank-deficient Jacobian (a parameter the data cannot see) gives the
//! minimum-norm step instead of failing. The translation is eliminated by
//! centring. A step that increases the objective is halved.

use log::{debug, trace};
use math_carto_differential_evolution::reflect_into_bounds;
use math_carto_matrix::Matrix;
use ndarray::Array1;

use crate::config::LeastSquaresSettings;
use crate::error::Result;
use crate::helmert::{Helmert, center, map_coordinates};
use crate::jacobian::JacobianFunctor;
use crate::projection::ProjectionParams;
use crate::residual::HelmertResidual;

const MAX_HALVINGS: usize = 12;

/// Outcome of a Gauss-Newton run.
#[derive(Debug, Clone)]
pub struct LeastSquaresReport {
    /// Final parameter vector `[radius, lat1, lat2, lon0]`
    pub x: Array1<f64>,
    /// Helmert transform re-estimated at `x`
    pub helmert: Helmert,
    /// `rᵗ W r` at `x`
    pub objective: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the step-norm test was met
    pub converged: bool,
}

/// Weighted residuals of the centred model for fixed `a`, `b`.
fn centred_residuals(
    residual: &HelmertResidual<'_>,
    x: &Array1<f64>,
    a: f64,
    b: f64,
    sqrt_w: &Array1<f64>,
) -> Result<Array1<f64>> {
    let weights = sqrt_w.mapv(|s| s * s);
    let projected = residual.project_all(&ProjectionParams::from_vector(x))?;
    let (p, _) = center(&projected, &weights)?;
    let (m, _) = center(&map_coordinates(residual.points()), &weights)?;

    let mut r = Array1::zeros(2 * p.nrows());
    for i in 0..p.nrows() {
        r[2 * i] = sqrt_w[i] * (m[[i, 0]] - (a * p[[i, 0]] - b * p[[i, 1]]));
        r[2 * i + 1] = sqrt_w[i] * (m[[i, 1]] - (b * p[[i, 0]] + a * p[[i, 1]]));
    }
    Ok(r)
}

/// Refines `x0` (full parameter vector) over the components listed in `free`.
///
/// Components outside `free` keep their value from `x0` after reflection into
/// `[lower, upper]`; free components are reflected back after every step.
pub fn least_squares(
    residual: &HelmertResidual<'_>,
    x0: &Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    free: &[usize],
    settings: &LeastSquaresSettings,
) -> Result<LeastSquaresReport> {
    let sqrt_w = Array1::from_iter(residual.points().iter().map(|p| p.weight.sqrt()));
    let jacobian = JacobianFunctor::new(*residual, free, settings.diff_step);
    let k = free.len();

    let mut x = x0.clone();
    reflect_into_bounds(&mut x, lower, upper);
    let (start, _) = residual.evaluate(&x)?;
    let (mut a, mut b) = (start.a, start.b);
    let mut r = centred_residuals(residual, &x, a, b, &sqrt_w)?;
    let mut cost = r.dot(&r);

    let mut iterations = 0;
    let mut converged = false;
    while iterations < settings.max_iterations {
        iterations += 1;

        let mut j = jacobian.jacobian(&x, a, b)?;
        for (i, &s) in sqrt_w.iter().enumerate() {
            for col in 0..jacobian.columns() {
                j[(2 * i, col)] *= s;
                j[(2 * i + 1, col)] *= s;
            }
        }
        let delta = j.pinv()?.mult(&Matrix::column_vector(&r))?;

        let theta_norm = free
            .iter()
            .map(|&idx| x[idx] * x[idx])
            .chain([a * a, b * b])
            .sum::<f64>()
            .sqrt();

        // backtrack until the linearised step decreases the cost
        let mut scale = 1.0;
        let mut accepted = None;
        for _ in 0..=MAX_HALVINGS {
            let mut candidate = x.clone();
            for (col, &idx) in free.iter().enumerate() {
                candidate[idx] += scale * delta[(col, 0)];
            }
            reflect_into_bounds(&mut candidate, lower, upper);
            let ca = a + scale * delta[(k, 0)];
            let cb = b + scale * delta[(k + 1, 0)];
            match centred_residuals(residual, &candidate, ca, cb, &sqrt_w) {
                Ok(cr) if cr.dot(&cr) <= cost => {
                    accepted = Some((candidate, ca, cb, cr));
                    break;
                }
                Ok(_) => {}
                Err(e) => trace!("gauss-newton: step rejected, {e}"),
            }
            scale *= 0.5;
        }

        let step_norm = scale * (0..k + 2).map(|i| delta[(i, 0)].powi(2)).sum::<f64>().sqrt();
        let Some((nx, na, nb, nr)) = accepted else {
            debug!("gauss-newton: no decreasing step at iteration {iterations}");
            converged = step_norm <= settings.tolerance * (1.0 + theta_norm);
            break;
        };
        x = nx;
        a = na;
        b = nb;
        cost = nr.dot(&nr);
        r = nr;
        debug!("gauss-newton {iterations}: cost={cost:.6e} step={step_norm:.3e}");

        if step_norm <= settings.tolerance * (1.0 + theta_norm) {
            converged = true;
            break;
        }
    }

    let (helmert, res) = residual.evaluate(&x)?;
    Ok(LeastSquaresReport {
        objective: residual.objective(&res),
        x,
        helmert,
        iterations,
        converged,
    })
}
