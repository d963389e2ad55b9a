//! Bounded Nelder-Mead simplex search on the weighted objective `rᵗ W r`.
//!
//! The simplex only spans the free variables (those with `lower < upper`);
//! every new vertex is reflected into the bounds, and a failed evaluation
//! scores [`FAILED_EVALUATION`] so the vertex is the first to be replaced.

use log::{debug, info};
use math_carto_matrix::{Matrix, MatrixError};
use ndarray::Array1;

use crate::impl_helpers::{validate_bounds, weighted_energy};
use crate::{DEError, FAILED_EVALUATION, Residuals, Result, reflect_into_bounds};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Simplex search settings.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Evaluation budget; `None` means `200 * free variables`.
    pub max_evaluations: Option<usize>,
    /// Relative tolerance on the objective spread of the simplex.
    pub ftol_rel: f64,
    /// Relative tolerance on the simplex extent.
    pub xtol_rel: f64,
    /// Initial edge length as a fraction of each bound interval.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_evaluations: None,
            ftol_rel: 1e-9,
            xtol_rel: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Result of a simplex search.
#[derive(Debug, Clone)]
pub struct NelderMeadReport {
    /// Best vertex
    pub x: Array1<f64>,
    /// Objective at `x`
    pub fun: f64,
    /// Objective evaluations
    pub nfev: usize,
    /// Simplex iterations
    pub nit: usize,
    /// Both tolerances met before the budget ran out
    pub converged: bool,
}

struct Vertex {
    x: Array1<f64>,
    f: f64,
}

/// Minimizes `r(x)ᵗ W r(x)` over `[lower, upper]` from `x0`.
///
/// `weights = None` means `W = I`. `x0` is reflected into the bounds first.
///
/// # Errors
///
/// Fails on bad bounds, on an `x0` of the wrong length, on a non-square `W`
/// and when `W` does not match the residual length.
///
/// # Example
///
/// ```rust
/// use math_carto_differential_evolution::{NelderMeadConfig, nelder_mead};
/// use ndarray::{Array1, array};
///
/// let booth = |x: &Array1<f64>| -> Result<Array1<f64>, String> {
///     Ok(array![x[0] + 2.0 * x[1] - 7.0, 2.0 * x[0] + x[1] - 5.0])
/// };
/// let report = nelder_mead(
///     &booth,
///     array![0.0, 0.0],
///     &array![-10.0, -10.0],
///     &array![10.0, 10.0],
///     None,
///     &NelderMeadConfig::default(),
/// )
/// .unwrap();
/// assert!((report.x[0] - 1.0).abs() < 1e-3 && (report.x[1] - 3.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    func: &F,
    x0: Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    weights: Option<&Matrix>,
    config: &NelderMeadConfig,
) -> Result<NelderMeadReport>
where
    F: Residuals + ?Sized,
{
    validate_bounds(lower, upper)?;
    let n = lower.len();
    if x0.len() != n {
        return Err(DEError::X0DimensionMismatch {
            expected: n,
            got: x0.len(),
        });
    }
    if let Some(w) = weights {
        if !w.is_square() {
            return Err(MatrixError::NotSquare {
                rows: w.rows(),
                cols: w.cols(),
            }
            .into());
        }
    }

    let free: Vec<usize> = (0..n).filter(|&i| upper[i] > lower[i]).collect();
    let max_evaluations = config.max_evaluations.unwrap_or(200 * free.len().max(1));
    let energy = |x: &Array1<f64>| weighted_energy(func, weights, x);

    let mut start = x0;
    reflect_into_bounds(&mut start, lower, upper);
    let f_start = energy(&start)?;
    let mut nfev = 1;
    if free.is_empty() {
        return Ok(NelderMeadReport {
            x: start,
            fun: f_start,
            nfev,
            nit: 0,
            converged: true,
        });
    }

    let mut simplex = Vec::with_capacity(free.len() + 1);
    simplex.push(Vertex {
        x: start.clone(),
        f: f_start,
    });
    for &j in &free {
        let step = config.initial_step * (upper[j] - lower[j]);
        let mut x = start.clone();
        // step inwards when the start sits on the upper face
        x[j] = if start[j] + step <= upper[j] {
            start[j] + step
        } else {
            start[j] - step
        };
        let f = energy(&x)?;
        nfev += 1;
        simplex.push(Vertex { x, f });
    }
    info!(
        "Nelder-Mead start: {} free variables, f={:.6e}, budget={}",
        free.len(),
        f_start,
        max_evaluations
    );

    let mut nit = 0;
    let mut converged = false;
    let k = free.len();
    while nfev < max_evaluations {
        simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
        if simplex_converged(&simplex, &free, config) {
            converged = true;
            break;
        }
        nit += 1;

        let mut centroid = Array1::<f64>::zeros(n);
        for v in &simplex[..k] {
            centroid += &v.x;
        }
        centroid /= k as f64;

        let best = simplex[0].f;
        let second_worst = simplex[k - 1].f;
        let worst = simplex[k].f;
        let towards = |t: &Array1<f64>, coefficient: f64| {
            let mut x = &centroid + &((t - &centroid) * coefficient);
            reflect_into_bounds(&mut x, lower, upper);
            x
        };

        let xr = towards(&simplex[k].x, -REFLECTION);
        let fr = energy(&xr)?;
        nfev += 1;

        if fr < best {
            let xe = towards(&xr, EXPANSION);
            let fe = energy(&xe)?;
            nfev += 1;
            simplex[k] = if fe < fr {
                Vertex { x: xe, f: fe }
            } else {
                Vertex { x: xr, f: fr }
            };
        } else if fr < second_worst {
            simplex[k] = Vertex { x: xr, f: fr };
        } else {
            let (xc, fc) = if fr < worst {
                let xc = towards(&xr, CONTRACTION);
                let fc = energy(&xc)?;
                (xc, fc)
            } else {
                let xc = towards(&simplex[k].x, CONTRACTION);
                let fc = energy(&xc)?;
                (xc, fc)
            };
            nfev += 1;
            if fc < fr.min(worst) {
                simplex[k] = Vertex { x: xc, f: fc };
            } else {
                let anchor = simplex[0].x.clone();
                for v in simplex.iter_mut().skip(1) {
                    let mut x = &anchor + &((&v.x - &anchor) * SHRINK);
                    reflect_into_bounds(&mut x, lower, upper);
                    v.f = energy(&x)?;
                    v.x = x;
                }
                nfev += k;
            }
        }

        if nit % 50 == 0 {
            debug!(
                "Nelder-Mead {}: best={:.6e} spread={:.3e} nfev={}",
                nit,
                simplex[0].f,
                simplex[k].f - simplex[0].f,
                nfev
            );
        }
    }

    simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
    let Vertex { x, f } = simplex.swap_remove(0);
    if f >= FAILED_EVALUATION {
        debug!("Nelder-Mead: no vertex could be evaluated");
    }
    info!(
        "Nelder-Mead finished after {} iterations ({} evaluations): f={:.6e}, converged={}",
        nit, nfev, f, converged
    );
    Ok(NelderMeadReport {
        x,
        fun: f,
        nfev,
        nit,
        converged,
    })
}

/// Objective spread and simplex extent both below tolerance. Expects the
/// simplex sorted by objective.
fn simplex_converged(simplex: &[Vertex], free: &[usize], config: &NelderMeadConfig) -> bool {
    let best = &simplex[0];
    let spread = simplex[simplex.len() - 1].f - best.f;
    if spread > config.ftol_rel * (1.0 + best.f.abs()) {
        return false;
    }
    let scale = 1.0 + free.iter().map(|&j| best.x[j].abs()).fold(0.0, f64::max);
    simplex[1..].iter().all(|v| {
        free.iter()
            .all(|&j| (v.x[j] - best.x[j]).abs() <= config.xtol_rel * scale)
    })
}
