//! Ranks candidate projections by how well they explain the control points.

use std::sync::{Mutex, PoisonError};

use log::{info, warn};
use math_carto_differential_evolution::{FAILED_EVALUATION, Termination, minimize, nelder_mead};
use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{AnalysisMethod, AnalysisSettings};
use crate::error::{FitError, Result};
use crate::helmert::Helmert;
use crate::least_squares::least_squares;
use crate::points::{ControlPoint, validate_points};
use crate::projection::{PARAM_COUNT, Projection, ProjectionParams, RADIUS};
use crate::residual::HelmertResidual;

/// Best fit found for one candidate projection.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFit {
    /// Projection name
    pub projection: String,
    /// Fitted parameters
    pub params: ProjectionParams,
    /// Similarity transform onto the map
    pub helmert: Helmert,
    /// `rᵗ W r`
    pub objective: f64,
    /// Weighted root-mean-square distance between map and fitted points
    pub rms: f64,
    /// Method used
    pub method: AnalysisMethod,
    /// Optimizer generations (0 without global search)
    pub generations: usize,
    /// Objective evaluations by the global or simplex search
    pub evaluations: usize,
    /// Gauss-Newton or simplex iterations (0 without a local search)
    pub iterations: usize,
    /// Why the global search stopped
    #[serde(skip)]
    pub termination: Option<Termination>,
}

/// Search box for `projection`: the radius and every parameter the projection
/// ignores are pinned by equal bounds.
pub fn parameter_bounds(
    projection: &dyn Projection,
    settings: &AnalysisSettings,
) -> (Array1<f64>, Array1<f64>) {
    let mut lower = Array1::zeros(PARAM_COUNT);
    let mut upper = Array1::zeros(PARAM_COUNT);
    lower[RADIUS] = settings.radius;
    upper[RADIUS] = settings.radius;
    for &index in projection.free_parameters() {
        if let Some([lo, hi]) = settings.bounds.range(index) {
            lower[index] = lo;
            upper[index] = hi;
        }
    }
    (lower, upper)
}

/// Initial guess pinned to the search box, if one is configured.
fn initial_guess(settings: &AnalysisSettings) -> Option<Array1<f64>> {
    settings.initial.map(|p| {
        let mut v = p.to_vector();
        v[RADIUS] = settings.radius;
        v
    })
}

/// Fits one projection with the configured method and RNG seed.
pub fn fit_candidate(
    projection: &dyn Projection,
    points: &[ControlPoint],
    settings: &AnalysisSettings,
    seed: u64,
) -> Result<CandidateFit> {
    let residual = HelmertResidual::new(projection, points)?;
    let (lower, upper) = parameter_bounds(projection, settings);
    let free = projection.free_parameters();

    let mut x = initial_guess(settings).unwrap_or_else(|| (&lower + &upper) * 0.5);
    let mut generations = 0;
    let mut evaluations = 0;
    let mut iterations = 0;
    let mut termination = None;

    if settings.method == AnalysisMethod::NelderMead {
        let weights = residual.weight_matrix();
        let report = nelder_mead(
            &residual,
            x.clone(),
            &lower,
            &upper,
            Some(&weights),
            &settings.nelder_mead.to_config()?,
        )?;
        if report.fun >= FAILED_EVALUATION {
            return Err(FitError::Degenerate(format!(
                "{}: no parameter set could be evaluated",
                projection.name()
            )));
        }
        evaluations = report.nfev;
        iterations = report.nit;
        x = report.x;
    }

    if matches!(
        settings.method,
        AnalysisMethod::DifferentialEvolution | AnalysisMethod::Hybrid
    ) {
        let config = settings
            .optimizer
            .to_de_config(seed, initial_guess(settings))?;
        let report = minimize(
            &residual,
            lower.clone(),
            upper.clone(),
            Some(residual.weight_matrix()),
            config,
        )?;
        if report.fun >= FAILED_EVALUATION {
            return Err(FitError::Degenerate(format!(
                "{}: no parameter set could be evaluated",
                projection.name()
            )));
        }
        generations = report.nit;
        evaluations = report.nfev;
        termination = Some(report.termination);
        x = report.x;
    }

    if matches!(
        settings.method,
        AnalysisMethod::LeastSquares | AnalysisMethod::Hybrid
    ) {
        let before = residual.evaluate(&x).map(|(_, r)| residual.objective(&r));
        match least_squares(&residual, &x, &lower, &upper, free, &settings.least_squares) {
            Ok(ls) => {
                iterations = ls.iterations;
                if before.as_ref().map_or(true, |&b| ls.objective <= b) {
                    x = ls.x;
                }
            }
            // a least-squares failure after a global search keeps the optimizer result
            Err(e) if settings.method == AnalysisMethod::Hybrid => {
                warn!("{}: least-squares refinement failed, {e}", projection.name());
            }
            Err(e) => return Err(e),
        }
    }

    let (helmert, r) = residual.evaluate(&x)?;
    let objective = residual.objective(&r);
    let total_weight: f64 = points.iter().map(|p| p.weight).sum();
    Ok(CandidateFit {
        projection: projection.name().to_string(),
        params: ProjectionParams::from_vector(&x),
        helmert,
        objective,
        rms: (objective / total_weight).sqrt(),
        method: settings.method,
        generations,
        evaluations,
        iterations,
        termination,
    })
}

/// Fits every candidate in parallel and returns the successful fits, best
/// (lowest objective) first.
///
/// Candidate `i` runs with seed `seed + i`, so results are reproducible for a
/// fixed seed whatever the thread count. Candidates that fail are logged and
/// left out.
pub fn analyze(
    points: &[ControlPoint],
    candidates: &[Box<dyn Projection>],
    settings: &AnalysisSettings,
) -> Result<Vec<CandidateFit>> {
    validate_points(points)?;
    if candidates.is_empty() {
        return Err(FitError::InvalidSetting {
            field: "candidates",
            reason: "no candidate projection".to_string(),
        });
    }

    let base_seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        "analyzing {} points against {} projections ({:?}, seed {base_seed})",
        points.len(),
        candidates.len(),
        settings.method
    );

    let fits = Mutex::new(Vec::with_capacity(candidates.len()));
    candidates
        .par_iter()
        .enumerate()
        .for_each(|(index, projection)| {
            let seed = base_seed.wrapping_add(index as u64);
            match fit_candidate(projection.as_ref(), points, settings, seed) {
                Ok(fit) => {
                    info!(
                        "{}: objective={:.6e} rms={:.3e}",
                        fit.projection, fit.objective, fit.rms
                    );
                    fits.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(fit);
                }
                Err(e) => warn!("{}: skipped, {e}", projection.name()),
            }
        });

    let mut fits = fits.into_inner().unwrap_or_else(PoisonError::into_inner);
    fits.sort_by(|a, b| a.objective.total_cmp(&b.objective));
    Ok(fits)
}
