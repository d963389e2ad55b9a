use crate::{
    DEError, DEReport, DifferentialEvolution, FAILED_EVALUATION, Residuals, Result, Termination,
};
use log::trace;
use math_carto_matrix::Matrix;
use ndarray::{Array1, Array2};

// ------------------------------ Shared helpers ------------------------------

/// Checks that `[lower, upper]` is a box of non-empty intervals.
pub(crate) fn validate_bounds(lower: &Array1<f64>, upper: &Array1<f64>) -> Result<()> {
    if lower.len() != upper.len() {
        return Err(DEError::BoundsMismatch {
            lower_len: lower.len(),
            upper_len: upper.len(),
        });
    }
    for (index, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
        if lo > hi || lo.is_nan() || hi.is_nan() {
            return Err(DEError::InvalidBounds {
                index,
                lower: lo,
                upper: hi,
            });
        }
    }
    Ok(())
}

/// Objective `rᵗ W r` at `x`, or [`FAILED_EVALUATION`] when the functor
/// fails or the value is not finite. Only a weight matrix that does not fit
/// the residuals is an error.
pub(crate) fn weighted_energy<F>(func: &F, weights: Option<&Matrix>, x: &Array1<f64>) -> Result<f64>
where
    F: Residuals + ?Sized,
{
    let residuals = match func.residuals(x) {
        Ok(r) => r,
        Err(e) => {
            trace!("objective rejected at {}: {}", x, e);
            return Ok(FAILED_EVALUATION);
        }
    };
    let value = match weights {
        None => residuals.dot(&residuals),
        Some(w) => w.quadratic_form(&Matrix::column_vector(&residuals))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        trace!("objective rejected at {}: non-finite value {}", x, value);
        Ok(FAILED_EVALUATION)
    }
}

// ------------------------------ Internal helpers ------------------------------

impl<'a, F> DifferentialEvolution<'a, F>
where
    F: Residuals + ?Sized,
{
    pub(crate) fn energy(&self, x: &Array1<f64>) -> Result<f64> {
        weighted_energy(self.func, self.weights.as_ref(), x)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn finish_report(
        &self,
        pop: Array2<f64>,
        energies: Array1<f64>,
        x: Array1<f64>,
        fun: f64,
        termination: Termination,
        message: String,
        nit: usize,
        nfev: usize,
    ) -> DEReport {
        // not counted as an evaluation
        let residuals = self.func.residuals(&x).ok();
        DEReport {
            x,
            fun,
            success: termination.is_success(),
            termination,
            message,
            nit,
            nfev,
            residuals,
            population: pop,
            population_energies: energies,
        }
    }
}
