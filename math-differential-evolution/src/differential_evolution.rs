use crate::{DEConfig, DEReport, DifferentialEvolution, Residuals, Result};
use math_carto_matrix::Matrix;
use ndarray::Array1;

/// Runs Differential Evolution on a residual functor.
///
/// Minimizes `r(x)ᵗ W r(x)` over `[lower, upper]`; `weights = None` means
/// `W = I`.
///
/// # Arguments
///
/// * `func` - The residual functor, mapping `&Array1<f64>` to a residual vector
/// * `lower`, `upper` - Bounds for each dimension
/// * `weights` - Optional square weight matrix
/// * `config` - DE configuration (use `DEConfigBuilder` to construct)
///
/// # Errors
///
/// Returns `DEError::BoundsMismatch` or `DEError::InvalidBounds` for bad
/// bounds, `DEError::InsufficientPopulation` when the population is smaller
/// than `dim + 1` (or than the strategy needs), `DEError::X0DimensionMismatch`
/// for a bad initial guess and `DEError::Weights` when `W` does not fit the
/// residuals.
///
/// # Example
///
/// ```rust
/// use math_carto_differential_evolution::{DEConfigBuilder, DEError, minimize};
/// use ndarray::{Array1, array};
///
/// let sphere = |x: &Array1<f64>| Ok::<_, String>(x.clone());
/// let config = DEConfigBuilder::new().population(2).build().unwrap();
/// let err = minimize(&sphere, array![-1.0, -1.0, -1.0], array![1.0, 1.0, 1.0], None, config);
/// assert!(matches!(err, Err(DEError::InsufficientPopulation { .. })));
/// ```
pub fn minimize<F>(
    func: &F,
    lower: Array1<f64>,
    upper: Array1<f64>,
    weights: Option<Matrix>,
    config: DEConfig,
) -> Result<DEReport>
where
    F: Residuals + ?Sized,
{
    let mut de = DifferentialEvolution::new(func, lower, upper)?;
    if let Some(w) = weights {
        de.set_weights(w)?;
    }
    *de.config_mut() = config;
    de.solve()
}
