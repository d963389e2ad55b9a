use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Trial vector produced by binomial crossover.
#[derive(Debug, Clone)]
pub struct CrossoverOutcome {
    /// Trial vector
    pub trial: Array1<f64>,
    /// Components taken from the mutant by the CR draw
    pub swapped: usize,
    /// No component passed the CR draw and one was forced
    pub forced: bool,
}

/// Takes each component from `mutant` with probability `cr`.
///
/// When no component was taken, one uniformly chosen component is copied so
/// the trial always differs from its parent in at least one dimension.
pub(crate) fn binomial_crossover<R: Rng + ?Sized>(
    target: ArrayView1<f64>,
    mutant: &Array1<f64>,
    cr: f64,
    rng: &mut R,
) -> CrossoverOutcome {
    let n = target.len();
    let mut trial = target.to_owned();
    let mut swapped = 0;
    for j in 0..n {
        if rng.random::<f64>() < cr {
            trial[j] = mutant[j];
            swapped += 1;
        }
    }
    let forced = swapped == 0 && n > 0;
    if forced {
        let j = rng.random_range(0..n);
        trial[j] = mutant[j];
    }
    CrossoverOutcome {
        trial,
        swapped,
        forced,
    }
}
