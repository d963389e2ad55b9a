use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

pub(crate) fn mutant_target_to_best1<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    best_idx: usize,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_i + F * (x_best - x_i) + F * (x_r1 - x_r2)
    let idxs = distinct_indices(&[i, best_idx], 2, pop.nrows(), rng);
    let pull = Zip::from(pop.row(best_idx))
        .and(pop.row(i))
        .and(pop.row(idxs[0]))
        .and(pop.row(idxs[1]))
        .map_collect(|&xbest, &xi, &x1, &x2| xbest - xi + x1 - x2);
    &pop.row(i) + &(pull * f)
}
