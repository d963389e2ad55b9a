use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

pub(crate) fn mutant_rand_to_best1<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    best_idx: usize,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_r1 + F * (x_best - x_r1) + F * (x_r2 - x_r3)
    let idxs = distinct_indices(&[i, best_idx], 3, pop.nrows(), rng);
    let pull = Zip::from(pop.row(best_idx))
        .and(pop.row(idxs[0]))
        .and(pop.row(idxs[1]))
        .and(pop.row(idxs[2]))
        .map_collect(|&xbest, &x1, &x2, &x3| xbest - x1 + x2 - x3);
    &pop.row(idxs[0]) + &(pull * f)
}
