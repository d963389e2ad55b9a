use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

pub(crate) fn mutant_rand_to_best2<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    best_idx: usize,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_r1 + F * (x_best - x_r1) + F * (x_r2 - x_r3 + x_r4 - x_r5)
    let idxs = distinct_indices(&[i, best_idx], 5, pop.nrows(), rng);
    let base = pop.row(idxs[0]);
    let diff = Zip::from(pop.row(idxs[1]))
        .and(pop.row(idxs[2]))
        .and(pop.row(idxs[3]))
        .and(pop.row(idxs[4]))
        .map_collect(|&x2, &x3, &x4, &x5| x2 - x3 + x4 - x5);
    let pull = &pop.row(best_idx) - &base + diff;
    &base + &(pull * f)
}
