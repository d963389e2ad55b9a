use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;
use crate::mutant_rand_to_dir1::better_worse;

pub(crate) fn mutant_rand_to_best_dir1<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    energies: &Array1<f64>,
    best_idx: usize,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_r1 + F * (x_best - x_r1) + F * (x_b - x_w)
    let idxs = distinct_indices(&[i, best_idx], 3, pop.nrows(), rng);
    let r1 = idxs[0];
    let (b, w) = better_worse(idxs[1], idxs[2], energies);
    let pull = Zip::from(pop.row(best_idx))
        .and(pop.row(r1))
        .and(pop.row(b))
        .and(pop.row(w))
        .map_collect(|&xbest, &x1, &xb, &xw| xbest - x1 + xb - xw);
    &pop.row(r1) + &(pull * f)
}
