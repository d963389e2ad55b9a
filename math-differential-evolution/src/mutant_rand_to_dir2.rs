use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;
use crate::mutant_rand_to_dir1::better_worse;

pub(crate) fn mutant_rand_to_dir2<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    energies: &Array1<f64>,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_b1 + F/2 * (x_b1 - x_w1 + x_b2 - x_w2)
    let idxs = distinct_indices(&[i], 4, pop.nrows(), rng);
    let (b1, w1) = better_worse(idxs[0], idxs[1], energies);
    let (b2, w2) = better_worse(idxs[2], idxs[3], energies);

    let diff = Zip::from(pop.row(b1))
        .and(pop.row(w1))
        .and(pop.row(b2))
        .and(pop.row(w2))
        .map_collect(|&xb1, &xw1, &xb2, &xw2| xb1 - xw1 + xb2 - xw2);
    &pop.row(b1) + &(diff * f * 0.5)
}
