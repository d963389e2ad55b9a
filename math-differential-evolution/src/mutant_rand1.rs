use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

pub(crate) fn mutant_rand1<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_r1 + F * (x_r2 - x_r3)
    let idxs = distinct_indices(&[i], 3, pop.nrows(), rng);
    let r1 = idxs[0];
    let r2 = idxs[1];
    let r3 = idxs[2];

    Zip::from(pop.row(r1))
        .and(pop.row(r2))
        .and(pop.row(r3))
        .and(f)
        .map_collect(|&x1, &x2, &x3, &fj| x1 + fj * (x2 - x3))
}
