use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

/// Orders two indices so that the first has the lower objective.
pub(crate) fn better_worse(a: usize, b: usize, energies: &Array1<f64>) -> (usize, usize) {
    if energies[a] <= energies[b] {
        (a, b)
    } else {
        (b, a)
    }
}

pub(crate) fn mutant_rand_to_dir1<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    energies: &Array1<f64>,
    f: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    // x_b + F * (x_b - x_w), stepping from the better of two random
    // individuals away from the worse one
    let idxs = distinct_indices(&[i], 2, pop.nrows(), rng);
    let (b, w) = better_worse(idxs[0], idxs[1], energies);

    Zip::from(pop.row(b))
        .and(pop.row(w))
        .and(f)
        .map_collect(|&xb, &xw, &fj| xb + fj * (xb - xw))
}
