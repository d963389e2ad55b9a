use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::AdaptiveConfig;
use crate::distinct_indices::distinct_indices;
use crate::population_stats::PopulationStats;

/// Mutant together with the control parameters it was built with.
pub(crate) struct SacpMutant {
    pub mutant: Array1<f64>,
    pub f: f64,
    pub cr: f64,
}

/// Self-adaptive control parameters derived from objective ranks.
///
/// Three random individuals are sorted into best `b`, middle `m` and worst
/// `w`. The mutation factor grows with the position of the middle one
/// between the extremes:
///
/// `F = f_min + (f_max - f_min) (e_m - e_b) / (e_w - e_b)`, `U = x_b + F (x_m - x_w)`.
///
/// Individuals worse than the population mean get a crossover rate scaled
/// between `cr_min` and `cr_max` by their rank in the population; the others
/// keep `cr_min` and stay close to their parent.
pub(crate) fn mutant_sacp<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    energies: &Array1<f64>,
    stats: &PopulationStats,
    adaptive: &AdaptiveConfig,
    rng: &mut R,
) -> SacpMutant {
    let mut idxs = distinct_indices(&[i], 3, pop.nrows(), rng);
    idxs.sort_by(|&a, &b| energies[a].total_cmp(&energies[b]));
    let (b, m, w) = (idxs[0], idxs[1], idxs[2]);

    let range = energies[w] - energies[b];
    let ratio = if range > 0.0 {
        (energies[m] - energies[b]) / range
    } else {
        0.0
    };
    let f = adaptive.f_min + (adaptive.f_max - adaptive.f_min) * ratio;

    let spread = stats.spread();
    let cr = if energies[i] > stats.mean && spread > 0.0 {
        adaptive.cr_min + (adaptive.cr_max - adaptive.cr_min) * (energies[i] - stats.min) / spread
    } else {
        adaptive.cr_min
    };

    let mutant = Zip::from(pop.row(b))
        .and(pop.row(m))
        .and(pop.row(w))
        .map_collect(|&xb, &xm, &xw| xb + f * (xm - xw));
    SacpMutant { mutant, f, cr }
}
