use ndarray::{Array1, Array2};
use rand::Rng;

/// Uniform draw in `[lower, upper]` per dimension; fixed dimensions take `lower`.
pub(crate) fn init_random<R: Rng + ?Sized>(
    n: usize,
    npop: usize,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    is_free: &[bool],
    rng: &mut R,
) -> Array2<f64> {
    debug_assert_eq!(is_free.len(), n);
    Array2::from_shape_fn((npop, n), |(_, j)| {
        if is_free[j] {
            lower[j] + rng.random::<f64>() * (upper[j] - lower[j])
        } else {
            lower[j]
        }
    })
}
