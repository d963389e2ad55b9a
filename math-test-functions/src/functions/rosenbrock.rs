//! Rosenbrock test problem

use ndarray::Array1;

/// Rosenbrock - N-dimensional, 2(N-1) residuals
///
/// `r_{2i} = 10 (x_{i+1} - x_i²)`, `r_{2i+1} = 1 - x_i`, so that the sum of
/// squares is the classic `Σ 100 (x_{i+1} - x_i²)² + (1 - x_i)²`.
/// Global minimum: f(x) = 0 at x = (1, 1, ..., 1)
/// Bounds: x_i in [-2.048, 2.048]
pub fn rosenbrock(x: &Array1<f64>) -> Array1<f64> {
    let n = x.len().saturating_sub(1);
    let mut r = Array1::zeros(2 * n);
    for i in 0..n {
        r[2 * i] = 10.0 * (x[i + 1] - x[i] * x[i]);
        r[2 * i + 1] = 1.0 - x[i];
    }
    r
}
