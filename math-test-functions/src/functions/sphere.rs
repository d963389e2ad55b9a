//! Sphere test problem

use ndarray::Array1;

/// Sphere - N-dimensional, residuals `r_i = x_i`
/// Global minimum: f(x) = 0 at x = (0, ..., 0)
/// Bounds: x_i in [-5, 5]
pub fn sphere(x: &Array1<f64>) -> Array1<f64> {
    x.clone()
}
