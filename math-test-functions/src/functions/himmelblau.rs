//! Himmelblau test problem

use ndarray::{Array1, array};

/// Himmelblau - 2D multimodal, two residuals
/// Global minima: f(x) = 0 at x = (3, 2), (-2.805118, 3.131312), (-3.779310, -3.283186), (3.584428, -1.848126)
/// Bounds: x_i in [-5, 5]
pub fn himmelblau(x: &Array1<f64>) -> Array1<f64> {
    let x1 = x[0];
    let x2 = x[1];
    array![x1 * x1 + x2 - 11.0, x1 + x2 * x2 - 7.0]
}
