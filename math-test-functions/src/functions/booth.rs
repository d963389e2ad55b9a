//! Booth test problem

use ndarray::{Array1, array};

/// Booth - 2D, linear residuals
/// Global minimum: f(x) = 0 at x = (1, 3)
/// Bounds: x_i in [-10, 10]
pub fn booth(x: &Array1<f64>) -> Array1<f64> {
    array![x[0] + 2.0 * x[1] - 7.0, 2.0 * x[0] + x[1] - 5.0]
}
