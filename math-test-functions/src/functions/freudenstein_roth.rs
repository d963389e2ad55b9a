//! Freudenstein and Roth test problem

use ndarray::{Array1, array};

/// Freudenstein-Roth - 2D, two residuals, with a deceptive local minimum
/// f ≈ 48.98 near (11.41, -0.8968)
/// Global minimum: f(x) = 0 at x = (5, 4)
/// Bounds: x_i in [-10, 10]
pub fn freudenstein_roth(x: &Array1<f64>) -> Array1<f64> {
    let x1 = x[0];
    let x2 = x[1];
    array![
        -13.0 + x1 + ((5.0 - x2) * x2 - 2.0) * x2,
        -29.0 + x1 + ((x2 + 1.0) * x2 - 14.0) * x2,
    ]
}
