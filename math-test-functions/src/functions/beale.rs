//! Beale test problem

use ndarray::{Array1, array};

/// Beale - 2D, three residuals
/// Global minimum: f(x) = 0 at x = (3, 0.5)
/// Bounds: x_i in [-4.5, 4.5]
pub fn beale(x: &Array1<f64>) -> Array1<f64> {
    let x1 = x[0];
    let x2 = x[1];
    array![
        1.5 - x1 + x1 * x2,
        2.25 - x1 + x1 * x2.powi(2),
        2.625 - x1 + x1 * x2.powi(3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sum_of_squares;
    use approx::assert_relative_eq;

    #[test]
    fn test_beale_minimum() {
        assert_relative_eq!(sum_of_squares(&beale(&array![3.0, 0.5])), 0.0);
    }

    #[test]
    fn test_beale_origin() {
        // 1.5² + 2.25² + 2.625²
        assert_relative_eq!(
            sum_of_squares(&beale(&array![0.0, 0.0])),
            14.203125,
            epsilon = 1e-12
        );
    }
}
