//! Numerical differentiation with Stirling's central differences
//!
//! Differentiates a scalar function of one selected component of a parameter
//! vector, holding the other components fixed. Seven samples are taken at
//! `arg[k] + (i - 2) h`, `i = 0..7`, and combined with Stirling's formulas
//! truncated after the fifth difference.
//!
//! The stencil is one step wider on the right than on the left and the
//! formulas are centred on the fourth sample, so the value returned is the
//! derivative at `arg[k] + h`. For small `h` this is an `O(h)` offset from
//! the derivative at `arg[k]`; polynomials up to degree six are
//! differentiated exactly at the shifted point.
//!
//! # Example
//!
//! ```rust
//! use math_carto_numdiff::{DerivativeOrder, derivative};
//! use ndarray::array;
//!
//! let f = |x: &ndarray::Array1<f64>| x[0] * x[0];
//! let d = derivative(&f, &array![3.0], DerivativeOrder::First, 0, 1e-4).unwrap();
//! assert!((d - 6.0).abs() < 1e-3);
//! ```

pub mod error;
pub mod stirling;

pub use error::{NumDiffError, Result};
pub use stirling::{
    DerivativeOrder, STENCIL_SIZE, compute_function_values, compute_stirling_formula,
};

use ndarray::Array1;

/// Derivative of a fallible function with respect to `arg[index]`.
///
/// Errors from `f` and argument errors are both reported through `E`.
pub fn try_derivative<F, E>(
    f: &F,
    arg: &Array1<f64>,
    order: DerivativeOrder,
    index: usize,
    h: f64,
) -> std::result::Result<f64, E>
where
    F: Fn(&Array1<f64>) -> std::result::Result<f64, E>,
    E: From<NumDiffError>,
{
    let values = compute_function_values(f, arg, index, h)?;
    Ok(compute_stirling_formula(&values, order, h))
}

/// Derivative of an infallible function with respect to `arg[index]`.
///
/// # Errors
///
/// Returns `NumDiffError::VariableOutOfRange` when `index >= arg.len()` and
/// `NumDiffError::InvalidStep` when `h` is not a positive finite number.
pub fn derivative<F>(
    f: &F,
    arg: &Array1<f64>,
    order: DerivativeOrder,
    index: usize,
    h: f64,
) -> Result<f64>
where
    F: Fn(&Array1<f64>) -> f64,
{
    try_derivative(&|x: &Array1<f64>| Ok(f(x)), arg, order, index, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_square_first_derivative() {
        let f = |x: &Array1<f64>| x[0] * x[0];
        for x0 in [-2.0, 0.0, 0.5, 3.0] {
            let h = 1e-4;
            let d = derivative(&f, &array![x0], DerivativeOrder::First, 0, h).unwrap();
            // the stencil is centred on x0 + h
            assert_relative_eq!(d, 2.0 * (x0 + h), epsilon = 1e-8);
            assert!((d - 2.0 * x0).abs() < 10.0 * h);
        }
    }

    #[test]
    fn test_cube_first_derivative() {
        let f = |x: &Array1<f64>| x[0].powi(3);
        let h = 1e-3;
        for x0 in [-1.5, 1.0, 2.0] {
            let d = derivative(&f, &array![x0], DerivativeOrder::First, 0, h).unwrap();
            assert_relative_eq!(d, 3.0 * (x0 + h) * (x0 + h), epsilon = 1e-8);
            assert!((d - 3.0 * x0 * x0).abs() < 10.0 * h * (1.0 + x0.abs()));
        }
    }

    #[test]
    fn test_second_derivative() {
        let f = |x: &Array1<f64>| x[0].powi(3) + 2.0 * x[0] * x[0];
        let h = 1e-3;
        let x0 = 1.25;
        let d2 = derivative(&f, &array![x0], DerivativeOrder::Second, 0, h).unwrap();
        assert_relative_eq!(d2, 6.0 * (x0 + h) + 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_smooth_function_tolerance() {
        let f = |x: &Array1<f64>| x[0].sin() * x[1].exp();
        let arg = array![0.7, -0.3];
        let h = 1e-5;
        let dx = derivative(&f, &arg, DerivativeOrder::First, 0, h).unwrap();
        let dy = derivative(&f, &arg, DerivativeOrder::First, 1, h).unwrap();
        assert!((dx - 0.7_f64.cos() * (-0.3_f64).exp()).abs() < 1e-4);
        assert!((dy - 0.7_f64.sin() * (-0.3_f64).exp()).abs() < 1e-4);
    }

    #[test]
    fn test_variable_out_of_range() {
        let f = |x: &Array1<f64>| x[0];
        let err = derivative(&f, &array![1.0, 2.0], DerivativeOrder::First, 2, 1e-3);
        assert_eq!(
            err,
            Err(NumDiffError::VariableOutOfRange { index: 2, dim: 2 })
        );
    }

    #[test]
    fn test_invalid_step() {
        let f = |x: &Array1<f64>| x[0];
        assert!(derivative(&f, &array![1.0], DerivativeOrder::First, 0, 0.0).is_err());
        assert!(derivative(&f, &array![1.0], DerivativeOrder::First, 0, f64::NAN).is_err());
    }

    #[test]
    fn test_function_error_propagates() {
        #[derive(Debug, PartialEq)]
        enum EvalError {
            Singular,
            Arg(NumDiffError),
        }
        impl From<NumDiffError> for EvalError {
            fn from(e: NumDiffError) -> Self {
                EvalError::Arg(e)
            }
        }

        let f = |x: &Array1<f64>| {
            if x[0] > 1.0 {
                Err(EvalError::Singular)
            } else {
                Ok(x[0])
            }
        };
        let r = try_derivative(&f, &array![0.999], DerivativeOrder::First, 0, 1e-3);
        assert_eq!(r, Err(EvalError::Singular));
    }
}
