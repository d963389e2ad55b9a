//! Least-squares benchmark problems in residual form
//!
//! Every problem maps a parameter vector to a residual vector `r(x)`; the
//! objective seen by an optimizer is `rᵗ W r` (with `W = I` unless stated
//! otherwise). Metadata records bounds, known minima and a short description
//! so that optimizer tests can be written against a table of problems.

use ndarray::Array1;
use std::collections::HashMap;

pub mod functions;
pub use functions::*;

/// A residual-form problem.
pub type ResidualFn = fn(&Array1<f64>) -> Array1<f64>;

/// Table entry describing one problem.
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    /// Lookup key for [`residual_function`]
    pub name: String,
    /// Search box, one `(lower, upper)` pair per variable
    pub bounds: Vec<(f64, f64)>,
    /// Known global minimizers with their sum of squares
    pub global_minima: Vec<(Vec<f64>, f64)>,
    /// Length of the residual vector at the listed dimension
    pub residuals: usize,
    /// One-line summary
    pub description: String,
    /// More than one local minimum
    pub multimodal: bool,
}

/// Unweighted objective `Σ r_i²`.
pub fn sum_of_squares(r: &Array1<f64>) -> f64 {
    r.dot(r)
}

/// Look up a problem by name.
pub fn residual_function(name: &str) -> Option<ResidualFn> {
    match name {
        "sphere" => Some(sphere),
        "rosenbrock" => Some(rosenbrock),
        "beale" => Some(beale),
        "booth" => Some(booth),
        "himmelblau" => Some(himmelblau),
        "freudenstein_roth" => Some(freudenstein_roth),
        _ => None,
    }
}

/// Metadata of every problem, keyed by name.
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    let entries = [
        FunctionMetadata {
            name: "beale".to_string(),
            bounds: vec![(-4.5, 4.5); 2],
            global_minima: vec![(vec![3.0, 0.5], 0.0)],
            residuals: 3,
            description: "Beale function, flat valley with steep walls".to_string(),
            multimodal: false,
        },
        FunctionMetadata {
            name: "booth".to_string(),
            bounds: vec![(-10.0, 10.0); 2],
            global_minima: vec![(vec![1.0, 3.0], 0.0)],
            residuals: 2,
            description: "Booth function, linear least squares".to_string(),
            multimodal: false,
        },
        FunctionMetadata {
            name: "freudenstein_roth".to_string(),
            bounds: vec![(-10.0, 10.0); 2],
            global_minima: vec![(vec![5.0, 4.0], 0.0)],
            residuals: 2,
            description: "Freudenstein and Roth function with a deceptive local minimum"
                .to_string(),
            multimodal: true,
        },
        FunctionMetadata {
            name: "himmelblau".to_string(),
            bounds: vec![(-5.0, 5.0); 2],
            global_minima: vec![
                (vec![3.0, 2.0], 0.0),
                (vec![-2.805118, 3.131312], 0.0),
                (vec![-3.779310, -3.283186], 0.0),
                (vec![3.584428, -1.848126], 0.0),
            ],
            residuals: 2,
            description: "Himmelblau function with four global minima".to_string(),
            multimodal: true,
        },
        FunctionMetadata {
            name: "rosenbrock".to_string(),
            bounds: vec![(-2.048, 2.048); 2],
            global_minima: vec![(vec![1.0, 1.0], 0.0)],
            residuals: 2,
            description: "Rosenbrock banana valley".to_string(),
            multimodal: false,
        },
        FunctionMetadata {
            name: "sphere".to_string(),
            bounds: vec![(-5.0, 5.0); 2],
            global_minima: vec![(vec![0.0, 0.0], 0.0)],
            residuals: 2,
            description: "Sphere function, residuals equal to the parameters".to_string(),
            multimodal: false,
        },
    ];
    entries
        .into_iter()
        .map(|meta| (meta.name.clone(), meta))
        .collect()
}
