//! Seven-point stencil and Stirling's central-difference formulas.

use ndarray::Array1;

use crate::error::NumDiffError;

/// Number of samples in the stencil.
pub const STENCIL_SIZE: usize = 7;

/// Derivative order supported by the Stirling formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    /// f'
    First,
    /// f''
    Second,
}

impl TryFrom<u32> for DerivativeOrder {
    type Error = String;

    fn try_from(order: u32) -> Result<Self, Self::Error> {
        match order {
            1 => Ok(DerivativeOrder::First),
            2 => Ok(DerivativeOrder::Second),
            _ => Err(format!("unsupported derivative order {order}")),
        }
    }
}

/// Samples `f` with `arg[index]` shifted by `(i - 2) * h`, `i = 0..7`.
///
/// The remaining components of `arg` are held fixed. The stencil therefore
/// covers offsets `-2h ..= 4h` around `arg[index]`, and the Stirling formulas
/// below are centred on sample 3, i.e. on `arg[index] + h`.
pub fn compute_function_values<F, E>(
    f: &F,
    arg: &Array1<f64>,
    index: usize,
    h: f64,
) -> Result<[f64; STENCIL_SIZE], E>
where
    F: Fn(&Array1<f64>) -> Result<f64, E>,
    E: From<NumDiffError>,
{
    if index >= arg.len() {
        return Err(NumDiffError::VariableOutOfRange {
            index,
            dim: arg.len(),
        }
        .into());
    }
    if !(h.is_finite() && h > 0.0) {
        return Err(NumDiffError::InvalidStep { step: h }.into());
    }

    let mut shifted = arg.clone();
    let mut values = [0.0; STENCIL_SIZE];
    for (i, value) in values.iter_mut().enumerate() {
        shifted[index] = arg[index] + (i as f64 - 2.0) * h;
        *value = f(&shifted)?;
    }
    Ok(values)
}

/// Forward differences of orders 1 through 5 of `values`.
fn differences(values: &[f64; STENCIL_SIZE]) -> [Vec<f64>; 5] {
    let d1: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let d2: Vec<f64> = d1.windows(2).map(|w| w[1] - w[0]).collect();
    let d3: Vec<f64> = d2.windows(2).map(|w| w[1] - w[0]).collect();
    let d4: Vec<f64> = d3.windows(2).map(|w| w[1] - w[0]).collect();
    let d5: Vec<f64> = d4.windows(2).map(|w| w[1] - w[0]).collect();
    [d1, d2, d3, d4, d5]
}

/// Combines the stencil samples with Stirling's coefficients.
///
/// - `f'  ≈ ((Δ¹₂ + Δ¹₃)/2 - (Δ³₁ + Δ³₂)/12 + (Δ⁵₀ + Δ⁵₁)/60) / h`
/// - `f'' ≈ (Δ²₂ - Δ⁴₁/12 + (Δ⁵₁ - Δ⁵₀)/90) / h²`
pub fn compute_stirling_formula(
    values: &[f64; STENCIL_SIZE],
    order: DerivativeOrder,
    h: f64,
) -> f64 {
    let [d1, d2, d3, d4, d5] = differences(values);
    match order {
        DerivativeOrder::First => {
            ((d1[2] + d1[3]) / 2.0 - (d3[1] + d3[2]) / 12.0 + (d5[0] + d5[1]) / 60.0) / h
        }
        DerivativeOrder::Second => (d2[2] - d4[1] / 12.0 + (d5[1] - d5[0]) / 90.0) / (h * h),
    }
}
