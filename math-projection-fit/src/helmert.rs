//! Closed-form 2-D similarity (Helmert) transform.
//!
//! The model maps projected coordinates `(X, Y)` onto the map:
//!
//! ```text
//! x = tx + a X - b Y
//! y = ty + b X + a Y        a = m cos α,  b = m sin α
//! ```
//!
//! With both point sets reduced to their weighted centroids the weighted
//! least-squares estimate of `(a, b)` is linear, and the translation follows
//! from the centroids.

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::{FitError, Result};
use crate::points::ControlPoint;

/// Similarity transform from projected to map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Helmert {
    /// `m cos α`
    pub a: f64,
    /// `m sin α`
    pub b: f64,
    /// Translation along x
    pub tx: f64,
    /// Translation along y
    pub ty: f64,
}

impl Helmert {
    /// Scale factor `m`.
    pub fn scale(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Rotation angle in degrees.
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }

    /// Transformed position of `(x, y)`.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.tx + self.a * x - self.b * y,
            self.ty + self.b * x + self.a * y,
        )
    }

    /// Weighted least-squares similarity from `projected` (`n x 2`) to the
    /// map coordinates of `points`.
    ///
    /// # Errors
    ///
    /// `FitError::Degenerate` when the weights sum to zero or the weighted
    /// projected points coincide.
    pub fn fit(projected: &Array2<f64>, points: &[ControlPoint]) -> Result<Self> {
        let weights = Array1::from_iter(points.iter().map(|p| p.weight));
        let map = map_coordinates(points);

        let (src, src_c) = center(projected, &weights)?;
        let (dst, dst_c) = center(&map, &weights)?;

        let mut s = 0.0;
        let mut num_a = 0.0;
        let mut num_b = 0.0;
        for ((p, q), &w) in src.outer_iter().zip(dst.outer_iter()).zip(weights.iter()) {
            s += w * (p[0] * p[0] + p[1] * p[1]);
            num_a += w * (p[0] * q[0] + p[1] * q[1]);
            num_b += w * (p[0] * q[1] - p[1] * q[0]);
        }

        let spread: f64 = projected
            .outer_iter()
            .zip(weights.iter())
            .map(|(p, &w)| w * (p[0] * p[0] + p[1] * p[1]))
            .sum();
        if !(s.is_finite() && s > f64::EPSILON * spread && s > 0.0) {
            return Err(FitError::Degenerate(
                "projected control points coincide".to_string(),
            ));
        }

        let a = num_a / s;
        let b = num_b / s;
        Ok(Self {
            a,
            b,
            tx: dst_c.0 - a * src_c.0 + b * src_c.1,
            ty: dst_c.1 - b * src_c.0 - a * src_c.1,
        })
    }
}

/// Map coordinates of `points` as an `n x 2` array.
pub fn map_coordinates(points: &[ControlPoint]) -> Array2<f64> {
    let mut out = Array2::zeros((points.len(), 2));
    for (mut row, p) in out.outer_iter_mut().zip(points) {
        row[0] = p.x;
        row[1] = p.y;
    }
    out
}

/// Weighted centroid of the rows of `coords`.
pub fn weighted_centroid(coords: &Array2<f64>, weights: &Array1<f64>) -> Result<(f64, f64)> {
    let total = weights.sum();
    if total.is_nan() || total <= 0.0 {
        return Err(FitError::Degenerate("weights sum to zero".to_string()));
    }
    let c = coords.t().dot(weights) / total;
    Ok((c[0], c[1]))
}

/// `coords` with the weighted centroid removed, and the centroid.
pub fn center(coords: &Array2<f64>, weights: &Array1<f64>) -> Result<(Array2<f64>, (f64, f64))> {
    let c = weighted_centroid(coords, weights)?;
    let mut out = coords.clone();
    out.column_mut(0).mapv_inplace(|v| v - c.0);
    out.column_mut(1).mapv_inplace(|v| v - c.1);
    Ok((out, c))
}
