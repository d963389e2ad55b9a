//! Control points: map coordinates paired with their geographic position.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};

/// Minimum number of control points for a similarity fit with a residual.
pub const MIN_POINTS: usize = 3;

/// A point measured on the map together with its known latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Map x coordinate
    pub x: f64,
    /// Map y coordinate
    pub y: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Relative weight of both coordinates
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl ControlPoint {
    /// Unit-weight control point.
    pub fn new(x: f64, y: f64, lat: f64, lon: f64) -> Self {
        Self {
            x,
            y,
            lat,
            lon,
            weight: default_weight(),
        }
    }
}

/// Checks the point count and that every weight is a non-negative number.
pub fn validate_points(points: &[ControlPoint]) -> Result<()> {
    if points.len() < MIN_POINTS {
        return Err(FitError::InsufficientPoints {
            required: MIN_POINTS,
            got: points.len(),
        });
    }
    for (i, p) in points.iter().enumerate() {
        if !(p.weight.is_finite() && p.weight >= 0.0) {
            return Err(FitError::InvalidSetting {
                field: "weight",
                reason: format!("point {i} has weight {}", p.weight),
            });
        }
        if ![p.x, p.y, p.lat, p.lon].iter().all(|v| v.is_finite()) {
            return Err(FitError::InvalidSetting {
                field: "points",
                reason: format!("point {i} has a non-finite coordinate"),
            });
        }
    }
    Ok(())
}
