//! Map projections and their adjustable parameters.
//!
//! A projection maps geographic coordinates `(lat, lon)` in degrees onto the
//! plane. The parameters that a fit may adjust are bundled in
//! [`ProjectionParams`], which converts to and from the 4-element vector the
//! optimizers work on. Each projection reports which of those components it
//! actually depends on; the others are pinned by equal bounds.

use ndarray::{Array1, array};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod reference;

pub use reference::{
    EquidistantConic, Equirectangular, LambertAzimuthal, Mercator, Sinusoidal, projection_by_name,
    reference_catalog,
};

/// Position of the sphere radius in the parameter vector.
pub const RADIUS: usize = 0;
/// Position of the first standard parallel (or centre latitude).
pub const LAT1: usize = 1;
/// Position of the second standard parallel.
pub const LAT2: usize = 2;
/// Position of the central meridian.
pub const LON0: usize = 3;
/// Length of the parameter vector.
pub const PARAM_COUNT: usize = 4;

/// Failure to project a single point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The point lies where the projection is undefined.
    #[error("{projection}: point ({lat}, {lon}) is outside the projection domain")]
    OutOfDomain {
        /// Projection name
        projection: &'static str,
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lon: f64,
    },

    /// The parameters do not define a valid projection.
    #[error("{projection}: {reason}")]
    InvalidParameters {
        /// Projection name
        projection: &'static str,
        /// Why the parameters were rejected
        reason: String,
    },
}

/// Adjustable projection parameters, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    /// Sphere radius
    pub radius: f64,
    /// First standard parallel, or latitude of the projection centre
    pub lat1: f64,
    /// Second standard parallel
    pub lat2: f64,
    /// Central meridian
    pub lon0: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            radius: 6371.0,
            lat1: 0.0,
            lat2: 0.0,
            lon0: 0.0,
        }
    }
}

impl ProjectionParams {
    /// Reads `[radius, lat1, lat2, lon0]`; missing trailing components keep
    /// their default.
    pub fn from_vector(v: &Array1<f64>) -> Self {
        let d = Self::default();
        let at = |i: usize, fallback: f64| v.get(i).copied().unwrap_or(fallback);
        Self {
            radius: at(RADIUS, d.radius),
            lat1: at(LAT1, d.lat1),
            lat2: at(LAT2, d.lat2),
            lon0: at(LON0, d.lon0),
        }
    }

    /// `[radius, lat1, lat2, lon0]`
    pub fn to_vector(&self) -> Array1<f64> {
        array![self.radius, self.lat1, self.lat2, self.lon0]
    }
}

/// A map projection on the sphere.
///
/// Implementations must be pure: the same inputs always give the same
/// output, so the driver can evaluate them from several threads.
pub trait Projection: Send + Sync {
    /// Catalogue name, lowercase with underscores.
    fn name(&self) -> &'static str;

    /// Planar coordinates of `(lat, lon)`.
    fn project(&self, lat: f64, lon: f64, params: &ProjectionParams)
    -> Result<(f64, f64), ProjectionError>;

    /// Indices (into the parameter vector) of the parameters this projection
    /// depends on, radius excluded.
    fn free_parameters(&self) -> &'static [usize];
}

/// Longitude difference folded into `[-180, 180)`.
pub(crate) fn delta_lon(lon: f64, lon0: f64) -> f64 {
    (lon - lon0 + 180.0).rem_euclid(360.0) - 180.0
}
