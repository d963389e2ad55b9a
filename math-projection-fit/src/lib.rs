//! Map projection detection by parameter fitting
//!
//! Given control points with known map coordinates and geographic positions,
//! each candidate projection is fitted by searching its parameters (standard
//! parallels, central meridian) so that the projected points, after the best
//! 2-D similarity transform, land as close as possible to the map positions.
//! Candidates are then ranked by the weighted residual sum of squares.
//!
//! # Features
//!
//! - **Projections**: a `Send + Sync` [`Projection`] trait and a small
//!   reference catalogue
//! - **Helmert transform**: closed-form weighted similarity fit
//! - **Global search**: Differential Evolution over the residual functor
//! - **Refinement**: Gauss-Newton with a numerical Jacobian and pseudo-inverse
//! - **Simplex search**: bounded Nelder-Mead as a derivative-free local path
//! - **Driver**: all candidates in parallel with per-candidate seeds
//!
//! # Example
//!
//! ```rust
//! use math_carto_projection_fit::{
//!     AnalysisSettings, ControlPoint, Projection, ProjectionParams, Sinusoidal, analyze,
//!     reference_catalog,
//! };
//!
//! let truth = ProjectionParams { lon0: 10.0, ..ProjectionParams::default() };
//! let mut points = Vec::new();
//! for lat in [-30.0, 0.0, 30.0] {
//!     for lon in [-20.0, 10.0, 40.0] {
//!         let (x, y) = Sinusoidal.project(lat, lon, &truth)?;
//!         points.push(ControlPoint::new(x / 1000.0, y / 1000.0, lat, lon));
//!     }
//! }
//!
//! let mut settings = AnalysisSettings::default();
//! settings.seed = Some(1);
//! let fits = analyze(&points, &reference_catalog(), &settings)?;
//! assert_eq!(fits[0].projection, "sinusoidal");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod helmert;
pub mod jacobian;
pub mod least_squares;
pub mod points;
pub mod projection;
pub mod residual;

pub use config::{
    AnalysisMethod, AnalysisSettings, FitConfig, LeastSquaresSettings, NelderMeadSettings,
    OptimizerSettings, ParameterBounds,
};
pub use driver::{CandidateFit, analyze, fit_candidate, parameter_bounds};
pub use error::{FitError, Result};
pub use helmert::Helmert;
pub use jacobian::JacobianFunctor;
pub use least_squares::{LeastSquaresReport, least_squares};
pub use points::{ControlPoint, MIN_POINTS};
pub use projection::{
    EquidistantConic, Equirectangular, LambertAzimuthal, Mercator, Projection, ProjectionError,
    ProjectionParams, Sinusoidal, projection_by_name, reference_catalog,
};
pub use residual::HelmertResidual;
