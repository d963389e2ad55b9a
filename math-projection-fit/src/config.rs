//! JSON configuration for projection fitting

use std::fs;
use std::path::Path;
use std::str::FromStr;

use math_carto_differential_evolution::{
    AdaptiveControl, DEConfig, DEConfigBuilder, NelderMeadConfig, Strategy,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::points::ControlPoint;
use crate::projection::{Projection, ProjectionParams, projection_by_name, reference_catalog};

/// Complete fitting job loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Control points
    pub points: Vec<ControlPoint>,
    /// Candidate projection names (empty means the whole catalogue)
    #[serde(default)]
    pub candidates: Vec<String>,
    /// Analysis settings
    #[serde(flatten)]
    pub settings: AnalysisSettings,
}

impl FitConfig {
    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save configuration to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolves the candidate names against the projection catalogue.
    pub fn candidate_projections(&self) -> Result<Vec<Box<dyn Projection>>> {
        if self.candidates.is_empty() {
            return Ok(reference_catalog());
        }
        self.candidates
            .iter()
            .map(|name| projection_by_name(name))
            .collect()
    }
}

/// How each candidate projection is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    /// Global search only
    DifferentialEvolution,
    /// Gauss-Newton from the initial guess (or the centre of the bounds)
    LeastSquares,
    /// Global search polished by Gauss-Newton
    #[default]
    Hybrid,
    /// Simplex search from the initial guess (or the centre of the bounds)
    NelderMead,
}

impl FromStr for AnalysisMethod {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "de" | "differentialevolution" => Ok(AnalysisMethod::DifferentialEvolution),
            "ls" | "leastsquares" | "gaussnewton" => Ok(AnalysisMethod::LeastSquares),
            "hybrid" => Ok(AnalysisMethod::Hybrid),
            "nm" | "neldermead" | "simplex" => Ok(AnalysisMethod::NelderMead),
            _ => Err(FitError::InvalidSetting {
                field: "method",
                reason: format!("unknown analysis method: {s}"),
            }),
        }
    }
}

/// Settings shared by every candidate fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Sphere radius, held fixed during the fit
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Search ranges of the angular parameters
    #[serde(default)]
    pub bounds: ParameterBounds,
    /// Fitting method
    #[serde(default)]
    pub method: AnalysisMethod,
    /// Base random seed; candidate `i` uses `seed + i`
    #[serde(default)]
    pub seed: Option<u64>,
    /// Initial guess, seeds the optimizer population and the least-squares start
    #[serde(default)]
    pub initial: Option<ProjectionParams>,
    /// Differential Evolution settings
    #[serde(default)]
    pub optimizer: OptimizerSettings,
    /// Gauss-Newton settings
    #[serde(default)]
    pub least_squares: LeastSquaresSettings,
    /// Simplex search settings
    #[serde(default)]
    pub nelder_mead: NelderMeadSettings,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            bounds: ParameterBounds::default(),
            method: AnalysisMethod::default(),
            seed: None,
            initial: None,
            optimizer: OptimizerSettings::default(),
            least_squares: LeastSquaresSettings::default(),
            nelder_mead: NelderMeadSettings::default(),
        }
    }
}

fn default_radius() -> f64 {
    6371.0
}

/// Closed intervals `[lower, upper]` in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterBounds {
    /// First standard parallel or centre latitude
    #[serde(default = "default_latitude_range")]
    pub lat1: [f64; 2],
    /// Second standard parallel
    #[serde(default = "default_latitude_range")]
    pub lat2: [f64; 2],
    /// Central meridian
    #[serde(default = "default_longitude_range")]
    pub lon0: [f64; 2],
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            lat1: default_latitude_range(),
            lat2: default_latitude_range(),
            lon0: default_longitude_range(),
        }
    }
}

fn default_latitude_range() -> [f64; 2] {
    [-80.0, 80.0]
}

fn default_longitude_range() -> [f64; 2] {
    [-180.0, 180.0]
}

impl ParameterBounds {
    /// Configured range of parameter-vector component `index`.
    pub fn range(&self, index: usize) -> Option<[f64; 2]> {
        match index {
            crate::projection::LAT1 => Some(self.lat1),
            crate::projection::LAT2 => Some(self.lat2),
            crate::projection::LON0 => Some(self.lon0),
            _ => None,
        }
    }
}

/// Differential Evolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Population size
    #[serde(default = "default_population")]
    pub population: usize,
    /// Convergence threshold
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Generation limit
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Mutation factor
    #[serde(default = "default_f")]
    pub f: f64,
    /// Crossover rate
    #[serde(default = "default_cr")]
    pub cr: f64,
    /// Mutation strategy name, e.g. `rand1` or `rand-to-best/1`
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Adaptive control mode name, e.g. `jitter` or `sam`
    #[serde(default = "default_control")]
    pub control: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            population: default_population(),
            epsilon: default_epsilon(),
            max_generations: default_max_generations(),
            f: default_f(),
            cr: default_cr(),
            strategy: default_strategy(),
            control: default_control(),
        }
    }
}

fn default_population() -> usize {
    30
}

fn default_epsilon() -> f64 {
    1e-10
}

fn default_max_generations() -> usize {
    1500
}

fn default_f() -> f64 {
    0.7
}

fn default_cr() -> f64 {
    0.9
}

fn default_strategy() -> String {
    "rand1".to_string()
}

fn default_control() -> String {
    "jitter".to_string()
}

impl OptimizerSettings {
    /// Optimizer configuration for one run.
    pub fn to_de_config(&self, seed: u64, x0: Option<Array1<f64>>) -> Result<DEConfig> {
        let strategy: Strategy = self.strategy.parse()?;
        let control: AdaptiveControl = self.control.parse()?;
        let mut builder = DEConfigBuilder::new()
            .population(self.population)
            .epsilon(self.epsilon)
            .max_generations(self.max_generations)
            .f(self.f)
            .cr(self.cr)
            .strategy(strategy)
            .control(control)
            .seed(seed);
        if let Some(x0) = x0 {
            builder = builder.x0(x0);
        }
        Ok(builder.build()?)
    }
}

/// Gauss-Newton settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeastSquaresSettings {
    /// Iteration limit
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Relative step-norm tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Stirling step for the Jacobian, in degrees
    #[serde(default = "default_diff_step")]
    pub diff_step: f64,
}

impl Default for LeastSquaresSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            diff_step: default_diff_step(),
        }
    }
}

fn default_max_iterations() -> usize {
    50
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_diff_step() -> f64 {
    1e-5
}

/// Nelder-Mead settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NelderMeadSettings {
    /// Evaluation budget
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
    /// Relative tolerance on the objective spread
    #[serde(default = "default_ftol_rel")]
    pub ftol_rel: f64,
    /// Relative tolerance on the simplex extent
    #[serde(default = "default_xtol_rel")]
    pub xtol_rel: f64,
    /// Initial simplex edge as a fraction of each search interval
    #[serde(default = "default_initial_step")]
    pub initial_step: f64,
}

impl Default for NelderMeadSettings {
    fn default() -> Self {
        Self {
            max_evaluations: default_max_evaluations(),
            ftol_rel: default_ftol_rel(),
            xtol_rel: default_xtol_rel(),
            initial_step: default_initial_step(),
        }
    }
}

fn default_max_evaluations() -> usize {
    2000
}

fn default_ftol_rel() -> f64 {
    1e-12
}

fn default_xtol_rel() -> f64 {
    1e-10
}

fn default_initial_step() -> f64 {
    0.1
}

impl NelderMeadSettings {
    /// Simplex search configuration.
    pub fn to_config(&self) -> Result<NelderMeadConfig> {
        if !(self.initial_step > 0.0 && self.initial_step <= 1.0) {
            return Err(FitError::InvalidSetting {
                field: "nelder_mead.initial_step",
                reason: format!("{} is not in (0, 1]", self.initial_step),
            });
        }
        Ok(NelderMeadConfig {
            max_evaluations: Some(self.max_evaluations),
            ftol_rel: self.ftol_rel,
            xtol_rel: self.xtol_rel,
            initial_step: self.initial_step,
        })
    }
}
