//! Differential Evolution for weighted nonlinear least squares.
//!
//! This crate minimizes `f(x) = r(x)ᵗ W r(x)` over a bounding box, where
//! `r` is a residual functor that may fail (a failed or non-finite
//! evaluation rejects the candidate instead of aborting the run) and `W`
//! an optional weight matrix (identity when absent).
//!
//! # Features
//!
//! - Nine mutation strategies (rand/1, rand/2, rand-to-dir/1 and /2,
//!   rand-to-best/1 and /2, rand-to-best-dir/1, target-to-best/1, SACP)
//! - Binomial crossover with a forced swap when nothing crossed
//! - Six mutation-factor control modes, including per-dimension jitter,
//!   MFDE and self-adaptive (SAM) per-individual memory
//! - Generational replacement and reflection into the bounds
//! - A bounded Nelder-Mead simplex search on the same objective
//!
//! # Example
//!
//! ```rust
//! use math_carto_differential_evolution::{DEConfigBuilder, Strategy, minimize};
//! use ndarray::{Array1, array};
//!
//! // Booth function in residual form, minimum at (1, 3)
//! let booth = |x: &Array1<f64>| -> Result<Array1<f64>, String> {
//!     Ok(array![x[0] + 2.0 * x[1] - 7.0, 2.0 * x[0] + x[1] - 5.0])
//! };
//! let config = DEConfigBuilder::new()
//!     .population(20)
//!     .strategy(Strategy::Rand1)
//!     .seed(42)
//!     .build()
//!     .expect("valid config");
//!
//! let report = minimize(&booth, array![-10.0, -10.0], array![10.0, 10.0], None, config)
//!     .expect("optimization should run");
//! assert!(report.fun < 1e-4);
//! ```
#![warn(missing_docs)]

pub mod error;
pub use error::{DEError, Result};

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use math_carto_matrix::{Matrix, MatrixError};
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Per-generation mutation factor and crossover rate control.
pub mod adaptive_control;
/// Binomial crossover with forced swap.
pub mod crossover_binomial;
/// Rejection sampling of distinct population indices.
pub mod distinct_indices;
/// Random uniform initialization strategy.
pub mod init_random;
/// Mirroring of trial vectors into the bounding box.
pub mod reflect_bounds;

/// Rand/1 mutation strategy.
pub mod mutant_rand1;
/// Rand/2 mutation strategy.
pub mod mutant_rand2;
/// Rand-to-best/1 mutation strategy.
pub mod mutant_rand_to_best1;
/// Rand-to-best/2 mutation strategy.
pub mod mutant_rand_to_best2;
/// Rand-to-best-direction/1 mutation strategy.
pub mod mutant_rand_to_best_dir1;
/// Rand-to-direction/1 mutation strategy.
pub mod mutant_rand_to_dir1;
/// Rand-to-direction/2 mutation strategy.
pub mod mutant_rand_to_dir2;
/// Self-adaptive control parameter (SACP) mutation.
pub mod mutant_sacp;
/// Target-to-best/1 mutation strategy.
pub mod mutant_target_to_best1;

/// Tests for DE strategies, control modes and termination.
#[cfg(test)]
mod de_tests;
/// Convenience entry point.
pub mod differential_evolution;
/// Internal helper functions for DE implementation.
pub mod impl_helpers;
/// Bounded simplex search, used for local polishing.
pub mod nelder_mead;
/// Objective summary of the population.
pub(crate) mod population_stats;
/// Convergence and stagnation tests.
pub(crate) mod termination;

pub use crossover_binomial::CrossoverOutcome;
pub use differential_evolution::minimize;
pub use nelder_mead::{NelderMeadConfig, NelderMeadReport, nelder_mead};
pub use reflect_bounds::reflect_into_bounds;

use adaptive_control::ControlState;
use population_stats::PopulationStats;
use termination::ConvergenceMonitor;

/// Objective assigned to a candidate whose residuals could not be evaluated.
pub const FAILED_EVALUATION: f64 = 1e30;

/// Convergence is only declared once the best objective is below this value.
pub const CONVERGENCE_CEILING: f64 = 100.0;

/// Generations between two stagnation checks.
pub const STAGNATION_WINDOW: usize = 100;

/// Callback function type
pub type CallbackFn = Box<dyn FnMut(&DEIntermediate) -> CallbackAction>;

/// A residual functor `x -> r(x)`.
///
/// Implemented for every closure `Fn(&Array1<f64>) -> Result<Array1<f64>, E>`
/// with a displayable error; richer functors (holding observations, a
/// projection, ...) implement it directly.
pub trait Residuals {
    /// Error returned when the residuals cannot be evaluated at `x`.
    type Error: fmt::Display;

    /// Residual vector at `x`.
    fn residuals(&self, x: &Array1<f64>) -> std::result::Result<Array1<f64>, Self::Error>;
}

impl<F, E> Residuals for F
where
    F: Fn(&Array1<f64>) -> std::result::Result<Array1<f64>, E>,
    E: fmt::Display,
{
    type Error = E;

    fn residuals(&self, x: &Array1<f64>) -> std::result::Result<Array1<f64>, E> {
        self(x)
    }
}

/// Differential Evolution mutation strategy.
///
/// `b`/`w` denote the better/worse of a randomly drawn pair, `best` the best
/// individual of the current generation and `i` the target individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `x_r1 + F (x_r2 - x_r3)`
    Rand1,
    /// `x_r1 + F (x_r2 - x_r3 + x_r4 - x_r5)`
    Rand2,
    /// `x_b + F (x_b - x_w)`
    RandToDir1,
    /// `x_b1 + F/2 (x_b1 - x_w1 + x_b2 - x_w2)`
    RandToDir2,
    /// `x_r1 + F (x_best - x_r1) + F (x_r2 - x_r3)`
    RandToBest1,
    /// `x_r1 + F (x_best - x_r1) + F (x_r2 - x_r3 + x_r4 - x_r5)`
    RandToBest2,
    /// `x_r1 + F (x_best - x_r1) + F (x_b - x_w)`
    RandToBestDir1,
    /// `x_i + F (x_best - x_i) + F (x_r1 - x_r2)`
    TargetToBest1,
    /// Self-adaptive control parameters: F and CR re-derived per individual
    /// from objective ranks
    Sacp,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Strategy; 9] = [
        Strategy::Rand1,
        Strategy::Rand2,
        Strategy::RandToDir1,
        Strategy::RandToDir2,
        Strategy::RandToBest1,
        Strategy::RandToBest2,
        Strategy::RandToBestDir1,
        Strategy::TargetToBest1,
        Strategy::Sacp,
    ];

    /// Smallest population for which every distinct-index draw can succeed.
    pub fn min_population(&self) -> usize {
        match self {
            Strategy::RandToDir1 => 3,
            Strategy::Rand1 | Strategy::TargetToBest1 | Strategy::Sacp => 4,
            Strategy::RandToDir2 | Strategy::RandToBest1 | Strategy::RandToBestDir1 => 5,
            Strategy::Rand2 => 6,
            Strategy::RandToBest2 => 7,
        }
    }
}

impl FromStr for Strategy {
    type Err = DEError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let t: String = s
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '/' | ' '))
            .collect();
        match t.as_str() {
            "rand1" => Ok(Strategy::Rand1),
            "rand2" => Ok(Strategy::Rand2),
            "randtodir1" | "randtodirection1" => Ok(Strategy::RandToDir1),
            "randtodir2" | "randtodirection2" => Ok(Strategy::RandToDir2),
            "randtobest1" => Ok(Strategy::RandToBest1),
            "randtobest2" => Ok(Strategy::RandToBest2),
            "randtobestdir1" | "randtobestdirection1" => Ok(Strategy::RandToBestDir1),
            "targettobest1" => Ok(Strategy::TargetToBest1),
            "sacp" => Ok(Strategy::Sacp),
            _ => Err(DEError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Mutation factor control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdaptiveControl {
    /// Constant F.
    #[default]
    Fixed,
    /// F decreases linearly from its initial value to `f_min` at the last generation.
    LinearDecrease,
    /// F drawn uniformly in [0.5, 1.0] every generation.
    RandomUniform,
    /// Per-dimension F: `F0 + jitter (u - 0.5)`, redrawn every generation.
    Jitter,
    /// Branches on whether the best objective improved in the last generation.
    Mfde,
    /// Self-adaptive per-individual F and CR, mutated with probability `tau`.
    Sam,
}

impl AdaptiveControl {
    /// All control modes, in declaration order.
    pub const ALL: [AdaptiveControl; 6] = [
        AdaptiveControl::Fixed,
        AdaptiveControl::LinearDecrease,
        AdaptiveControl::RandomUniform,
        AdaptiveControl::Jitter,
        AdaptiveControl::Mfde,
        AdaptiveControl::Sam,
    ];
}

impl FromStr for AdaptiveControl {
    type Err = DEError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "fixed" | "none" => Ok(AdaptiveControl::Fixed),
            "linear" | "lineardecrease" => Ok(AdaptiveControl::LinearDecrease),
            "random" | "randomuniform" => Ok(AdaptiveControl::RandomUniform),
            "jitter" => Ok(AdaptiveControl::Jitter),
            "mfde" => Ok(AdaptiveControl::Mfde),
            "sam" | "selfadaptive" => Ok(AdaptiveControl::Sam),
            _ => Err(DEError::UnknownControl(s.to_string())),
        }
    }
}

/// Bounds and rates used by the adaptive control modes and by SACP.
#[derive(Debug, Clone)]
pub struct AdaptiveConfig {
    /// Lower mutation factor (end of linear decrease, SACP and SAM range)
    pub f_min: f64,
    /// Upper mutation factor (SACP and SAM range)
    pub f_max: f64,
    /// Lower crossover rate for SACP
    pub cr_min: f64,
    /// Upper crossover rate for SACP
    pub cr_max: f64,
    /// Amplitude of the per-dimension jitter
    pub jitter: f64,
    /// Lower mutation factor for MFDE
    pub mfde_lower: f64,
    /// Probability of redrawing F or CR in SAM mode
    pub tau: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            f_min: 0.1,
            f_max: 1.0,
            cr_min: 0.1,
            cr_max: 0.9,
            jitter: 0.001,
            mfde_lower: 0.4,
            tau: 0.1,
        }
    }
}

/// Configuration for the Differential Evolution optimizer.
pub struct DEConfig {
    /// Number of individuals (absolute, must be >= dim + 1).
    pub population: usize,
    /// Relative tolerance on the objective spread and on stagnation.
    pub epsilon: f64,
    /// Maximum number of generations.
    pub max_generations: usize,
    /// Initial mutation factor F in [0, 2].
    pub f: f64,
    /// Crossover probability CR in [0, 1].
    pub cr: f64,
    /// Mutation strategy.
    pub strategy: Strategy,
    /// Mutation factor control mode.
    pub control: AdaptiveControl,
    /// Bounds for the adaptive modes.
    pub adaptive: AdaptiveConfig,
    /// Optional random seed for reproducibility.
    pub seed: Option<u64>,
    /// Optional initial guess; seeds individual 0 when present.
    pub x0: Option<Array1<f64>>,
    /// Optional per-generation callback (may stop early).
    pub callback: Option<CallbackFn>,
}

impl Default for DEConfig {
    fn default() -> Self {
        Self {
            population: 20,
            epsilon: 1e-6,
            max_generations: 1000,
            f: 0.8,
            cr: 0.9,
            strategy: Strategy::Rand1,
            control: AdaptiveControl::default(),
            adaptive: AdaptiveConfig::default(),
            seed: None,
            x0: None,
            callback: None,
        }
    }
}

/// Fluent builder for `DEConfig` for ergonomic configuration.
///
/// # Example
///
/// ```rust
/// use math_carto_differential_evolution::{AdaptiveControl, DEConfigBuilder, Strategy};
///
/// let config = DEConfigBuilder::new()
///     .max_generations(500)
///     .population(20)
///     .strategy(Strategy::RandToBest1)
///     .control(AdaptiveControl::Jitter)
///     .f(0.6)
///     .cr(0.9)
///     .seed(42)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.population, 20);
/// ```
pub struct DEConfigBuilder {
    cfg: DEConfig,
}

impl Default for DEConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DEConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            cfg: DEConfig::default(),
        }
    }
    /// Sets the population size.
    pub fn population(mut self, v: usize) -> Self {
        self.cfg.population = v;
        self
    }
    /// Sets the convergence tolerance.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.cfg.epsilon = v;
        self
    }
    /// Sets the maximum number of generations.
    pub fn max_generations(mut self, v: usize) -> Self {
        self.cfg.max_generations = v;
        self
    }
    /// Sets the initial mutation factor.
    pub fn f(mut self, v: f64) -> Self {
        self.cfg.f = v;
        self
    }
    /// Sets the crossover probability.
    pub fn cr(mut self, v: f64) -> Self {
        self.cfg.cr = v;
        self
    }
    /// Sets the mutation strategy.
    pub fn strategy(mut self, v: Strategy) -> Self {
        self.cfg.strategy = v;
        self
    }
    /// Sets the mutation factor control mode.
    pub fn control(mut self, v: AdaptiveControl) -> Self {
        self.cfg.control = v;
        self
    }
    /// Sets the adaptive bounds.
    pub fn adaptive(mut self, v: AdaptiveConfig) -> Self {
        self.cfg.adaptive = v;
        self
    }
    /// Sets the random seed for reproducibility.
    pub fn seed(mut self, v: u64) -> Self {
        self.cfg.seed = Some(v);
        self
    }
    /// Sets an initial guess that seeds individual 0.
    pub fn x0(mut self, v: Array1<f64>) -> Self {
        self.cfg.x0 = Some(v);
        self
    }
    /// Sets a per-generation callback function.
    pub fn callback(mut self, cb: CallbackFn) -> Self {
        self.cfg.callback = Some(cb);
        self
    }
    /// Builds and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns `DEError::InvalidMutationFactor` if F is outside [0, 2] and
    /// `DEError::InvalidCrossoverRate` if CR is outside [0, 1].
    pub fn build(self) -> Result<DEConfig> {
        if !(0.0..=2.0).contains(&self.cfg.f) {
            return Err(DEError::InvalidMutationFactor { factor: self.cfg.f });
        }
        if !(0.0..=1.0).contains(&self.cfg.cr) {
            return Err(DEError::InvalidCrossoverRate { rate: self.cfg.cr });
        }
        Ok(self.cfg)
    }
}

/// Why the generation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Objective spread fell below `epsilon * max(1, min)` with `min < 100`.
    Converged,
    /// Best objective did not move over a stagnation window with `min < 100`.
    Stagnated,
    /// `max_generations` reached.
    MaxGenerations,
    /// The callback asked to stop.
    Callback,
    /// Every variable is fixed by its bounds; nothing to search.
    AllFixed,
}

impl Termination {
    /// Whether the run ended on a convergence criterion.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Termination::Converged | Termination::Stagnated | Termination::AllFixed
        )
    }
}

/// Result/report of a DE optimization run.
#[derive(Clone)]
pub struct DEReport {
    /// The best parameter vector.
    pub x: Array1<f64>,
    /// The objective value at `x`.
    pub fun: f64,
    /// Whether the optimization converged.
    pub success: bool,
    /// Reason the loop stopped.
    pub termination: Termination,
    /// Human-readable status message.
    pub message: String,
    /// Number of generations performed.
    pub nit: usize,
    /// Number of objective evaluations performed.
    pub nfev: usize,
    /// Residuals recomputed at `x`; `None` if the functor failed there.
    pub residuals: Option<Array1<f64>>,
    /// Final population matrix (NP x n).
    pub population: Array2<f64>,
    /// Objective values for each population member.
    pub population_energies: Array1<f64>,
}

impl fmt::Debug for DEReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DEReport")
            .field("x", &self.x)
            .field("fun", &self.fun)
            .field("success", &self.success)
            .field("termination", &self.termination)
            .field("message", &self.message)
            .field("nit", &self.nit)
            .field("nfev", &self.nfev)
            .field(
                "population",
                &format!("{}x{}", self.population.nrows(), self.population.ncols()),
            )
            .finish()
    }
}

/// Information passed to callback after each generation.
pub struct DEIntermediate {
    /// Current best solution vector.
    pub x: Array1<f64>,
    /// Current best objective value.
    pub fun: f64,
    /// Spread (max - min) of the population objectives.
    pub spread: f64,
    /// Mean population objective.
    pub mean: f64,
    /// Current generation number.
    pub iter: usize,
}

/// Action returned by callback to control optimization flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue optimization.
    Continue,
    /// Stop optimization at this generation boundary.
    Stop,
}

/// Differential Evolution optimizer.
///
/// Use [`DifferentialEvolution::new`] to create an instance, configure
/// with [`config_mut`](Self::config_mut) and [`set_weights`](Self::set_weights),
/// then call [`solve`](Self::solve).
pub struct DifferentialEvolution<'a, F>
where
    F: Residuals + ?Sized,
{
    func: &'a F,
    lower: Array1<f64>,
    upper: Array1<f64>,
    weights: Option<Matrix>,
    config: DEConfig,
}

impl<'a, F> DifferentialEvolution<'a, F>
where
    F: Residuals + ?Sized,
{
    /// Creates a new DE optimizer with residual functor `func` and bounds [lower, upper].
    ///
    /// # Errors
    ///
    /// Returns `DEError::BoundsMismatch` if `lower` and `upper` have different lengths.
    /// Returns `DEError::InvalidBounds` if any lower bound exceeds its corresponding upper bound.
    pub fn new(func: &'a F, lower: Array1<f64>, upper: Array1<f64>) -> Result<Self> {
        impl_helpers::validate_bounds(&lower, &upper)?;

        Ok(Self {
            func,
            lower,
            upper,
            weights: None,
            config: DEConfig::default(),
        })
    }

    /// Mutable access to configuration
    pub fn config_mut(&mut self) -> &mut DEConfig {
        &mut self.config
    }

    /// Sets the weight matrix `W` of the objective `rᵗ W r`.
    ///
    /// # Errors
    ///
    /// Returns `DEError::Weights` if `W` is not square. Compatibility with
    /// the residual length is checked at the first evaluation.
    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        if !weights.is_square() {
            return Err(MatrixError::NotSquare {
                rows: weights.rows(),
                cols: weights.cols(),
            }
            .into());
        }
        self.weights = Some(weights);
        Ok(())
    }

    /// Run the optimization and return a report
    ///
    /// # Errors
    ///
    /// Fails before any evaluation on an insufficient population or a
    /// mismatched initial guess, and during the run if the weight matrix
    /// does not match the residual length.
    pub fn solve(&mut self) -> Result<DEReport> {
        use crossover_binomial::binomial_crossover;
        use init_random::init_random;
        use mutant_rand_to_best_dir1::mutant_rand_to_best_dir1;
        use mutant_rand_to_best1::mutant_rand_to_best1;
        use mutant_rand_to_best2::mutant_rand_to_best2;
        use mutant_rand_to_dir1::mutant_rand_to_dir1;
        use mutant_rand_to_dir2::mutant_rand_to_dir2;
        use mutant_rand1::mutant_rand1;
        use mutant_rand2::mutant_rand2;
        use mutant_sacp::mutant_sacp;
        use mutant_target_to_best1::mutant_target_to_best1;

        let n = self.lower.len();

        // Identify fixed (equal-bounds) and free variables
        let is_free: Vec<bool> = (0..n).map(|i| self.upper[i] > self.lower[i]).collect();
        let n_free = is_free.iter().filter(|&&b| b).count();
        let npop = self.config.population;
        let required = (n + 1).max(self.config.strategy.min_population());
        if npop < required {
            return Err(DEError::InsufficientPopulation {
                population: npop,
                required,
            });
        }
        if let Some(x0) = &self.config.x0 {
            if x0.len() != n {
                return Err(DEError::X0DimensionMismatch {
                    expected: n,
                    got: x0.len(),
                });
            }
        }

        if n_free == 0 {
            let x = self.lower.clone();
            let f = self.energy(&x)?;
            return Ok(self.finish_report(
                x.clone().insert_axis(Axis(0)),
                Array1::from(vec![f]),
                x,
                f,
                Termination::AllFixed,
                "All variables fixed by bounds".into(),
                0,
                1,
            ));
        }

        info!(
            "DE start: {} dimensions ({} free), population={}, max_generations={}, strategy={:?}, control={:?}",
            n, n_free, npop, self.config.max_generations, self.config.strategy, self.config.control
        );

        let mut rng: StdRng = match self.config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut thread_rng = rand::rng();
                StdRng::from_rng(&mut thread_rng)
            }
        };

        let mut pop = init_random(n, npop, &self.lower, &self.upper, &is_free, &mut rng);
        if let Some(x0) = &self.config.x0 {
            let mut seeded = x0.clone();
            reflect_into_bounds(&mut seeded, &self.lower, &self.upper);
            pop.row_mut(0).assign(&seeded);
        }

        let mut energies = Array1::<f64>::zeros(npop);
        for (i, row) in pop.rows().into_iter().enumerate() {
            energies[i] = self.energy(&row.to_owned())?;
        }
        let mut nfev = npop;

        let mut stats = PopulationStats::of(&energies);
        debug!(
            "DE init: best={:.6e} mean={:.6e} spread={:.3e}",
            stats.min,
            stats.mean,
            stats.spread()
        );

        let adaptive = self.config.adaptive.clone();
        let mut control = ControlState::new(
            self.config.control,
            self.config.f,
            self.config.cr,
            n,
            npop,
        );

        let mut termination = Termination::MaxGenerations;
        let mut monitor = ConvergenceMonitor::new(self.config.epsilon, stats.min);
        let mut nit = 0;

        for generation in 1..=self.config.max_generations {
            nit = generation;
            control.begin_generation(
                generation,
                self.config.max_generations,
                &stats,
                &adaptive,
                &mut rng,
            );

            let best = stats.best;
            let mut next_pop = pop.clone();
            let mut next_energies = energies.clone();
            let mut accepted = 0usize;

            for i in 0..npop {
                let mut params = control.trial_parameters(i, &adaptive, &mut rng);
                let mutant = match self.config.strategy {
                    Strategy::Rand1 => mutant_rand1(i, &pop, &params.f, &mut rng),
                    Strategy::Rand2 => mutant_rand2(i, &pop, &params.f, &mut rng),
                    Strategy::RandToDir1 => {
                        mutant_rand_to_dir1(i, &pop, &energies, &params.f, &mut rng)
                    }
                    Strategy::RandToDir2 => {
                        mutant_rand_to_dir2(i, &pop, &energies, &params.f, &mut rng)
                    }
                    Strategy::RandToBest1 => {
                        mutant_rand_to_best1(i, &pop, best, &params.f, &mut rng)
                    }
                    Strategy::RandToBest2 => {
                        mutant_rand_to_best2(i, &pop, best, &params.f, &mut rng)
                    }
                    Strategy::RandToBestDir1 => {
                        mutant_rand_to_best_dir1(i, &pop, &energies, best, &params.f, &mut rng)
                    }
                    Strategy::TargetToBest1 => {
                        mutant_target_to_best1(i, &pop, best, &params.f, &mut rng)
                    }
                    Strategy::Sacp => {
                        let sacp = mutant_sacp(i, &pop, &energies, &stats, &adaptive, &mut rng);
                        params.f.fill(sacp.f);
                        params.cr = sacp.cr;
                        sacp.mutant
                    }
                };

                let mut trial = binomial_crossover(pop.row(i), &mutant, params.cr, &mut rng).trial;
                reflect_into_bounds(&mut trial, &self.lower, &self.upper);

                let trial_energy = self.energy(&trial)?;
                nfev += 1;

                // ties go to the trial
                if trial_energy <= energies[i] {
                    next_pop.row_mut(i).assign(&trial);
                    next_energies[i] = trial_energy;
                    control.record_success(i, &params);
                    accepted += 1;
                }
            }

            pop = next_pop;
            energies = next_energies;
            let previous_min = stats.min;
            stats = PopulationStats::of(&energies);
            control.end_generation(previous_min, stats.min);

            debug!(
                "DE gen {:4}  best={:.6e}  mean={:.6e}  spread={:.3e}  accepted={}/{}",
                generation,
                stats.min,
                stats.mean,
                stats.spread(),
                accepted,
                npop
            );

            if let Some(ref mut cb) = self.config.callback {
                let intermediate = DEIntermediate {
                    x: pop.row(stats.best).to_owned(),
                    fun: stats.min,
                    spread: stats.spread(),
                    mean: stats.mean,
                    iter: generation,
                };
                if cb(&intermediate) == CallbackAction::Stop {
                    termination = Termination::Callback;
                    break;
                }
            }

            if let Some(reason) = monitor.check(generation, &stats) {
                termination = reason;
                break;
            }
        }

        let message = match termination {
            Termination::Converged => format!(
                "Converged: spread={:.3e} at best={:.6e}",
                stats.spread(),
                stats.min
            ),
            Termination::Stagnated => format!(
                "Stagnated: best={:.6e} unchanged over {} generations",
                stats.min, STAGNATION_WINDOW
            ),
            Termination::Callback => "Optimization stopped by callback".to_string(),
            _ => format!(
                "Maximum generations reached: {}",
                self.config.max_generations
            ),
        };
        info!("DE finished after {} generations: {}", nit, message);

        let best_x = pop.row(stats.best).to_owned();
        Ok(self.finish_report(
            pop,
            energies,
            best_x,
            stats.min,
            termination,
            message,
            nit,
            nfev,
        ))
    }
}

#[cfg(test)]
mod strategy_tests {
    use super::*;

    #[test]
    fn test_parse_strategy_variants() {
        assert_eq!("rand/1".parse::<Strategy>(), Ok(Strategy::Rand1));
        assert_eq!("rand-to-dir/2".parse::<Strategy>(), Ok(Strategy::RandToDir2));
        assert_eq!(
            "rand_to_best_dir1".parse::<Strategy>(),
            Ok(Strategy::RandToBestDir1)
        );
        assert_eq!(
            "Target-To-Best/1".parse::<Strategy>(),
            Ok(Strategy::TargetToBest1)
        );
        assert_eq!("SACP".parse::<Strategy>(), Ok(Strategy::Sacp));
        assert_eq!(
            "best1bin".parse::<Strategy>(),
            Err(DEError::UnknownStrategy("best1bin".to_string()))
        );
    }

    #[test]
    fn test_parse_control_variants() {
        assert_eq!("fixed".parse::<AdaptiveControl>(), Ok(AdaptiveControl::Fixed));
        assert_eq!(
            "linear-decrease".parse::<AdaptiveControl>(),
            Ok(AdaptiveControl::LinearDecrease)
        );
        assert_eq!("MFDE".parse::<AdaptiveControl>(), Ok(AdaptiveControl::Mfde));
        assert_eq!("sam".parse::<AdaptiveControl>(), Ok(AdaptiveControl::Sam));
        assert_eq!(
            "cauchy".parse::<AdaptiveControl>(),
            Err(DEError::UnknownControl("cauchy".to_string()))
        );
    }

    #[test]
    fn test_min_population_covers_distinct_draws() {
        for s in Strategy::ALL {
            assert!(s.min_population() >= 3);
        }
        assert_eq!(Strategy::RandToBest2.min_population(), 7);
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            DEConfigBuilder::new().f(2.5).build(),
            Err(DEError::InvalidMutationFactor { .. })
        ));
        assert!(matches!(
            DEConfigBuilder::new().cr(-0.1).build(),
            Err(DEError::InvalidCrossoverRate { .. })
        ));
        assert!(DEConfigBuilder::new().f(2.0).cr(1.0).build().is_ok());
    }
}
