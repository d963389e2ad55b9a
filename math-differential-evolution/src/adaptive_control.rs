use ndarray::Array1;
use rand::Rng;

use crate::population_stats::PopulationStats;
use crate::{AdaptiveConfig, AdaptiveControl};

/// Range of the mutation factor in [`AdaptiveControl::RandomUniform`] mode.
pub const RANDOM_F_RANGE: (f64, f64) = (0.5, 1.0);

/// Control parameters used to build one trial vector.
#[derive(Debug, Clone)]
pub(crate) struct TrialParameters {
    /// Per-dimension mutation factor
    pub f: Array1<f64>,
    pub cr: f64,
}

/// Mutation factor and crossover rate carried across generations.
///
/// Population-wide modes rewrite `f` once per generation; the self-adaptive
/// mode keeps one `(F, CR)` pair per population slot instead.
#[derive(Debug, Clone)]
pub(crate) struct ControlState {
    mode: AdaptiveControl,
    base_f: f64,
    base_cr: f64,
    f: Array1<f64>,
    improved: bool,
    memory_f: Vec<f64>,
    memory_cr: Vec<f64>,
}

impl ControlState {
    pub(crate) fn new(mode: AdaptiveControl, f: f64, cr: f64, dim: usize, npop: usize) -> Self {
        let (memory_f, memory_cr) = if mode == AdaptiveControl::Sam {
            (vec![f; npop], vec![cr; npop])
        } else {
            (Vec::new(), Vec::new())
        };
        Self {
            mode,
            base_f: f,
            base_cr: cr,
            f: Array1::from_elem(dim, f),
            improved: false,
            memory_f,
            memory_cr,
        }
    }

    /// Current population-wide mutation factor.
    #[cfg(test)]
    pub(crate) fn f(&self) -> &Array1<f64> {
        &self.f
    }

    /// Per-generation update of the population-wide mutation factor.
    pub(crate) fn begin_generation<R: Rng + ?Sized>(
        &mut self,
        generation: usize,
        max_generations: usize,
        stats: &PopulationStats,
        adaptive: &AdaptiveConfig,
        rng: &mut R,
    ) {
        match self.mode {
            AdaptiveControl::Fixed | AdaptiveControl::Sam => {}
            AdaptiveControl::LinearDecrease => {
                let progress = generation as f64 / max_generations.max(1) as f64;
                let f = self.base_f - (self.base_f - adaptive.f_min) * progress;
                self.f.fill(f);
            }
            AdaptiveControl::RandomUniform => {
                let f = rng.random_range(RANDOM_F_RANGE.0..=RANDOM_F_RANGE.1);
                self.f.fill(f);
            }
            AdaptiveControl::Jitter => {
                let base = self.base_f;
                let amplitude = adaptive.jitter;
                self.f
                    .mapv_inplace(|_| base + amplitude * (rng.random::<f64>() - 0.5));
            }
            AdaptiveControl::Mfde => {
                let f = if self.improved {
                    // Ali and Törn: large steps while the objectives are spread
                    let ratio = if stats.max.abs() > 0.0 {
                        (stats.min / stats.max).abs()
                    } else {
                        1.0
                    };
                    adaptive.mfde_lower.max(1.0 - ratio)
                } else {
                    rng.random_range(adaptive.mfde_lower..=1.0)
                };
                self.f.fill(f);
            }
        }
    }

    /// Parameters for the trial of population slot `i`.
    pub(crate) fn trial_parameters<R: Rng + ?Sized>(
        &self,
        i: usize,
        adaptive: &AdaptiveConfig,
        rng: &mut R,
    ) -> TrialParameters {
        if self.mode != AdaptiveControl::Sam {
            return TrialParameters {
                f: self.f.clone(),
                cr: self.base_cr,
            };
        }
        let f = if rng.random::<f64>() < adaptive.tau {
            adaptive.f_min + rng.random::<f64>() * (adaptive.f_max - adaptive.f_min)
        } else {
            self.memory_f[i]
        };
        let cr = if rng.random::<f64>() < adaptive.tau {
            rng.random::<f64>()
        } else {
            self.memory_cr[i]
        };
        TrialParameters {
            f: Array1::from_elem(self.f.len(), f),
            cr,
        }
    }

    /// Remembers the parameters of an accepted trial.
    pub(crate) fn record_success(&mut self, i: usize, params: &TrialParameters) {
        if self.mode == AdaptiveControl::Sam {
            self.memory_f[i] = params.f.first().copied().unwrap_or(self.base_f);
            self.memory_cr[i] = params.cr;
        }
    }

    pub(crate) fn end_generation(&mut self, previous_min: f64, current_min: f64) {
        self.improved = current_min < previous_min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stats() -> PopulationStats {
        PopulationStats::of(&array![1.0, 2.0, 4.0])
    }

    #[test]
    fn test_fixed_mode_keeps_f() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = AdaptiveConfig::default();
        let mut state = ControlState::new(AdaptiveControl::Fixed, 0.7, 0.9, 3, 5);
        state.begin_generation(10, 100, &stats(), &cfg, &mut rng);
        assert_eq!(state.f(), &array![0.7, 0.7, 0.7]);
        let p = state.trial_parameters(2, &cfg, &mut rng);
        assert_eq!(p.cr, 0.9);
    }

    #[test]
    fn test_linear_decrease() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = AdaptiveConfig::default();
        let mut state = ControlState::new(AdaptiveControl::LinearDecrease, 0.9, 0.9, 2, 5);
        state.begin_generation(0, 100, &stats(), &cfg, &mut rng);
        assert_relative_eq!(state.f()[0], 0.9);
        state.begin_generation(50, 100, &stats(), &cfg, &mut rng);
        assert_relative_eq!(state.f()[0], 0.5 * (0.9 + cfg.f_min));
        state.begin_generation(100, 100, &stats(), &cfg, &mut rng);
        assert_relative_eq!(state.f()[1], cfg.f_min);
    }

    #[test]
    fn test_random_uniform_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = AdaptiveConfig::default();
        let mut state = ControlState::new(AdaptiveControl::RandomUniform, 0.8, 0.9, 4, 5);
        for g in 0..200 {
            state.begin_generation(g, 200, &stats(), &cfg, &mut rng);
            let f = state.f();
            assert!(f[0] >= 0.5 && f[0] <= 1.0);
            assert!(f.iter().all(|&v| v == f[0]));
        }
    }

    #[test]
    fn test_jitter_is_per_dimension() {
        let mut rng = StdRng::seed_from_u64(2);
        let cfg = AdaptiveConfig::default();
        let mut state = ControlState::new(AdaptiveControl::Jitter, 0.8, 0.9, 6, 5);
        state.begin_generation(1, 100, &stats(), &cfg, &mut rng);
        let f = state.f();
        assert!(f.iter().all(|&v| (v - 0.8).abs() <= 0.5 * cfg.jitter));
        assert!(f.iter().any(|&v| v != f[0]));
    }

    #[test]
    fn test_mfde_branches() {
        let mut rng = StdRng::seed_from_u64(3);
        let cfg = AdaptiveConfig::default();
        let mut state = ControlState::new(AdaptiveControl::Mfde, 0.8, 0.9, 2, 5);

        state.end_generation(2.0, 1.0);
        state.begin_generation(1, 100, &stats(), &cfg, &mut rng);
        // min/max = 1/4
        assert_relative_eq!(state.f()[0], 0.75);

        state.end_generation(1.0, 1.0);
        for g in 2..50 {
            state.begin_generation(g, 100, &stats(), &cfg, &mut rng);
            assert!(state.f()[0] >= cfg.mfde_lower && state.f()[0] <= 1.0);
        }
    }

    #[test]
    fn test_sam_memory_is_per_individual() {
        let mut rng = StdRng::seed_from_u64(4);
        let cfg = AdaptiveConfig::default();
        let mut state = ControlState::new(AdaptiveControl::Sam, 0.5, 0.9, 2, 3);
        let params = TrialParameters {
            f: array![0.33, 0.33],
            cr: 0.2,
        };
        state.record_success(1, &params);
        assert_eq!(state.memory_f, vec![0.5, 0.33, 0.5]);
        assert_eq!(state.memory_cr, vec![0.9, 0.2, 0.9]);

        // with tau = 0.1 most draws reuse the remembered pair
        let reused = (0..1000)
            .filter(|_| {
                let p = state.trial_parameters(1, &cfg, &mut rng);
                p.f[0] == 0.33 && p.cr == 0.2
            })
            .count();
        assert!(reused > 700 && reused < 900, "reused = {reused}");
    }
}
