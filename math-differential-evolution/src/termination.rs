use crate::population_stats::PopulationStats;
use crate::{CONVERGENCE_CEILING, STAGNATION_WINDOW, Termination};

/// Convergence and stagnation tests applied after every generation.
#[derive(Debug, Clone)]
pub(crate) struct ConvergenceMonitor {
    epsilon: f64,
    window_min: f64,
}

impl ConvergenceMonitor {
    pub(crate) fn new(epsilon: f64, initial_min: f64) -> Self {
        Self {
            epsilon,
            window_min: initial_min,
        }
    }

    /// Stops when `max - min < ε max(1, min)`, or every
    /// [`STAGNATION_WINDOW`] generations when the best objective moved by
    /// less than the same threshold. Both require `min <` [`CONVERGENCE_CEILING`].
    pub(crate) fn check(&mut self, generation: usize, stats: &PopulationStats) -> Option<Termination> {
        let threshold = self.epsilon * stats.min.max(1.0);
        let below_ceiling = stats.min < CONVERGENCE_CEILING;
        if stats.spread() < threshold && below_ceiling {
            return Some(Termination::Converged);
        }
        if generation % STAGNATION_WINDOW == 0 {
            let stalled = (stats.min - self.window_min).abs() < threshold;
            self.window_min = stats.min;
            if stalled && below_ceiling {
                return Some(Termination::Stagnated);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_converged_on_small_spread() {
        let mut m = ConvergenceMonitor::new(1e-6, 10.0);
        let stats = PopulationStats::of(&array![1e-8, 5e-7, 2e-7]);
        assert_eq!(m.check(3, &stats), Some(Termination::Converged));
    }

    #[test]
    fn test_threshold_is_relative_above_one() {
        let mut m = ConvergenceMonitor::new(1e-6, 100.0);
        // spread 2e-6 < 1e-6 * 50
        let stats = PopulationStats::of(&array![50.0, 50.000002]);
        assert_eq!(m.check(1, &stats), Some(Termination::Converged));
    }

    #[test]
    fn test_ceiling_blocks_convergence() {
        let mut m = ConvergenceMonitor::new(1e-6, 1e30);
        let stats = PopulationStats::of(&array![1e30, 1e30, 1e30]);
        for g in 1..=300 {
            assert_eq!(m.check(g, &stats), None);
        }
        let stats = PopulationStats::of(&array![150.0, 150.0]);
        assert_eq!(m.check(400, &stats), None);
    }

    #[test]
    fn test_stagnation_only_on_window_boundary() {
        let mut m = ConvergenceMonitor::new(1e-6, 2.0);
        let stats = PopulationStats::of(&array![2.0, 7.0]);
        // best never moves away from the initial 2.0
        for g in 1..100 {
            assert_eq!(m.check(g, &stats), None);
        }
        assert_eq!(m.check(100, &stats), Some(Termination::Stagnated));
    }

    #[test]
    fn test_progress_resets_window() {
        let mut m = ConvergenceMonitor::new(1e-6, 5.0);
        let first = PopulationStats::of(&array![3.0, 7.0]);
        assert_eq!(m.check(100, &first), None);
        let second = PopulationStats::of(&array![2.5, 7.0]);
        assert_eq!(m.check(200, &second), None);
        assert_eq!(m.check(300, &second), Some(Termination::Stagnated));
    }
}
