use ndarray::Array1;

/// Objective summary of a population after a generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PopulationStats {
    /// Index of the best individual, first occurrence on ties
    pub best: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl PopulationStats {
    pub(crate) fn of(energies: &Array1<f64>) -> Self {
        let mut best = 0usize;
        let mut min = energies[0];
        let mut max = energies[0];
        for (i, &e) in energies.iter().enumerate() {
            if e < min {
                min = e;
                best = i;
            }
            if e > max {
                max = e;
            }
        }
        Self {
            best,
            min,
            max,
            mean: energies.mean().unwrap_or(min),
        }
    }

    pub(crate) fn spread(&self) -> f64 {
        self.max - self.min
    }
}
