//! Running k-eff statistics over active iterations.

/// Running sum and sum of squares of k-eff samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeffStatistics {
    sum: f64,
    sum_of_squares: f64,
    count: usize,
}

impl KeffStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, k_eff: f64) {
        self.sum += k_eff;
        self.sum_of_squares += k_eff * k_eff;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Standard deviation of the mean; zero with fewer than two samples.
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = (self.sum_of_squares / n - mean * mean).max(0.0);
        (variance / (n - 1.0)).sqrt()
    }
}
