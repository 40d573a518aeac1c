use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Running sum and count of above-cutoff ("non-dark") intensities.
///
/// Per-trace accumulators are merged into the stage-wide one only after the
/// trace passes validation, so rejected traces never skew the mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NondarkStats {
    pub sum: f64,
    pub count: usize,
}

impl NondarkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intensity: f64) {
        self.sum += intensity;
        self.count += 1;
    }

    pub fn merge(&mut self, other: NondarkStats) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean of the accumulated intensities, `None` when nothing was pushed.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Accumulates every element of `values` strictly above `cutoff`.
    pub fn scan(values: &ArrayD<f64>, cutoff: f64) -> Self {
        let mut stats = Self::new();
        for &value in values.iter() {
            if value > cutoff {
                stats.push(value);
            }
        }
        stats
    }
}
