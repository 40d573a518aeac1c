use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::math::stats::NondarkStats;

/// Shared configuration for each processing stage.
///
/// Replaces the per-run constants of the legacy conversion script; the
/// pipeline never reads configuration from anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub num_channels_in: usize,
    pub num_channels_out: usize,
    pub num_mocks: usize,
    pub num_cycles: usize,
    /// Intensities at or below this value count as dark.
    pub cutoff: f64,
    /// Bright cycles with an aspect ratio above this are treated as
    /// overlapping peptides and reject the trace.
    pub max_aspect_ratio: f64,
}

impl PipelineConfig {
    /// Edman cycles remaining once the mock cycles are trimmed.
    pub fn fixed_num_cycles(&self) -> usize {
        self.num_cycles.saturating_sub(self.num_mocks)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_channels_in: 1,
            num_channels_out: 3,
            num_mocks: 3,
            num_cycles: 9,
            cutoff: 1000.0,
            max_aspect_ratio: 1.5,
        }
    }
}

/// Input payload for a processing stage.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub radmat: ArrayD<f64>,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub radmat: ArrayD<f64>,
    pub metadata: StageMetadata,
}

/// Per-reason tally of traces dropped during filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub aspect_ratio: usize,
    pub bright_after_dark: usize,
    pub dark_at_boundary: usize,
}

impl RejectionCounts {
    pub fn total(&self) -> usize {
        self.aspect_ratio + self.bright_after_dark + self.dark_at_boundary
    }
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub accepted: Option<usize>,
    pub rejections: Option<RejectionCounts>,
    pub nondark: Option<NondarkStats>,
    pub normalization_mean: Option<f64>,
    pub notes: Vec<String>,
}

/// Common error type for pipeline execution.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no non-dark intensities survived filtering; cannot normalize")]
    NoSignal,
    #[error("npy read failure: {0}")]
    Npy(#[from] ndarray_npy::ReadNpyError),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Trait describing the sequential radiometry-processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &PipelineConfig) -> PipelineResult<()>;
    fn execute(&mut self, input: StageInput) -> PipelineResult<StageOutput>;
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_num_cycles_subtracts_mocks() {
        let config = PipelineConfig::default();
        assert_eq!(config.fixed_num_cycles(), 6);
    }

    #[test]
    fn rejection_counts_total_sums_reasons() {
        let counts = RejectionCounts {
            aspect_ratio: 2,
            bright_after_dark: 1,
            dark_at_boundary: 4,
        };
        assert_eq!(counts.total(), 7);
    }
}
