use ndarray::ArrayD;

use crate::prelude::{PipelineConfig, PipelineError, PipelineResult};

/// Per-cycle features recorded on the slide: intensity and aspect ratio.
pub const NUM_FEATURES: usize = 2;

/// Named view of the raw radmat axes.
///
/// The `.npy` input is stored as `[channel_in, cycle, feature, trace]`.
/// Keeping the axis meanings in one place avoids the silent misalignment
/// that positional reshapes invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadmatLayout {
    pub channels_in: usize,
    pub cycles: usize,
    pub features: usize,
    pub traces: usize,
}

impl RadmatLayout {
    pub fn from_shape(shape: &[usize], config: &PipelineConfig) -> PipelineResult<Self> {
        if shape.len() != 4 {
            return Err(PipelineError::ShapeMismatch(format!(
                "expected 4-D radmat [channel, cycle, feature, trace], got {} dims",
                shape.len()
            )));
        }
        let layout = Self {
            channels_in: shape[0],
            cycles: shape[1],
            features: shape[2],
            traces: shape[3],
        };
        if layout.channels_in != config.num_channels_in {
            return Err(PipelineError::ShapeMismatch(format!(
                "radmat has {} input channels, configured for {}",
                layout.channels_in, config.num_channels_in
            )));
        }
        if layout.cycles != config.num_cycles {
            return Err(PipelineError::ShapeMismatch(format!(
                "radmat has {} cycles, configured for {}",
                layout.cycles, config.num_cycles
            )));
        }
        if layout.features != NUM_FEATURES {
            return Err(PipelineError::ShapeMismatch(format!(
                "radmat has {} features, expected {} (intensity, aspect ratio)",
                layout.features, NUM_FEATURES
            )));
        }
        Ok(layout)
    }

    /// Length of the merged (cycle, channel) axis after the reshape stage.
    pub fn cycle_positions(&self) -> usize {
        self.cycles * self.channels_in
    }
}

/// One (intensity, aspect ratio) measurement of a trace at a cycle position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSample {
    pub intensity: f64,
    pub aspect_ratio: f64,
}

impl CycleSample {
    /// Reads the sample at `(trace, position)` from a reshaped
    /// `[trace, cycle*channel, feature]` array.
    pub fn at(radmat: &ArrayD<f64>, trace: usize, position: usize) -> Self {
        Self {
            intensity: radmat[[trace, position, 0]],
            aspect_ratio: radmat[[trace, position, 1]],
        }
    }

    pub fn is_bright(&self, cutoff: f64) -> bool {
        self.intensity > cutoff
    }

    /// High or missing aspect ratios indicate two peptides sharing a peak.
    pub fn has_ambiguous_peak(&self, max_aspect_ratio: f64) -> bool {
        self.aspect_ratio > max_aspect_ratio || self.aspect_ratio == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_accepts_configured_shape() {
        let config = PipelineConfig::default();
        let layout = RadmatLayout::from_shape(&[1, 9, 2, 42], &config).unwrap();
        assert_eq!(layout.traces, 42);
        assert_eq!(layout.cycle_positions(), 9);
    }

    #[test]
    fn layout_rejects_wrong_dimensionality() {
        let config = PipelineConfig::default();
        let err = RadmatLayout::from_shape(&[9, 2, 42], &config).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch(_)));
    }

    #[test]
    fn layout_rejects_wrong_cycle_count() {
        let config = PipelineConfig::default();
        let err = RadmatLayout::from_shape(&[1, 7, 2, 42], &config).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch(_)));
    }

    #[test]
    fn aspect_ratio_at_limit_is_not_ambiguous() {
        let sample = CycleSample {
            intensity: 2000.0,
            aspect_ratio: 1.5,
        };
        assert!(!sample.has_ambiguous_peak(1.5));
        let zero = CycleSample {
            intensity: 2000.0,
            aspect_ratio: 0.0,
        };
        assert!(zero.has_ambiguous_peak(1.5));
    }
}
