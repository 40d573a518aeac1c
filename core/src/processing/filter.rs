use crate::math::stats::NondarkStats;
use crate::prelude::{
    PipelineConfig, PipelineError, PipelineResult, ProcessingStage, RejectionCounts, StageInput,
    StageMetadata, StageOutput,
};
use crate::radmat::{CycleSample, NUM_FEATURES};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use ndarray::{ArrayD, IxDyn};

/// Why a trace was dropped during filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    AmbiguousPeak,
    BrightAfterDark,
    DarkAtMockBoundary,
}

/// Validates each trace and rewrites it into a fixed-length radiometry.
///
/// Bright cycles carry their intensity into the fixed radiometry; dark
/// cycles stay zero. Traces failing validation are dropped silently, never
/// surfaced as errors. The bright-after-dark rule assumes a single dye
/// channel and must not be generalized without new design input.
pub struct FilterStage {
    config: Option<PipelineConfig>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl FilterStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Scans one trace, producing its fixed radiometry and the local non-dark
/// stats to commit on acceptance.
fn fix_trace(
    radmat: &ArrayD<f64>,
    trace: usize,
    positions: usize,
    config: &PipelineConfig,
) -> Result<(Vec<f64>, NondarkStats), Rejection> {
    let mut fixedrad = vec![0.0; positions];
    let mut isdark = false;
    let mut local = NondarkStats::new();

    for position in 0..positions {
        let sample = CycleSample::at(radmat, trace, position);
        if sample.is_bright(config.cutoff) {
            if sample.has_ambiguous_peak(config.max_aspect_ratio) {
                return Err(Rejection::AmbiguousPeak);
            }
            if isdark {
                return Err(Rejection::BrightAfterDark);
            }
            fixedrad[position] = sample.intensity;
            local.push(sample.intensity);
        } else {
            // All-dark traces and mock-dark patterns fail at this boundary;
            // darkness among the mocks themselves is permitted.
            if position == config.num_mocks {
                return Err(Rejection::DarkAtMockBoundary);
            }
            isdark = true;
        }
    }

    Ok((fixedrad, local))
}

impl ProcessingStage for FilterStage {
    fn initialize(&mut self, config: &PipelineConfig) -> PipelineResult<()> {
        self.config = Some(config.clone());
        self.metrics.reset();
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> PipelineResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| PipelineError::Internal("stage not initialized".into()))?;

        let shape = input.radmat.shape();
        if shape.len() != 3 {
            return Err(PipelineError::InvalidInput(format!(
                "expected reshaped [trace, cycle, feature] radmat, got {} dims",
                shape.len()
            )));
        }
        let positions = config.num_cycles * config.num_channels_in;
        if shape[1] != positions || shape[2] != NUM_FEATURES {
            return Err(PipelineError::ShapeMismatch(format!(
                "expected [traces, {}, {}] radmat, got {:?}",
                positions, NUM_FEATURES, shape
            )));
        }
        let traces = shape[0];

        let mut fixedrads = Vec::new();
        let mut accepted = 0usize;
        let mut rejections = RejectionCounts::default();
        let mut nondark = NondarkStats::new();

        for trace in 0..traces {
            match fix_trace(&input.radmat, trace, positions, config) {
                Ok((fixedrad, local)) => {
                    fixedrads.extend_from_slice(&fixedrad);
                    nondark.merge(local);
                    accepted += 1;
                    self.metrics.record_accepted();
                }
                Err(reason) => {
                    match reason {
                        Rejection::AmbiguousPeak => rejections.aspect_ratio += 1,
                        Rejection::BrightAfterDark => rejections.bright_after_dark += 1,
                        Rejection::DarkAtMockBoundary => rejections.dark_at_boundary += 1,
                    }
                    self.metrics.record_rejected();
                    self.logger
                        .record_debug(&format!("trace {} dropped: {:?}", trace, reason));
                }
            }
        }

        let fixed = ArrayD::from_shape_vec(
            IxDyn(&[accepted, config.num_cycles, config.num_channels_in]),
            fixedrads,
        )
        .map_err(|err| PipelineError::Internal(err.to_string()))?;

        let (kept, dropped) = self.metrics.snapshot();
        self.logger.record(&format!(
            "FilterStage accepted {}/{} traces ({} dropped)",
            kept, traces, dropped
        ));

        let metadata = StageMetadata {
            accepted: Some(accepted),
            rejections: Some(rejections),
            nondark: Some(nondark),
            notes: vec![format!("accepted {} of {} traces", accepted, traces)],
            ..Default::default()
        };

        Ok(StageOutput {
            radmat: fixed,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Builds a reshaped `[trace, cycle, feature]` radmat from
    /// (intensity, aspect_ratio) pairs.
    fn radmat_from_traces(traces: &[[(f64, f64); 9]]) -> ArrayD<f64> {
        Array3::from_shape_fn((traces.len(), 9, 2), |(t, c, f)| {
            if f == 0 {
                traces[t][c].0
            } else {
                traces[t][c].1
            }
        })
        .into_dyn()
    }

    fn run(traces: &[[(f64, f64); 9]]) -> StageOutput {
        let mut stage = FilterStage::new();
        stage.initialize(&PipelineConfig::default()).unwrap();
        stage
            .execute(StageInput {
                radmat: radmat_from_traces(traces),
            })
            .unwrap()
    }

    const BRIGHT: (f64, f64) = (2000.0, 1.0);
    const DARK: (f64, f64) = (0.0, 0.0);

    #[test]
    fn clean_trace_keeps_literal_intensities() {
        let output = run(&[[
            (1500.0, 1.0),
            (2500.0, 1.2),
            (3500.0, 0.9),
            (1200.0, 1.1),
            (1800.0, 1.0),
            DARK,
            DARK,
            DARK,
            DARK,
        ]]);
        assert_eq!(output.metadata.accepted, Some(1));
        assert_eq!(output.radmat.shape(), &[1, 9, 1]);
        assert_eq!(output.radmat[[0, 0, 0]], 1500.0);
        assert_eq!(output.radmat[[0, 2, 0]], 3500.0);
        assert_eq!(output.radmat[[0, 5, 0]], 0.0);
        let nondark = output.metadata.nondark.unwrap();
        assert_eq!(nondark.count, 5);
        assert_eq!(nondark.sum, 10500.0);
    }

    #[test]
    fn aspect_ratio_at_limit_is_accepted_zero_is_not() {
        let mut at_limit = [BRIGHT; 9];
        at_limit[4] = (2000.0, 1.5);
        let output = run(&[at_limit]);
        assert_eq!(output.metadata.accepted, Some(1));

        let mut at_zero = [BRIGHT; 9];
        at_zero[4] = (2000.0, 0.0);
        let output = run(&[at_zero]);
        assert_eq!(output.metadata.accepted, Some(0));
        assert_eq!(output.metadata.rejections.unwrap().aspect_ratio, 1);
    }

    #[test]
    fn dark_at_mock_boundary_rejects_trace() {
        let mut trace = [BRIGHT; 9];
        trace[3] = DARK;
        let output = run(&[trace]);
        assert_eq!(output.metadata.accepted, Some(0));
        assert_eq!(output.metadata.rejections.unwrap().dark_at_boundary, 1);
    }

    #[test]
    fn bright_after_dark_rejects_trace() {
        // Bright through cycle 3, dark at 4 and 5, bright again at 6.
        let mut trace = [BRIGHT; 9];
        trace[4] = DARK;
        trace[5] = DARK;
        let output = run(&[trace]);
        assert_eq!(output.metadata.accepted, Some(0));
        assert_eq!(output.metadata.rejections.unwrap().bright_after_dark, 1);
    }

    #[test]
    fn dark_mock_cycle_defers_rejection_to_later_rules() {
        // Darkness at i < num_mocks is never itself the rejection; the trace
        // dies later, as bright-after-dark or at the mock boundary.
        let mut trace = [BRIGHT; 9];
        trace[1] = DARK;
        let output = run(&[trace]);
        assert_eq!(output.metadata.rejections.unwrap().bright_after_dark, 1);

        let all_dark = [DARK; 9];
        let output = run(&[all_dark]);
        assert_eq!(output.metadata.rejections.unwrap().dark_at_boundary, 1);
    }

    #[test]
    fn rejected_traces_do_not_touch_the_nondark_stats() {
        let mut bad = [BRIGHT; 9];
        bad[6] = (2000.0, 2.0);
        let good = [BRIGHT; 9];
        let output = run(&[bad, good]);
        assert_eq!(output.metadata.accepted, Some(1));
        let nondark = output.metadata.nondark.unwrap();
        assert_eq!(nondark.count, 9);
        assert_eq!(nondark.sum, 9.0 * 2000.0);
    }

    #[test]
    fn wrong_dimensionality_is_invalid_input() {
        let mut stage = FilterStage::new();
        stage.initialize(&PipelineConfig::default()).unwrap();
        let err = stage
            .execute(StageInput {
                radmat: ndarray::Array2::<f64>::zeros((3, 9)).into_dyn(),
            })
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }
}
