use crate::math::stats::NondarkStats;
use crate::prelude::{
    PipelineConfig, PipelineError, PipelineResult, ProcessingStage, StageInput, StageMetadata,
    StageOutput,
};
use crate::telemetry::log::LogManager;
use ndarray::{Axis, Slice};

/// Trims the mock cycles and scales intensities by the global non-dark mean.
///
/// The mean is taken over the full pre-trim array: fixed radiometries hold
/// either zero or an above-cutoff intensity, so scanning them reproduces
/// exactly the sums committed during filtering, mock cycles included.
pub struct NormalizeStage {
    config: Option<PipelineConfig>,
    logger: LogManager,
}

impl NormalizeStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for NormalizeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for NormalizeStage {
    fn initialize(&mut self, config: &PipelineConfig) -> PipelineResult<()> {
        if config.fixed_num_cycles() == 0 {
            return Err(PipelineError::InvalidInput(
                "every cycle is a mock cycle; nothing would remain after trimming".into(),
            ));
        }
        self.config = Some(config.clone());
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
                "expected fixed [trace, cycle, channel] radiometries, got {} dims",
                shape.len()
            )));
        }
        if shape[1] != config.num_cycles || shape[2] != config.num_channels_in {
            return Err(PipelineError::ShapeMismatch(format!(
                "expected [traces, {}, {}] radiometries, got {:?}",
                config.num_cycles, config.num_channels_in, shape
            )));
        }

        let nondark = NondarkStats::scan(&input.radmat, config.cutoff);
        let mu = nondark.mean().ok_or(PipelineError::NoSignal)?;

        let mut trimmed = input
            .radmat
            .slice_axis(Axis(1), Slice::from(config.num_mocks..))
            .to_owned();
        trimmed.mapv_inplace(|value| value / mu);

        self.logger.record(&format!(
            "NormalizeStage mu {:.4} over {} non-dark intensities",
            mu, nondark.count
        ));

        let metadata = StageMetadata {
            nondark: Some(nondark),
            normalization_mean: Some(mu),
            notes: vec![format!("mu {:.4}", mu)],
            ..Default::default()
        };

        Ok(StageOutput {
            radmat: trimmed,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
