use crate::prelude::{
    PipelineConfig, PipelineError, PipelineResult, ProcessingStage, StageInput, StageMetadata,
    StageOutput,
};
use crate::radmat::RadmatLayout;
use crate::telemetry::log::LogManager;
use ndarray::IxDyn;

/// Reorders the raw radmat axes and merges per-cycle channels into one axis.
///
/// Raw input is `[channel, cycle, feature, trace]`; the output is
/// `[trace, cycle*channel, feature]` with `(cycle, ch)` landing at position
/// `cycle * channels_in + ch`. Element values are untouched, only their
/// addressing changes.
pub struct ReshapeStage {
    config: Option<PipelineConfig>,
    logger: LogManager,
}

impl ReshapeStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for ReshapeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for ReshapeStage {
    fn initialize(&mut self, config: &PipelineConfig) -> PipelineResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> PipelineResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| PipelineError::Internal("stage not initialized".into()))?;

        let layout = RadmatLayout::from_shape(input.radmat.shape(), config)?;

        // [channel, cycle, feature, trace] -> [trace, cycle, channel, feature];
        // the (cycle, channel) pair then collapses row-major into one axis.
        let permuted = input.radmat.permuted_axes(IxDyn(&[3, 1, 0, 2]));
        let reshaped = permuted
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(&[
                layout.traces,
                layout.cycle_positions(),
                layout.features,
            ]))
            .map_err(|err| PipelineError::ShapeMismatch(err.to_string()))?;

        self.logger.record(&format!(
            "ReshapeStage {} traces x {} cycle positions",
            layout.traces,
            layout.cycle_positions()
        ));

        let metadata = StageMetadata {
            notes: vec![format!("raw layout {:?}", layout)],
            ..Default::default()
        };

        Ok(StageOutput {
            radmat: reshaped,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
