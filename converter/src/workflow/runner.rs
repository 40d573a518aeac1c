use crate::workflow::config::ConvertConfig;
use anyhow::Context;
use ndarray::ArrayD;
use radcore::prelude::{ProcessingStage, RejectionCounts, StageInput};
use radcore::processing::{FilterStage, NormalizeStage, ReshapeStage};

/// Result of a complete reshape/filter/normalize run.
#[derive(Debug)]
pub struct ConvertResult {
    pub table: ArrayD<f64>,
    pub accepted: usize,
    pub rejections: RejectionCounts,
    pub normalization_mean: f64,
    pub notes: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: ConvertConfig,
}

impl Runner {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, radmat: ArrayD<f64>) -> anyhow::Result<ConvertResult> {
        let pipeline_config = self.config.to_pipeline_config();

        let mut reshape_stage = ReshapeStage::new();
        reshape_stage
            .initialize(&pipeline_config)
            .context("initializing reshape stage")?;
        let reshape_output = reshape_stage
            .execute(StageInput { radmat })
            .context("executing reshape stage")?;
        reshape_stage.cleanup();

        let mut filter_stage = FilterStage::new();
        filter_stage
            .initialize(&pipeline_config)
            .context("initializing filter stage")?;
        let filter_output = filter_stage
            .execute(StageInput {
                radmat: reshape_output.radmat,
            })
            .context("executing filter stage")?;
        filter_stage.cleanup();

        let mut normalize_stage = NormalizeStage::new();
        normalize_stage
            .initialize(&pipeline_config)
            .context("initializing normalize stage")?;
        let normalize_output = normalize_stage
            .execute(StageInput {
                radmat: filter_output.radmat,
            })
            .context("executing normalize stage")?;
        normalize_stage.cleanup();

        let accepted = filter_output.metadata.accepted.unwrap_or(0);
        let rejections = filter_output.metadata.rejections.unwrap_or_default();
        let normalization_mean = normalize_output.metadata.normalization_mean.unwrap_or(0.0);

        let mut notes = filter_output.metadata.notes;
        notes.extend(normalize_output.metadata.notes);

        Ok(ConvertResult {
            table: normalize_output.radmat,
            accepted,
            rejections,
            normalization_mean,
            notes,
        })
    }
}
