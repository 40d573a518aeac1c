use anyhow::Context;
use radcore::prelude::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Conversion parameters, loadable from YAML or assembled from CLI args.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub num_channels_in: usize,
    pub num_channels_out: usize,
    pub num_mocks: usize,
    pub num_cycles: usize,
    pub cutoff: f64,
    pub max_aspect_ratio: f64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            num_channels_in: defaults.num_channels_in,
            num_channels_out: defaults.num_channels_out,
            num_mocks: defaults.num_mocks,
            num_cycles: defaults.num_cycles,
            cutoff: defaults.cutoff,
            max_aspect_ratio: defaults.max_aspect_ratio,
        }
    }
}

impl ConvertConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading conversion config {}", path_ref.display()))?;
        let config: ConvertConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing conversion config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(cutoff: f64, mocks: usize, cycles: usize, channels_out: usize) -> Self {
        Self {
            cutoff,
            num_mocks: mocks,
            num_cycles: cycles,
            num_channels_out: channels_out,
            ..Self::default()
        }
    }

    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            num_channels_in: self.num_channels_in,
            num_channels_out: self.num_channels_out,
            num_mocks: self.num_mocks,
            num_cycles: self.num_cycles,
            cutoff: self.cutoff,
            max_aspect_ratio: self.max_aspect_ratio,
        }
    }
}
