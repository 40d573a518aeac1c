use ndarray::{ArrayD, IxDyn};
use radcore::prelude::PipelineConfig;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic raw radmat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub traces: usize,
    pub seed: u64,
    /// Fraction of traces given a deliberately bad aspect ratio.
    pub reject_fraction: f64,
    pub base_intensity: f64,
    pub noise: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            traces: 64,
            seed: 0,
            reject_fraction: 0.1,
            base_intensity: 5000.0,
            noise: 250.0,
        }
    }
}

/// Builds a raw `[channel, cycle, feature, trace]` radmat.
///
/// Each trace is bright through a random prefix ending past the mock
/// boundary and dark afterwards, so clean traces always pass filtering;
/// `reject_fraction` of them get an overlapping-peak aspect ratio instead.
pub fn build_radmat(synth: &SyntheticConfig, config: &PipelineConfig) -> anyhow::Result<ArrayD<f64>> {
    anyhow::ensure!(synth.traces > 0, "synthetic radmat needs at least one trace");
    anyhow::ensure!(
        synth.base_intensity - synth.noise > config.cutoff,
        "base intensity minus noise must stay above the dark cutoff"
    );

    let cycles = config.num_cycles;
    let channels = config.num_channels_in;
    let mut radmat = ArrayD::zeros(IxDyn(&[channels, cycles, 2, synth.traces]));
    let mut rng = StdRng::seed_from_u64(synth.seed);

    for trace in 0..synth.traces {
        let bright_until = rng.gen_range(config.num_mocks + 1..=cycles);
        let bad_aspect = rng.gen::<f64>() < synth.reject_fraction;
        for channel in 0..channels {
            for cycle in 0..cycles {
                if cycle < bright_until {
                    let jitter = if synth.noise > 0.0 {
                        rng.gen_range(-synth.noise..synth.noise)
                    } else {
                        0.0
                    };
                    radmat[[channel, cycle, 0, trace]] = synth.base_intensity + jitter;
                    radmat[[channel, cycle, 1, trace]] = if bad_aspect {
                        2.5
                    } else {
                        rng.gen_range(0.8..1.2)
                    };
                }
            }
        }
    }

    Ok(radmat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_configured_shape() {
        let synth = SyntheticConfig {
            traces: 12,
            ..Default::default()
        };
        let radmat = build_radmat(&synth, &PipelineConfig::default()).unwrap();
        assert_eq!(radmat.shape(), &[1, 9, 2, 12]);
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let synth = SyntheticConfig {
            traces: 8,
            seed: 17,
            ..Default::default()
        };
        let config = PipelineConfig::default();
        let first = build_radmat(&synth, &config).unwrap();
        let second = build_radmat(&synth, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn generator_refuses_intensities_below_cutoff() {
        let synth = SyntheticConfig {
            base_intensity: 900.0,
            noise: 0.0,
            ..Default::default()
        };
        assert!(build_radmat(&synth, &PipelineConfig::default()).is_err());
    }
}
