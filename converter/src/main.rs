use anyhow::Context;
use clap::Parser;
use generator::synthetic::{build_radmat, SyntheticConfig};
use radcore::export::write_radiometries;
use radcore::prelude::RejectionCounts;
use radcore::radmat::load_radmat;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use workflow::config::ConvertConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Radiometry-to-TSV conversion driver")]
struct Args {
    /// Raw radmat `.npy` input (ignored when --synthetic is set)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Destination TSV table
    #[arg(long)]
    output: PathBuf,
    /// Load conversion parameters from YAML instead of the flags below
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 1000.0)]
    cutoff: f64,
    #[arg(long, default_value_t = 3)]
    mocks: usize,
    #[arg(long, default_value_t = 9)]
    cycles: usize,
    #[arg(long, default_value_t = 3)]
    channels_out: usize,
    /// Generate a synthetic radmat with this many traces instead of reading a file
    #[arg(long)]
    synthetic: Option<usize>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunSummary {
    accepted: usize,
    rejections: RejectionCounts,
    normalization_mean: f64,
    output: String,
    notes: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let convert_config = if let Some(path) = args.workflow {
        ConvertConfig::load(path)?
    } else {
        ConvertConfig::from_args(args.cutoff, args.mocks, args.cycles, args.channels_out)
    };

    let radmat = if let Some(traces) = args.synthetic {
        let synth = SyntheticConfig {
            traces,
            seed: args.seed,
            ..SyntheticConfig::default()
        };
        build_radmat(&synth, &convert_config.to_pipeline_config())?
    } else {
        let input = args
            .input
            .context("--input is required unless --synthetic is set")?;
        load_radmat(&input).with_context(|| format!("loading radmat {}", input.display()))?
    };

    let runner = Runner::new(convert_config.clone());
    let result = runner.execute(radmat)?;

    write_radiometries(
        &args.output,
        &result.table,
        &convert_config.to_pipeline_config(),
    )
    .with_context(|| format!("writing radiometry table {}", args.output.display()))?;

    println!(
        "Converted -> {} traces accepted, {} rejected, mu {:.4}",
        result.accepted,
        result.rejections.total(),
        result.normalization_mean
    );

    if let Some(path) = args.summary {
        let summary = RunSummary {
            accepted: result.accepted,
            rejections: result.rejections,
            normalization_mean: result.normalization_mean,
            output: args.output.display().to_string(),
            notes: result.notes,
        };
        let contents =
            serde_json::to_string_pretty(&summary).context("serializing run summary")?;
        fs::write(&path, contents)
            .with_context(|| format!("writing run summary {}", path.display()))?;
    }

    Ok(())
}
