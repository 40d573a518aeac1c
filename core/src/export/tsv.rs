use ndarray::ArrayD;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::prelude::{PipelineConfig, PipelineError, PipelineResult};

/// Writes the filtered, normalized table in the classifier's TSV layout.
///
/// Three integer header lines (cycle count, output channel count, trace
/// count), then one row per trace with `cycles * num_channels_out`
/// tab-separated fields. Output channels beyond the recorded input channels
/// are padded with literal `0.0`. A tab precedes every field except the
/// first of a row.
pub fn write_radiometries<P: AsRef<Path>>(
    path: P,
    table: &ArrayD<f64>,
    config: &PipelineConfig,
) -> PipelineResult<()> {
    let shape = table.shape();
    if shape.len() != 3 {
        return Err(PipelineError::InvalidInput(format!(
            "expected [trace, cycle, channel] table, got {} dims",
            shape.len()
        )));
    }
    let (traces, cycles, channels) = (shape[0], shape[1], shape[2]);
    if channels > config.num_channels_out {
        return Err(PipelineError::InvalidInput(format!(
            "table carries {} channels but only {} output channels are configured",
            channels, config.num_channels_out
        )));
    }

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "{}", cycles)?;
    writeln!(writer, "{}", config.num_channels_out)?;
    writeln!(writer, "{}", traces)?;

    for trace in 0..traces {
        for cycle in 0..cycles {
            for channel in 0..channels {
                if cycle > 0 || channel > 0 {
                    write!(writer, "\t")?;
                }
                write!(writer, "{}", table[[trace, cycle, channel]])?;
            }
            for _ in channels..config.num_channels_out {
                write!(writer, "\t0.0")?;
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
