use ndarray::ArrayD;
use ndarray_npy::ReadNpyExt;
use std::fs::File;
use std::path::Path;

use crate::prelude::PipelineResult;

/// Loads a raw radmat from a NumPy `.npy` file as a dynamic-dimension array.
///
/// Shape validation happens in the reshape stage; this only requires a
/// readable f64 array.
pub fn load_radmat<P: AsRef<Path>>(path: P) -> PipelineResult<ArrayD<f64>> {
    let file = File::open(path.as_ref())?;
    let radmat = ArrayD::<f64>::read_npy(file)?;
    Ok(radmat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::PipelineError;
    use ndarray::Array;
    use ndarray_npy::WriteNpyExt;
    use std::io::BufWriter;

    #[test]
    fn load_round_trips_written_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radmat.npy");
        let original = Array::from_shape_fn((1, 9, 2, 3), |(c, cy, f, t)| {
            (c + 10 * cy + 100 * f + 1000 * t) as f64
        })
        .into_dyn();

        let file = File::create(&path).unwrap();
        original.write_npy(BufWriter::new(file)).unwrap();

        let loaded = load_radmat(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let err = load_radmat("/definitely/not/here.npy").unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
