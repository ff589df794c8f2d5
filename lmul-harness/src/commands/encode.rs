use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use ndarray::ArrayD;
use ndarray_npy::ReadNpyExt;

use lmul_harness::config::{HarnessConfig, TensorKind};
use lmul_harness::tensor_file::write_tensor;

use super::KindArg;

#[derive(Args)]
pub struct EncodeArgs {
    /// Input values: a JSON array of numbers or an f32 .npy array
    #[arg(short, long)]
    input: PathBuf,

    /// Output tensor file (defaults to the layout's file name for the kind)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What the values are; image and weights are length-checked
    #[arg(short, long, value_enum, default_value = "raw")]
    kind: KindArg,

    /// Sample number used to name image files
    #[arg(long, default_value_t = 0)]
    sample: usize,
}

pub fn run(args: EncodeArgs, config: &HarnessConfig) -> anyhow::Result<()> {
    let values = load_values(&args.input)?;
    tracing::debug!("Loaded {} values from {}", values.len(), args.input.display());

    if let Some(kind) = args.kind.layout() {
        let expected = config.expected_len(kind)?;
        if values.len() != expected {
            bail!(
                "{} holds {} values, a {:?} tensor needs {}",
                args.input.display(),
                values.len(),
                kind,
                expected
            );
        }
    }

    let output = match (args.output, args.kind.layout()) {
        (Some(path), _) => path,
        (None, Some(TensorKind::Weights)) => config.weights_file.clone(),
        (None, Some(TensorKind::Image)) => config.image_file(args.sample),
        (None, None) => bail!("--output is required for raw tensors"),
    };

    let written = write_tensor(&values, &output)?;
    tracing::info!("Wrote {} BF16 values ({} bytes) to {}", written, written * 2, output.display());

    Ok(())
}

/// Read F32 values in logical (row-major) order.
fn load_values(path: &Path) -> anyhow::Result<Vec<f32>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("npy") => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let array = ArrayD::<f32>::read_npy(file)
                .with_context(|| format!("reading f32 array from {}", path.display()))?;
            Ok(array.iter().copied().collect())
        }
        Some("json") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let values: Vec<f32> = serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON array from {}", path.display()))?;
            Ok(values)
        }
        _ => bail!("unsupported input {}: expected .json or .npy", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixels.json");
        std::fs::write(&path, "[0.0, 0.5, 1.0]").unwrap();

        assert_eq!(load_values(&path).unwrap(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_load_npy_values_row_major() {
        use ndarray::Array2;
        use ndarray_npy::WriteNpyExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.npy");
        let array = Array2::from_shape_vec((2, 3), vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        array.write_npy(File::create(&path).unwrap()).unwrap();

        assert_eq!(load_values(&path).unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_values(Path::new("values.txt")).is_err());
    }

    #[test]
    fn test_image_length_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pixels.json");
        std::fs::write(&input, "[0.0, 0.5, 1.0]").unwrap();

        let args = EncodeArgs {
            input,
            output: Some(dir.path().join("out.bin")),
            kind: KindArg::Image,
            sample: 0,
        };
        assert!(run(args, &HarnessConfig::default()).is_err());
    }

    #[test]
    fn test_encode_image_with_small_layout() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pixels.json");
        std::fs::write(&input, "[0.0, 1.0, 2.0, -1.0]").unwrap();
        let output = dir.path().join("image.bin");

        let config = HarnessConfig {
            image_side: 2,
            ..Default::default()
        };
        let args = EncodeArgs {
            input,
            output: Some(output.clone()),
            kind: KindArg::Image,
            sample: 0,
        };
        run(args, &config).unwrap();

        assert_eq!(
            std::fs::read(&output).unwrap(),
            vec![0x00, 0x00, 0x3F, 0x80, 0x40, 0x00, 0xBF, 0x80]
        );
    }
}
