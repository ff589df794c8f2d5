//! Harness layout configuration.
//!
//! Describes the single-layer classifier the hardware bench runs: a square
//! input image, a `num_classes x image_side^2` weight matrix, and the file
//! names the bench expects. Loaded from a JSON file; every field has a
//! default matching the MNIST bench.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// What a tensor file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorKind {
    /// One flattened input image.
    Image,
    /// Row-major weight matrix, one row per class.
    Weights,
}

/// Configuration for the L-Mul test bench.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Side length of the square input image.
    /// For MNIST: 28
    pub image_side: usize,

    /// Number of output classes (rows of the weight matrix).
    /// For MNIST digits: 10
    pub num_classes: usize,

    /// Number of input images generated per run.
    pub num_samples: usize,

    /// Weight matrix file name.
    pub weights_file: PathBuf,

    /// Image file name pattern; `{i}` is replaced by the sample number.
    pub image_file_pattern: String,

    /// Result stream written by the harness.
    pub results_file: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            image_side: 28,
            num_classes: 10,
            num_samples: 5,
            weights_file: PathBuf::from("weights.bin"),
            image_file_pattern: "input_image_{i}.bin".to_string(),
            results_file: PathBuf::from("results.csv"),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file and validate it.
    ///
    /// # Example
    /// ```no_run
    /// use lmul_harness::config::HarnessConfig;
    ///
    /// let config = HarnessConfig::from_file("harness.json")?;
    /// assert_eq!(config.image_len(), 784);
    /// # Ok::<(), lmul_harness::error::HarnessError>(())
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| HarnessError::io("read", path, e))?;
        let config: HarnessConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the layout is usable.
    pub fn validate(&self) -> Result<()> {
        if self.image_side == 0 {
            return Err(HarnessError::Config("image_side must be positive".to_string()));
        }
        if self.num_classes == 0 {
            return Err(HarnessError::Config("num_classes must be positive".to_string()));
        }
        if self.weights_len().is_none() {
            return Err(HarnessError::Config(format!(
                "weight matrix {} x {}^2 overflows",
                self.num_classes, self.image_side
            )));
        }
        if !self.image_file_pattern.contains("{i}") {
            return Err(HarnessError::Config(format!(
                "image_file_pattern '{}' has no {{i}} placeholder",
                self.image_file_pattern
            )));
        }
        Ok(())
    }

    /// Values in one image (image_side^2).
    pub fn image_len(&self) -> usize {
        self.image_side.saturating_mul(self.image_side)
    }

    /// Values in the weight matrix, `None` on overflow.
    pub fn weights_len(&self) -> Option<usize> {
        self.image_side
            .checked_mul(self.image_side)?
            .checked_mul(self.num_classes)
    }

    /// Expected value count for a tensor file of the given kind.
    pub fn expected_len(&self, kind: TensorKind) -> Result<usize> {
        match kind {
            TensorKind::Image => Ok(self.image_len()),
            TensorKind::Weights => self
                .weights_len()
                .ok_or_else(|| HarnessError::Config("weight matrix size overflows".to_string())),
        }
    }

    /// File name of image `i`.
    pub fn image_file(&self, i: usize) -> PathBuf {
        PathBuf::from(self.image_file_pattern.replace("{i}", &i.to_string()))
    }
}
