//! Error types for lmul-harness.
//!
//! Every failure mode of the harness I/O path:
//! - IO errors (tensor files, result streams), with path and operation
//! - Malformed result records (bad `<index>,<hex>` lines)
//! - Empty result streams
//! - Truncated or oversized tensor files
//! - Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for lmul-harness.
///
/// All library functions return `Result<T, HarnessError>`. Nothing is
/// retried or logged here; the caller decides what to report.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Storage or stream operation failed.
    ///
    /// Example: cannot create `weights.bin`, disk full while writing.
    #[error("IO error: {op} {}: {source}", .path.display())]
    Io {
        /// File or stream the operation targeted
        path: PathBuf,
        /// Operation that failed (open, create, read, write, flush, map)
        op: &'static str,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A result line does not follow the `<index>,<hex>` grammar.
    ///
    /// Fatal for the whole stream; there is no best-effort mode.
    #[error("Malformed record at line {line}: {reason} (line: {content:?})")]
    MalformedRecord {
        /// 1-based line number within the stream
        line: usize,
        /// Raw line as read
        content: String,
        /// What was wrong with it
        reason: String,
    },

    /// The result stream contained no records.
    #[error("Empty result stream: no records to classify")]
    EmptyStream,

    /// A tensor file is shorter than the number of values it should hold.
    #[error(
        "Truncated tensor file {}: expected {expected_bytes} bytes, got {actual_bytes}",
        .path.display()
    )]
    TruncatedFile {
        /// Tensor file that was read
        path: PathBuf,
        /// Byte length implied by the expected value count
        expected_bytes: usize,
        /// Byte length actually present
        actual_bytes: usize,
    },

    /// A tensor file holds more data than expected.
    #[error(
        "Tensor file size mismatch {}: expected {expected_bytes} bytes, got {actual_bytes}",
        .path.display()
    )]
    SizeMismatch {
        /// Tensor file that was read
        path: PathBuf,
        /// Byte length implied by the expected value count
        expected_bytes: usize,
        /// Byte length actually present
        actual_bytes: usize,
    },

    /// Harness configuration is invalid.
    ///
    /// Example: `image_side` of zero.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON parsing error.
    ///
    /// Wraps serde_json errors when parsing config files.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Wrap an IO error with the path and operation it came from.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            op,
            source,
        }
    }
}

/// Result type alias for lmul-harness.
pub type Result<T> = std::result::Result<T, HarnessError>;
