//! Flat BF16 tensor files consumed by the hardware harness.
//!
//! The format is as small as it gets:
//! - one 2-byte record per value, big-endian, in index order
//! - no header, no length prefix, no padding
//!
//! A file of N values is exactly `2 * N` bytes. Because nothing in the file
//! says how long it should be, readers pass the expected count and get
//! [`HarnessError::TruncatedFile`] for short files.
//!
//! # Example
//!
//! ```rust,no_run
//! use lmul_harness::tensor_file::{read_tensor, write_tensor};
//!
//! let pixels = vec![0.0f32, 0.5, 1.0];
//! write_tensor(&pixels, "input_image_0.bin")?;
//!
//! let back = read_tensor("input_image_0.bin", Some(pixels.len()))?;
//! assert_eq!(back.len(), 3);
//! # Ok::<(), lmul_harness::error::HarnessError>(())
//! ```

use std::borrow::Borrow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::bf16::{encode, Bf16};
use crate::error::{HarnessError, Result};

/// Bytes per record in a tensor file.
pub const RECORD_BYTES: usize = 2;

/// Write values to a tensor file at `path`, replacing any existing file.
///
/// Each value is truncated to BF16 and appended as two big-endian bytes.
/// The file is flushed before returning; on any error the handle is still
/// closed and the (short) file must be treated as invalid.
///
/// Returns the number of records written.
///
/// # Errors
///
/// [`HarnessError::Io`] with the path and the failing operation
/// (`create`, `write` or `flush`).
pub fn write_tensor<I>(values: I, path: impl AsRef<Path>) -> Result<usize>
where
    I: IntoIterator,
    I::Item: Borrow<f32>,
{
    let path = path.as_ref();

    let file = File::create(path).map_err(|e| HarnessError::io("create", path, e))?;
    let mut writer = BufWriter::new(file);

    let count = write_tensor_to(values, &mut writer).map_err(|e| HarnessError::io("write", path, e))?;

    writer.flush().map_err(|e| HarnessError::io("flush", path, e))?;

    Ok(count)
}

/// Write values as big-endian BF16 records to any sink.
///
/// The sink is not flushed; callers that own a buffered writer flush it.
pub fn write_tensor_to<I, W>(values: I, writer: &mut W) -> std::io::Result<usize>
where
    I: IntoIterator,
    I::Item: Borrow<f32>,
    W: Write + ?Sized,
{
    let mut count = 0;
    for value in values {
        writer.write_all(&encode(*value.borrow()).to_be_bytes())?;
        count += 1;
    }
    Ok(count)
}

/// Build the exact byte image of a tensor file in memory.
pub fn encode_tensor<I>(values: I) -> Vec<u8>
where
    I: IntoIterator,
    I::Item: Borrow<f32>,
{
    let values = values.into_iter();
    let mut bytes = Vec::with_capacity(values.size_hint().0 * RECORD_BYTES);
    for value in values {
        bytes.extend_from_slice(&encode(*value.borrow()).to_be_bytes());
    }
    bytes
}

/// Read a tensor file back as BF16 records.
///
/// The file is memory-mapped, so large weight files are not copied twice.
///
/// # Arguments
///
/// * `path` - Tensor file to read
/// * `expected` - Number of values the file must hold, if known
///
/// # Errors
///
/// - [`HarnessError::Io`] if the file cannot be opened or mapped
/// - [`HarnessError::TruncatedFile`] if the file is shorter than `expected`
///   values, or (with no expectation) ends in half a record
/// - [`HarnessError::SizeMismatch`] if the file is longer than `expected`
pub fn read_tensor(path: impl AsRef<Path>, expected: Option<usize>) -> Result<Vec<Bf16>> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| HarnessError::io("open", path, e))?;
    let len = file
        .metadata()
        .map_err(|e| HarnessError::io("stat", path, e))?
        .len();

    // Nothing to map
    if len == 0 {
        return decode_tensor_bytes(&[], expected, path);
    }

    // SAFETY: the mapping is read-only and dropped before returning; the
    // file is not modified by this process while mapped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| HarnessError::io("map", path, e))?;

    decode_tensor_bytes(&mmap, expected, path)
}

/// Decode an in-memory tensor file image.
///
/// `source` only labels errors. Length checks are the same as
/// [`read_tensor`].
pub fn decode_tensor_bytes(
    bytes: &[u8],
    expected: Option<usize>,
    source: impl AsRef<Path>,
) -> Result<Vec<Bf16>> {
    let actual_bytes = bytes.len();

    match expected {
        Some(count) => {
            // No file can hold that many records
            let Some(expected_bytes) = count.checked_mul(RECORD_BYTES) else {
                return Err(HarnessError::TruncatedFile {
                    path: source.as_ref().to_path_buf(),
                    expected_bytes: usize::MAX,
                    actual_bytes,
                });
            };
            if actual_bytes < expected_bytes {
                return Err(HarnessError::TruncatedFile {
                    path: source.as_ref().to_path_buf(),
                    expected_bytes,
                    actual_bytes,
                });
            }
            if actual_bytes > expected_bytes {
                return Err(HarnessError::SizeMismatch {
                    path: source.as_ref().to_path_buf(),
                    expected_bytes,
                    actual_bytes,
                });
            }
        }
        None => {
            if actual_bytes % RECORD_BYTES != 0 {
                return Err(HarnessError::TruncatedFile {
                    path: source.as_ref().to_path_buf(),
                    expected_bytes: actual_bytes + 1,
                    actual_bytes,
                });
            }
        }
    }

    Ok(bytes
        .chunks_exact(RECORD_BYTES)
        .map(|chunk| Bf16::from_be_bytes([chunk[0], chunk[1]]))
        .collect())
}
