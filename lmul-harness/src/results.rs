//! Result stream decoding and max-activation classification.
//!
//! The harness prints one record per line:
//!
//! ```text
//! 0,3F80
//! 1,4000
//! 2,4000
//! ```
//!
//! `<index>` is a decimal unsigned integer, `<hex>` four hex digits of a BF16
//! value. Line order is authoritative: the predicted class is the position
//! (among non-blank lines) of the largest decoded value, and the first
//! occurrence wins ties. `<index>` is carried along for diagnostics only.
//!
//! # Example
//!
//! ```rust
//! use lmul_harness::results::decode_stream;
//!
//! let outcome = decode_stream(["0,3F80", "1,4000", "", "2,4000"])?;
//! assert_eq!(outcome.position, 1);
//! assert_eq!(outcome.value, 2.0);
//! # Ok::<(), lmul_harness::error::HarnessError>(())
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bf16::Bf16;
use crate::error::{HarnessError, Result};

/// One `<index>,<hex>` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRecord {
    /// Index field as printed by the harness.
    pub index: u64,
    /// Raw BF16 value.
    pub value: Bf16,
}

impl ResultRecord {
    /// Value widened to F32.
    pub fn decoded(&self) -> f32 {
        self.value.to_f32()
    }
}

/// Parse a single result line.
///
/// Returns `Ok(None)` for blank (whitespace-only) lines. The line is split on
/// its first comma and both fields are trimmed.
///
/// # Arguments
///
/// * `line_number` - 1-based line number, reported in errors
/// * `line` - Raw line text
///
/// # Errors
///
/// [`HarnessError::MalformedRecord`] if the comma is missing, the index is
/// not a decimal unsigned integer, or the value is not four hex digits.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<ResultRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let malformed = |reason: String| HarnessError::MalformedRecord {
        line: line_number,
        content: line.to_string(),
        reason,
    };

    let (index_field, value_field) = trimmed
        .split_once(',')
        .ok_or_else(|| malformed("missing ',' separator".to_string()))?;

    let index_field = index_field.trim();
    if index_field.is_empty() || !index_field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(format!("invalid index '{}'", index_field)));
    }
    let index = index_field
        .parse::<u64>()
        .map_err(|e| malformed(format!("invalid index '{}': {}", index_field, e)))?;

    let value = Bf16::from_hex(value_field.trim()).map_err(malformed)?;

    Ok(Some(ResultRecord { index, value }))
}

/// Predicted class for one result stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// 0-based position of the maximum among parsed records.
    pub position: usize,
    /// `<index>` field of the winning record.
    pub index: u64,
    /// Decoded winning value.
    ///
    /// Serialized as the 4-digit BF16 hex string so NaN and infinities
    /// survive JSON.
    #[serde(with = "bf16_hex")]
    pub value: f32,
    /// Number of records in the stream.
    pub records: usize,
}

mod bf16_hex {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::bf16::{encode, Bf16};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:04X}", encode(*value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        let text = String::deserialize(deserializer)?;
        Bf16::from_hex(&text).map(Bf16::to_f32).map_err(D::Error::custom)
    }
}

/// Decoder progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No record seen yet.
    Empty,
    /// At least one record folded into the running maximum.
    Accumulating,
}

#[derive(Debug, Clone, Copy)]
struct Best {
    position: usize,
    index: u64,
    value: f32,
}

/// Streaming arg-max over result lines.
///
/// Feed lines in order with [`push_line`](Self::push_line), then call
/// [`finish`](Self::finish). Only the running best and the set of indices
/// seen (to reject duplicates) are retained.
#[derive(Debug, Default)]
pub struct ResultDecoder {
    best: Option<Best>,
    records: usize,
    lines: usize,
    seen: HashSet<u64>,
}

impl ResultDecoder {
    /// Create a decoder in the `Empty` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> DecoderState {
        if self.best.is_some() {
            DecoderState::Accumulating
        } else {
            DecoderState::Empty
        }
    }

    /// Records accepted so far.
    pub fn records_seen(&self) -> usize {
        self.records
    }

    /// Consume the next line of the stream.
    ///
    /// Blank lines are counted for line numbering but otherwise ignored.
    ///
    /// # Errors
    ///
    /// [`HarnessError::MalformedRecord`] for a bad line or a repeated
    /// `<index>`. The decoder should be discarded after an error.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        self.lines += 1;
        match parse_line(self.lines, line)? {
            Some(record) => self.push_record(record, line),
            None => Ok(()),
        }
    }

    /// Consume the next line as raw bytes, without its `\n`.
    ///
    /// # Errors
    ///
    /// [`HarnessError::MalformedRecord`] if the line is not UTF-8, plus
    /// everything [`push_line`](Self::push_line) rejects.
    pub fn push_bytes(&mut self, raw: &[u8]) -> Result<()> {
        match std::str::from_utf8(raw) {
            Ok(line) => self.push_line(line),
            Err(e) => {
                self.lines += 1;
                Err(HarnessError::MalformedRecord {
                    line: self.lines,
                    content: String::from_utf8_lossy(raw).into_owned(),
                    reason: format!("invalid UTF-8: {}", e),
                })
            }
        }
    }

    fn push_record(&mut self, record: ResultRecord, line: &str) -> Result<()> {
        if !self.seen.insert(record.index) {
            return Err(HarnessError::MalformedRecord {
                line: self.lines,
                content: line.to_string(),
                reason: format!("duplicate index {}", record.index),
            });
        }

        let position = self.records;
        let value = record.decoded();
        self.records += 1;

        let replace = match self.best {
            None => true,
            // NaN is maximal, and the first one stays
            Some(best) if best.value.is_nan() => false,
            Some(_) if value.is_nan() => true,
            // Strict comparison keeps the first of equal values
            Some(best) => value > best.value,
        };

        if replace {
            self.best = Some(Best {
                position,
                index: record.index,
                value,
            });
        }

        Ok(())
    }

    /// End of stream.
    ///
    /// # Errors
    ///
    /// [`HarnessError::EmptyStream`] if no record was accepted.
    pub fn finish(self) -> Result<ClassificationOutcome> {
        let best = self.best.ok_or(HarnessError::EmptyStream)?;
        Ok(ClassificationOutcome {
            position: best.position,
            index: best.index,
            value: best.value,
            records: self.records,
        })
    }
}

/// Classify a sequence of result lines.
///
/// The sequence is consumed once, in order, and decoding stops at the first
/// malformed line.
pub fn decode_stream<I>(lines: I) -> Result<ClassificationOutcome>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut decoder = ResultDecoder::new();
    for line in lines {
        decoder.push_line(line.as_ref())?;
    }
    decoder.finish()
}

/// Classify a result stream read from `reader`.
///
/// `source` names the stream in IO errors. Lines that are not UTF-8 are
/// malformed records, not IO errors.
pub fn decode_reader<R: BufRead>(
    mut reader: R,
    source: impl AsRef<Path>,
) -> Result<ClassificationOutcome> {
    let mut decoder = ResultDecoder::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| HarnessError::io("read", source.as_ref(), e))?;
        if read == 0 {
            break;
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        decoder.push_bytes(line)?;
    }
    decoder.finish()
}

/// Classify the result file at `path` (usually `results.csv`).
pub fn decode_file(path: impl AsRef<Path>) -> Result<ClassificationOutcome> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| HarnessError::io("open", path, e))?;
    decode_reader(BufReader::new(file), path)
}
