//! L-Mul Harness I/O
//!
//! Bit-exact BF16 exchange with a hardware multiply-accumulate test bench.
//! Tensors go out as flat big-endian BF16 files; results come back as
//! `<index>,<hex>` lines and are classified by maximum activation.
//!
//! - [`bf16`]: truncating F32 ↔ BF16 codec
//! - [`tensor_file`]: tensor file writer and length-checked reader
//! - [`results`]: result stream parser and arg-max classifier
//! - [`config`]: bench layout (image size, class count, file names)

#![warn(missing_docs)]

pub mod bf16;
pub mod config;
pub mod error;
pub mod results;
pub mod tensor_file;

pub use bf16::{decode, encode, Bf16};
pub use error::{HarnessError, Result};
pub use results::{decode_stream, parse_line, ClassificationOutcome, ResultDecoder, ResultRecord};
pub use tensor_file::{read_tensor, write_tensor};
