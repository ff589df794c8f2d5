use std::path::PathBuf;

use clap::Args;

use lmul_harness::config::HarnessConfig;
use lmul_harness::tensor_file::read_tensor;

use super::KindArg;

#[derive(Args)]
pub struct InspectArgs {
    /// Tensor file to read
    #[arg(short, long)]
    input: PathBuf,

    /// Expected layout; image and weights files are length-checked
    #[arg(short, long, value_enum, default_value = "raw")]
    kind: KindArg,

    /// Exact number of values expected (overrides --kind)
    #[arg(long)]
    count: Option<usize>,

    /// Number of values to print
    #[arg(long, default_value_t = 16)]
    limit: usize,
}

pub fn run(args: InspectArgs, config: &HarnessConfig) -> anyhow::Result<()> {
    let expected = match (args.count, args.kind.layout()) {
        (Some(count), _) => Some(count),
        (None, Some(kind)) => Some(config.expected_len(kind)?),
        (None, None) => None,
    };

    let values = read_tensor(&args.input, expected)?;
    tracing::info!("{}: {} BF16 values", args.input.display(), values.len());

    for (i, value) in values.iter().take(args.limit).enumerate() {
        println!("{:6}  {:04X}  {}", i, value, value);
    }
    if values.len() > args.limit {
        println!("... {} more", values.len() - args.limit);
    }

    Ok(())
}
