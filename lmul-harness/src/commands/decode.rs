use std::path::PathBuf;

use clap::Args;

use lmul_harness::config::HarnessConfig;
use lmul_harness::results::decode_file;

#[derive(Args)]
pub struct DecodeArgs {
    /// Result stream written by the harness (defaults to the layout's results file)
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DecodeArgs, config: &HarnessConfig) -> anyhow::Result<()> {
    let path = args.results.unwrap_or_else(|| config.results_file.clone());
    tracing::debug!("Decoding results from {}", path.display());

    let outcome = decode_file(&path)?;

    if outcome.records != config.num_classes {
        tracing::warn!(
            "{} holds {} records, layout has {} classes",
            path.display(),
            outcome.records,
            config.num_classes
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Predicted class: {}", outcome.position);
        println!("  activation: {} (index {})", outcome.value, outcome.index);
    }

    Ok(())
}
