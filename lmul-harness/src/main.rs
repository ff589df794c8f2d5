use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lmul_harness::config::HarnessConfig;

mod commands;

#[derive(Parser)]
#[command(name = "lmul-harness")]
#[command(version)]
#[command(about = "BF16 tensor files and result decoding for the L-Mul test bench", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to harness layout file (JSON)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert F32 values (.json or .npy) into a BF16 tensor file
    Encode(commands::encode::EncodeArgs),

    /// Classify a result stream by maximum activation
    Decode(commands::decode::DecodeArgs),

    /// Read a BF16 tensor file back and print its values
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .init();

    let config = match cli.config.as_deref() {
        Some(path) => {
            tracing::debug!("Loading harness layout from {}", path.display());
            HarnessConfig::from_file(path)?
        }
        None => HarnessConfig::default(),
    };

    match cli.command {
        Commands::Encode(args) => commands::encode::run(args, &config),
        Commands::Decode(args) => commands::decode::run(args, &config),
        Commands::Inspect(args) => commands::inspect::run(args, &config),
    }
}
