//! ## incidra-cli
//! **Operational interface for the correlation engine**
//!
//! Self-contained modes backed by the in-memory stores: `run` ingests
//! newline-delimited requests from stdin, `replay` feeds a recorded
//! scenario through the pipeline deterministically, and `generate` emits
//! synthetic attack scenarios for demos and load checks.

use clap::Parser;
use incidra_config::IncidraConfig;
use incidra_telemetry::logging::EventLogger;
use incidra_telemetry::metrics::MetricsRecorder;

mod commands;
mod scenario;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => IncidraConfig::load_from_path(path)?,
        None => IncidraConfig::load()?,
    };
    EventLogger::init_with_filter(&config.telemetry.log_filter);
    let metrics = MetricsRecorder::new();

    match cli.command {
        Commands::Run(args) => commands::run_live(args, config, metrics).await,
        Commands::Replay(args) => commands::run_replay(args, config, metrics).await,
        Commands::Generate(args) => commands::run_generate(args),
    }
}
