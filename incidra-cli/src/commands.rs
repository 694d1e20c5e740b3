use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

use incidra_config::IncidraConfig;
use incidra_engine::{CorrelationOutcome, RawRequest, ThreatEngine, TracingNotifier};
use incidra_store::{IncidentStore, MemoryEventStore, MemoryIncidentStore};
use incidra_telemetry::metrics::MetricsRecorder;

use crate::scenario::{self, Scenario};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Optional configuration file; defaults to the config/ hierarchy.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest newline-delimited request records from stdin
    Run(RunArgs),
    /// Replay a recorded scenario file deterministically
    Replay(ReplayArgs),
    /// Generate a synthetic scenario file
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Print the prometheus metrics dump on shutdown
    #[arg(long, default_value_t = false)]
    pub dump_metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Scenario file to replay
    #[arg(short, long)]
    pub scenario: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of requests to generate
    #[arg(long, default_value_t = 100)]
    pub events: usize,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Output path; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

struct EngineRig {
    engine: ThreatEngine,
    incidents: Arc<MemoryIncidentStore>,
}

fn build_engine(config: &IncidraConfig, metrics: MetricsRecorder) -> EngineRig {
    let events = Arc::new(MemoryEventStore::new());
    let incidents = Arc::new(MemoryIncidentStore::new());
    let engine = ThreatEngine::new(
        events,
        incidents.clone(),
        Arc::new(TracingNotifier),
        config,
        Arc::new(metrics),
    );
    EngineRig { engine, incidents }
}

/// Live mode: one YAML/JSON request record per stdin line.
pub async fn run_live(
    args: RunArgs,
    config: IncidraConfig,
    metrics: MetricsRecorder,
) -> anyhow::Result<()> {
    let rig = build_engine(&config, metrics);
    let _sweeper = rig.engine.sweeper().spawn();
    info!("engine ready, reading requests from stdin");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawRequest = match serde_yaml::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "rejecting malformed request record");
                continue;
            }
        };
        let report = rig.engine.ingest(raw).await?;
        if report.blocked() {
            println!(
                "BLOCKED {} {} ({})",
                report.event.source_addr, report.event.endpoint, report.event.subtype
            );
        }
    }

    // Let detached correlation tasks drain before the summary.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    print_summary(&rig).await?;
    if args.dump_metrics {
        println!("{}", rig.engine.metrics().gather_metrics()?);
    }
    Ok(())
}

/// Replay mode: scenario requests run through the synchronous pipeline in
/// order, each at its pinned timestamp.
pub async fn run_replay(
    args: ReplayArgs,
    config: IncidraConfig,
    metrics: MetricsRecorder,
) -> anyhow::Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    info!(name = %scenario.name, requests = scenario.requests.len(), "replaying scenario");

    let rig = build_engine(&config, metrics);
    let mut blocked = 0usize;
    let mut created = 0usize;
    let mut updated = 0usize;

    for raw in scenario.requests {
        let now = raw.timestamp.unwrap_or_else(Utc::now);
        let (report, outcome) = rig.engine.ingest_sync(raw, now).await?;
        if report.blocked() {
            blocked += 1;
        }
        match outcome {
            Some(CorrelationOutcome::Created(_)) => created += 1,
            Some(CorrelationOutcome::JoinedExisting(_)) => updated += 1,
            _ => {}
        }
    }

    println!(
        "replayed {}: {blocked} blocked, {created} incidents created, {updated} updates",
        scenario.name
    );
    print_summary(&rig).await?;
    Ok(())
}

pub fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let scenario = scenario::generate(args.seed, args.events);
    let yaml = scenario.to_yaml()?;
    match args.output {
        Some(path) => std::fs::write(path, yaml)?,
        None => print!("{yaml}"),
    }
    Ok(())
}

async fn print_summary(rig: &EngineRig) -> anyhow::Result<()> {
    let incidents = rig.incidents.list().await?;
    println!("{} incident(s):", incidents.len());
    for incident in incidents {
        println!(
            "  {} {} {} severity={} occurrences={} status={:?}",
            incident.id,
            incident.source_addr,
            incident.type_label,
            incident.severity,
            incident.occurrence_count,
            incident.status
        );
    }
    Ok(())
}
