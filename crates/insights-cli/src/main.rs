//! Retail insights batch CLI
//!
//! Runs the clean, analyze and insights phases over one sales export and
//! writes every aggregate table to the artifact directory. `summary` prints
//! a markdown preview of whatever artifacts exist.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use insights_duck::Warehouse;
use insights_ir::TransactionRow;
use insights_pipeline::{analyze_phase, clean_phase, insights_phase, read_raw_csv};
use insights_store::{ArtifactStore, FsBackend};
use std::path::PathBuf;
use tracing::{info, info_span, Level};
use uuid::Uuid;

mod config;
mod logging;
mod summary;

use config::Config;

#[derive(Parser)]
#[command(name = "insights", about = "Retail sales reporting pipeline", version)]
struct Cli {
    /// YAML configuration file. Missing means defaults plus environment.
    #[arg(long, global = true, value_name = "PATH", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize the raw export and save the cleaned snapshot.
    Clean(InputArgs),
    /// Compute every base aggregate from the cleaned snapshot.
    Analyze,
    /// Build the cross-sell and growth opportunity tables.
    Insights,
    /// Run clean, analyze and insights in order, stopping at the first failure.
    Run(InputArgs),
    /// Print a markdown preview of the persisted artifacts.
    Summary(SummaryArgs),
}

#[derive(Args, Clone)]
struct InputArgs {
    /// Raw sales export, overriding input.path from the config.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct SummaryArgs {
    /// Only preview this artifact.
    #[arg(long, value_name = "NAME")]
    artifact: Option<String>,
    /// Rows shown per artifact.
    #[arg(long, default_value_t = 10)]
    rows: usize,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Clean(_) => "clean",
            Command::Analyze => "analyze",
            Command::Insights => "insights",
            Command::Run(_) => "run",
            Command::Summary(_) => "summary",
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.validate()?;
    logging::init(&config.logging)?;

    let run_id = Uuid::new_v4();
    let _span = info_span!("run", run_id = %run_id, command = cli.command.name()).entered();
    info!(artifacts = %config.artifacts.directory.display(), "Starting");

    let store = ArtifactStore::open(config.artifacts.directory.clone());
    match &cli.command {
        Command::Clean(args) => clean(&config, &store, args),
        Command::Analyze => analyze(&config, &store),
        Command::Insights => insights(&store),
        Command::Run(args) => {
            clean(&config, &store, args)?;
            analyze(&config, &store)?;
            insights(&store)
        }
        Command::Summary(args) => {
            let text = summary::render_store(&store, args.artifact.as_deref(), args.rows)?;
            print!("{text}");
            Ok(())
        }
    }
}

fn clean(config: &Config, store: &ArtifactStore<FsBackend>, args: &InputArgs) -> anyhow::Result<()> {
    let input = args.input.as_ref().unwrap_or(&config.input.path);
    let raw = read_raw_csv(input).with_context(|| format!("reading {}", input.display()))?;

    let outcome = clean_phase(&raw, store).context("clean phase failed")?;
    log_event!(
        level: Level::INFO,
        event: "phase_completed",
        phase: "clean",
        rows: outcome.rows.len(),
        duplicates: outcome.report.duplicate_rows,
        dropped: outcome.report.dropped_rows,
        coerced: outcome.report.total_coercions()
    );

    if config.warehouse.enabled {
        load_warehouse(config, &outcome.rows)?;
    }
    Ok(())
}

fn load_warehouse(config: &Config, rows: &[TransactionRow]) -> anyhow::Result<()> {
    let mut warehouse = Warehouse::open(&config.warehouse.path)
        .with_context(|| format!("opening warehouse {}", config.warehouse.path.display()))?;
    let loaded = warehouse.replace_table(&config.warehouse.table, rows)?;
    log_event!(
        level: Level::INFO,
        event: "warehouse_loaded",
        table: config.warehouse.table,
        rows: loaded
    );
    Ok(())
}

fn analyze(config: &Config, store: &ArtifactStore<FsBackend>) -> anyhow::Result<()> {
    let outcome = analyze_phase(store, &config.analysis).context("analyze phase failed")?;
    log_event!(
        level: Level::INFO,
        event: "phase_completed",
        phase: "analyze",
        rows: outcome.input_rows,
        artifacts: outcome.artifacts.len(),
        total_revenue: outcome.total_revenue
    );
    Ok(())
}

fn insights(store: &ArtifactStore<FsBackend>) -> anyhow::Result<()> {
    let outcome = insights_phase(store).context("insights phase failed")?;
    log_event!(
        level: Level::INFO,
        event: "phase_completed",
        phase: "insights",
        artifacts: outcome.artifacts.len(),
        latest_year: outcome.latest_region_year
    );
    Ok(())
}
