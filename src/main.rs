//! rcpsp CLI - compare search strategies on a project file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_rcpsp::comparator::StrategyComparator;
use u_rcpsp::config::RunConfig;
use u_rcpsp::cp::{BranchAndBoundEngine, SearchStrategy};
use u_rcpsp::{psplib, report};

#[derive(Parser)]
#[command(name = "rcpsp")]
#[command(about = "Resource-constrained project scheduling with search strategy comparison", long_about = None)]
struct Cli {
    /// Project description file
    input: PathBuf,
    /// Performance table destination (CSV)
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// JSON run configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Strategy to compare (repeatable; default: all)
    #[arg(long = "strategy", value_parser = parse_strategy)]
    strategies: Vec<SearchStrategy>,
    /// Per-solve time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,
    /// Abort on the first model construction error
    #[arg(long)]
    strict: bool,
    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

fn parse_strategy(s: &str) -> Result<SearchStrategy, String> {
    s.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };
    if !cli.strategies.is_empty() {
        config.strategies = cli.strategies;
    }
    if let Some(secs) = cli.time_limit {
        config.time_limit_secs = Some(secs);
    }
    if cli.strict {
        config.strict = true;
    }
    if let Some(output) = cli.output {
        config.output_csv = output;
    }

    let project = psplib::parse(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    info!(
        tasks = project.task_count(),
        resources = project.resources().len(),
        horizon = project.horizon(),
        "project loaded"
    );

    let engine = BranchAndBoundEngine::new().with_config(config.engine_config());
    let outcome = StrategyComparator::new(engine)
        .with_strategies(config.strategies.clone())
        .strict(config.strict)
        .run(&project)?;

    report::write_results_file(&config.output_csv, &outcome.results)
        .with_context(|| format!("failed to write {}", config.output_csv.display()))?;

    println!("{}", report::summary_line(&outcome.best.result));
    println!("Full results saved to: {}", config.output_csv.display());
    println!();
    print!(
        "{}",
        report::render_schedule_grid(&project, &outcome.best.schedule, outcome.best.result.makespan)
    );

    Ok(())
}
