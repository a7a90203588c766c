//! MESI coherence simulator CLI.
//!
//! This binary provides a single entry point for trace-driven simulation. It performs:
//! 1. **Run:** Load a thread trace and a configuration, simulate until every assigned
//!    thread is drained, and print the statistics report (text or JSON).
//! 2. **Schedule:** Plan a thread-to-core assignment for a trace (greedy or DMDA) and
//!    print the resulting configuration as JSON, ready to be passed to `run --config`.
//! 3. **Config:** Print the effective configuration as JSON, ready to be edited and fed back.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use mesisim_core::config::{Config, ScheduleConfig};
use mesisim_core::core::CoreId;
use mesisim_core::sim::assign::{self, ALGORITHMS, Algorithm, DEFAULT_FETCH_COST, PlanOptions};
use mesisim_core::sim::loader;
use mesisim_core::sim::workload::ThreadId;
use mesisim_core::stats::STATS_SECTIONS;
use mesisim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "mesisim",
    author,
    version,
    about = "Trace-driven multi-core MESI cache-coherence simulator",
    long_about = "Replay per-thread memory traces on private L1 data caches kept coherent by a snooping bus.\n\nExamples:\n  mesisim run --trace matmul.trace --config configs/reference.json\n  mesisim run --trace t.trace --cores 2 --assign 0=1 --assign 1=2,3 --stats cores\n  mesisim schedule --trace t.trace --algo dmda --cores 4 > planned.json\n  mesisim config --config configs/reference.json"
)]
struct Cli {
    /// Log more (repeat for trace-level output). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a trace and print statistics.
    Run {
        /// Thread trace to replay.
        #[arg(short, long)]
        trace: PathBuf,

        /// JSON configuration (defaults are used when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of cores.
        #[arg(long)]
        cores: Option<usize>,

        /// Override the miss penalty in op-count ticks.
        #[arg(long)]
        miss_penalty: Option<u64>,

        /// Replace one core's thread list, as `CORE=T1,T2,...` (last thread runs first).
        #[arg(short, long, value_parser = parse_assignment)]
        assign: Vec<(CoreId, Vec<ThreadId>)>,

        /// Report section to print (repeatable; default all).
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS))]
        stats: Vec<String>,

        /// Print statistics as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Plan a thread-to-core assignment and print the configuration as JSON.
    Schedule {
        /// Thread trace to plan for.
        #[arg(short, long)]
        trace: PathBuf,

        /// Assignment heuristic.
        #[arg(long, default_value = "dmda", value_parser = clap::builder::PossibleValuesParser::new(ALGORITHMS))]
        algo: String,

        /// Base configuration; its schedule is replaced.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of cores.
        #[arg(long)]
        cores: Option<usize>,

        /// Cost of fetching one missing cache block (DMDA).
        #[arg(long, default_value_t = DEFAULT_FETCH_COST)]
        fetch_cost: u64,

        /// Reorder each core's threads so the one needing the least new data runs first.
        #[arg(long)]
        reorder: bool,
    },

    /// Print the effective configuration as JSON.
    Config {
        /// JSON configuration to load and validate.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            trace,
            config,
            cores,
            miss_penalty,
            assign,
            stats,
            json,
        } => cmd_run(
            &trace,
            config.as_deref(),
            cores,
            miss_penalty,
            assign,
            &stats,
            json,
        ),
        Commands::Schedule {
            trace,
            algo,
            config,
            cores,
            fetch_cost,
            reorder,
        } => cmd_schedule(&trace, &algo, config.as_deref(), cores, fetch_cost, reorder),
        Commands::Config { config } => cmd_config(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr `fmt` subscriber; `RUST_LOG` overrides `--verbose`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parses `CORE=T1,T2,...`. An empty list (`CORE=`) leaves the core idle.
fn parse_assignment(text: &str) -> Result<(CoreId, Vec<ThreadId>), String> {
    let (core, threads) = text
        .split_once('=')
        .ok_or_else(|| format!("expected CORE=T1,T2,..., got '{text}'"))?;
    let core = core
        .trim()
        .parse()
        .map_err(|e| format!("invalid core '{core}': {e}"))?;
    let threads = threads
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse().map_err(|e| format!("invalid thread '{t}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((core, threads))
}

/// Loads the config and applies command-line overrides, then re-validates.
fn effective_config(
    path: Option<&Path>,
    cores: Option<usize>,
    miss_penalty: Option<u64>,
    assign: Vec<(CoreId, Vec<ThreadId>)>,
) -> anyhow::Result<Config> {
    let mut config = loader::load_config(path).with_context(|| match path {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "failed to build default config".to_owned(),
    })?;
    if let Some(n) = cores {
        config.system.num_cores = n;
    }
    if let Some(p) = miss_penalty {
        config.system.miss_penalty = p;
    }
    for (core, threads) in assign {
        config.schedule.assign(core, threads);
    }
    config
        .validate()
        .context("invalid configuration after command-line overrides")?;
    Ok(config)
}

fn cmd_run(
    trace: &Path,
    config: Option<&Path>,
    cores: Option<usize>,
    miss_penalty: Option<u64>,
    assign: Vec<(CoreId, Vec<ThreadId>)>,
    sections: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let config = effective_config(config, cores, miss_penalty, assign)?;
    if config.schedule.is_empty() {
        bail!("no threads are assigned to any core (use --config or --assign)");
    }

    let workload = loader::load_trace(trace)
        .with_context(|| format!("failed to load trace {}", trace.display()))?;
    let mut sim = Simulator::new(&config, workload).context("failed to set up simulation")?;
    let stats = sim.run().context("simulation failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("failed to serialize statistics")?
        );
    } else {
        stats.print_sections(sections);
    }
    Ok(())
}

/// Loads the base config and trace and replaces the schedule with a planned one.
fn planned_config(
    trace: &Path,
    algo: &str,
    config: Option<&Path>,
    cores: Option<usize>,
    fetch_cost: u64,
    reorder: bool,
) -> anyhow::Result<Config> {
    let algorithm: Algorithm = algo.parse()?;
    let mut config = loader::load_config(config).context("failed to load config")?;
    config.schedule = ScheduleConfig::default();
    if let Some(n) = cores {
        config.system.num_cores = n;
    }
    config
        .validate()
        .context("invalid configuration after command-line overrides")?;

    let workload = loader::load_trace(trace)
        .with_context(|| format!("failed to load trace {}", trace.display()))?;
    let options = PlanOptions {
        fetch_cost,
        reorder,
        ..PlanOptions::from_config(&config)
    };
    let plan = assign::plan(algorithm, &workload, &options).context("failed to plan schedule")?;
    config.schedule = plan.to_schedule();
    Ok(config)
}

fn cmd_schedule(
    trace: &Path,
    algo: &str,
    config: Option<&Path>,
    cores: Option<usize>,
    fetch_cost: u64,
    reorder: bool,
) -> anyhow::Result<()> {
    let config = planned_config(trace, algo, config, cores, fetch_cost, reorder)?;
    println!("{}", config.to_json()?);
    Ok(())
}

fn cmd_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config = loader::load_config(path).context("failed to load config")?;
    println!("{}", config.to_json()?);
    Ok(())
}
