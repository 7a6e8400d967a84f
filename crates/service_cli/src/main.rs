//! xsbench - Cross-Section Lookup Benchmark CLI
//!
//! Operational entry point of the benchmark. Parses arguments, initialises
//! tracing, runs the configured simulation and prints the report.
//!
//! # Usage
//!
//! - `xsbench -s small -l 1000000` - event-based baseline on the small problem
//! - `xsbench -m event -k 1` - event-based optimised kernel
//! - `xsbench -m history -p 34` - history-based simulation
//! - `xsbench -b write --binary-file grid.dat` - generate and save the grid
//! - `xsbench -c xsbench.toml --format json` - file configuration, JSON report

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use service_cli::commands::{report, run};
use service_cli::config::{
    build_config, BenchConfig, BinaryMode, CliArgs, LogLevel, OutputFormat, ProblemSize,
};
use service_cli::{exit_status, EXIT_CONFIG_ERROR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Continuous-energy macroscopic cross-section lookup benchmark
#[derive(Parser, Debug)]
#[command(name = "xsbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE", env = "XSBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Worker threads (default: logical CPUs)
    #[arg(short, long, env = "XSBENCH_THREADS")]
    threads: Option<usize>,

    /// Problem size preset
    #[arg(short, long, value_enum)]
    size: Option<ProblemSize>,

    /// Grid points per nuclide (overrides the size preset)
    #[arg(short, long)]
    gridpoints: Option<usize>,

    /// Number of nuclides (overrides the size preset)
    #[arg(long)]
    isotopes: Option<usize>,

    /// Number of materials
    #[arg(long)]
    materials: Option<usize>,

    /// Total cross-section lookups
    #[arg(short, long, env = "XSBENCH_LOOKUPS")]
    lookups: Option<usize>,

    /// Simulation method (event, history)
    #[arg(short, long)]
    method: Option<String>,

    /// Kernel id within the method (event: 0 baseline, 1 optimised)
    #[arg(short, long)]
    kernel: Option<u32>,

    /// Lookups per particle history
    #[arg(short = 'p', long)]
    lookups_per_history: Option<usize>,

    /// Lookup sampling seed
    #[arg(long)]
    seed: Option<u64>,

    /// Grid generation seed
    #[arg(long)]
    grid_seed: Option<u64>,

    /// Binary grid file handling
    #[arg(short, long, value_enum)]
    binary_mode: Option<BinaryMode>,

    /// Binary grid file path
    #[arg(long, value_name = "FILE")]
    binary_file: Option<PathBuf>,

    /// Known-good verification value to check against
    #[arg(long)]
    expected: Option<u64>,

    /// Check grid invariants before simulating
    #[arg(long)]
    validate: bool,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, value_enum, env = "XSBENCH_LOG_LEVEL")]
    log_level: Option<LogLevel>,

    /// Enable verbose (debug) output
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for CliArgs {
    fn from(cli: Cli) -> Self {
        CliArgs {
            size: cli.size,
            isotopes: cli.isotopes,
            gridpoints: cli.gridpoints,
            materials: cli.materials,
            lookups: cli.lookups,
            method: cli.method,
            kernel: cli.kernel,
            lookups_per_history: cli.lookups_per_history,
            seed: cli.seed,
            grid_seed: cli.grid_seed,
            threads: cli.threads,
            binary_mode: cli.binary_mode,
            binary_file: cli.binary_file,
            expected: cli.expected,
            validate: cli.validate,
            format: cli.format,
            log_level: cli.log_level,
            verbose: cli.verbose,
        }
    }
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn try_run(config: &BenchConfig) -> anyhow::Result<ExitCode> {
    let report = run::execute(config).context("benchmark failed")?;
    let rendered = report::render(&report, config.format).context("report failed")?;
    println!("{}", rendered);

    let outcome = report.outcome();
    if !outcome.is_ok() {
        tracing::error!(?outcome, "Verification mismatch");
    }
    Ok(ExitCode::from(exit_status(&outcome)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_file = cli.config.clone();
    let args = CliArgs::from(cli);

    let config = match build_config(config_file.as_deref(), &args) {
        Ok(config) => config,
        Err(err) => {
            init_tracing(args.log_level.unwrap_or_default());
            tracing::error!("{}", err);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    init_tracing(config.log_level);
    tracing::info!("xsbench v{}", env!("CARGO_PKG_VERSION"));

    match try_run(&config) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}
