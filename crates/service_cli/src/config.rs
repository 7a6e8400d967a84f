//! Benchmark configuration management
//!
//! Loads [`BenchConfig`] from a TOML file and merges command line arguments
//! over it. Environment variables reach the merge through clap's `env`
//! support, so the priority (highest to lowest) is:
//!
//! 1. CLI arguments
//! 2. Environment variables (`XSBENCH_*`)
//! 3. Config file
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use xs_core::builder::{DEFAULT_GRIDPOINTS, DEFAULT_GRID_SEED, DEFAULT_ISOTOPES, DEFAULT_MATERIALS};
use xs_core::GridConfig;
use xs_kernel::config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LOOKUPS, DEFAULT_LOOKUPS_PER_HISTORY, DEFAULT_LOOKUP_SEED,
    DEFAULT_WALK_WIDTH,
};
use xs_kernel::{SimulationConfig, SimulationMethod};

use crate::error::{CliError, Result};

/// Default binary grid file.
pub const DEFAULT_BINARY_FILE: &str = "XS_data.dat";

/// Nuclide count of the `small` problem.
const SMALL_ISOTOPES: usize = 68;
/// Grid points per nuclide of the `xl` problem.
const XL_GRIDPOINTS: usize = 238_847;
/// Grid points per nuclide of the `xxl` problem.
const XXL_GRIDPOINTS: usize = 501_578;

/// Problem size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProblemSize {
    /// 68 nuclides, 11 303 points each.
    Small,
    /// 355 nuclides, 11 303 points each.
    #[default]
    Large,
    /// 355 nuclides, 238 847 points each.
    Xl,
    /// 355 nuclides, 501 578 points each.
    Xxl,
}

impl ProblemSize {
    /// Nuclide count of the preset.
    pub fn n_isotopes(&self) -> usize {
        match self {
            ProblemSize::Small => SMALL_ISOTOPES,
            _ => DEFAULT_ISOTOPES,
        }
    }

    /// Grid points per nuclide of the preset.
    pub fn n_gridpoints(&self) -> usize {
        match self {
            ProblemSize::Small | ProblemSize::Large => DEFAULT_GRIDPOINTS,
            ProblemSize::Xl => XL_GRIDPOINTS,
            ProblemSize::Xxl => XXL_GRIDPOINTS,
        }
    }
}

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProblemSize::Small => "small",
            ProblemSize::Large => "large",
            ProblemSize::Xl => "XL",
            ProblemSize::Xxl => "XXL",
        };
        f.write_str(name)
    }
}

/// What to do with the binary grid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BinaryMode {
    /// Generate the grid and keep it in memory only.
    #[default]
    None,
    /// Load the grid from the file instead of generating it.
    Read,
    /// Generate the grid, then write it to the file.
    Write,
}

impl fmt::Display for BinaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryMode::None => "none",
            BinaryMode::Read => "read",
            BinaryMode::Write => "write",
        };
        f.write_str(name)
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,
    /// One JSON document.
    Json,
}

/// Log levels accepted by `log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Builder and region detail.
    Debug,
    /// Progress messages.
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Filter directive for `tracing_subscriber::EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Complete benchmark configuration.
///
/// Every field is optional in the TOML file. `isotopes` and `gridpoints`
/// override the counts of `size` when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Problem size preset.
    pub size: ProblemSize,
    /// Nuclide count override.
    pub isotopes: Option<usize>,
    /// Grid points per nuclide override.
    pub gridpoints: Option<usize>,
    /// Number of materials.
    pub materials: usize,
    /// Total lookups.
    pub lookups: usize,
    /// Simulation method family (`event` or `history`).
    pub method: String,
    /// Kernel id within the family.
    pub kernel: u32,
    /// Lookups per history.
    pub lookups_per_history: usize,
    /// Sampling seed.
    pub seed: u64,
    /// Grid generation seed.
    pub grid_seed: u64,
    /// Worker count; logical CPUs when unset.
    pub threads: Option<usize>,
    /// History energy walk half-width.
    pub walk_width: f64,
    /// Optimised kernel chunk size.
    pub chunk_size: usize,
    /// Binary grid file handling.
    pub binary_mode: BinaryMode,
    /// Binary grid file path.
    pub binary_file: PathBuf,
    /// Known-good verification value.
    pub expected: Option<u64>,
    /// Run the full invariant check on the grid before simulating.
    pub validate: bool,
    /// Report format.
    pub format: OutputFormat,
    /// Log level when `RUST_LOG` is unset.
    pub log_level: LogLevel,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            size: ProblemSize::default(),
            isotopes: None,
            gridpoints: None,
            materials: DEFAULT_MATERIALS,
            lookups: DEFAULT_LOOKUPS,
            method: "event".to_string(),
            kernel: 0,
            lookups_per_history: DEFAULT_LOOKUPS_PER_HISTORY,
            seed: DEFAULT_LOOKUP_SEED,
            grid_seed: DEFAULT_GRID_SEED,
            threads: None,
            walk_width: DEFAULT_WALK_WIDTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            binary_mode: BinaryMode::default(),
            binary_file: PathBuf::from(DEFAULT_BINARY_FILE),
            expected: None,
            validate: false,
            format: OutputFormat::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl BenchConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            CliError::ConfigFile { reason, .. } => CliError::ConfigFile {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::ConfigFile {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Merges CLI arguments over this configuration (CLI takes precedence).
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(size) = cli.size {
            self.size = size;
        }
        if cli.isotopes.is_some() {
            self.isotopes = cli.isotopes;
        }
        if cli.gridpoints.is_some() {
            self.gridpoints = cli.gridpoints;
        }
        if let Some(materials) = cli.materials {
            self.materials = materials;
        }
        if let Some(lookups) = cli.lookups {
            self.lookups = lookups;
        }
        if let Some(method) = &cli.method {
            self.method = method.clone();
        }
        if let Some(kernel) = cli.kernel {
            self.kernel = kernel;
        }
        if let Some(per_history) = cli.lookups_per_history {
            self.lookups_per_history = per_history;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(grid_seed) = cli.grid_seed {
            self.grid_seed = grid_seed;
        }
        if cli.threads.is_some() {
            self.threads = cli.threads;
        }
        if let Some(mode) = cli.binary_mode {
            self.binary_mode = mode;
        }
        if let Some(file) = &cli.binary_file {
            self.binary_file = file.clone();
        }
        if cli.expected.is_some() {
            self.expected = cli.expected;
        }
        if cli.validate {
            self.validate = true;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if cli.verbose {
            self.log_level = LogLevel::Debug;
        }
    }

    /// Worker count, defaulting to the logical CPU count.
    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    /// Grid generation parameters.
    pub fn grid_config(&self) -> Result<GridConfig> {
        Ok(GridConfig::builder()
            .n_isotopes(self.isotopes.unwrap_or(self.size.n_isotopes()))
            .n_gridpoints(self.gridpoints.unwrap_or(self.size.n_gridpoints()))
            .n_materials(self.materials)
            .seed(self.grid_seed)
            .build()?)
    }

    /// Simulation parameters, with the method resolved from `method` and
    /// `kernel`.
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let method = SimulationMethod::from_selector(&self.method, self.kernel)?;
        Ok(SimulationConfig::builder()
            .method(method)
            .lookups(self.lookups)
            .threads(self.resolved_threads())
            .seed(self.seed)
            .lookups_per_history(self.lookups_per_history)
            .walk_width(self.walk_width)
            .chunk_size(self.chunk_size)
            .build()?)
    }
}

/// Values given on the command line (or through `XSBENCH_*` variables).
///
/// `None` / `false` means "not given" and leaves the file value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Problem size preset.
    pub size: Option<ProblemSize>,
    /// Nuclide count override.
    pub isotopes: Option<usize>,
    /// Grid points override.
    pub gridpoints: Option<usize>,
    /// Material count.
    pub materials: Option<usize>,
    /// Total lookups.
    pub lookups: Option<usize>,
    /// Method family.
    pub method: Option<String>,
    /// Kernel id.
    pub kernel: Option<u32>,
    /// Lookups per history.
    pub lookups_per_history: Option<usize>,
    /// Sampling seed.
    pub seed: Option<u64>,
    /// Grid seed.
    pub grid_seed: Option<u64>,
    /// Worker count.
    pub threads: Option<usize>,
    /// Binary mode.
    pub binary_mode: Option<BinaryMode>,
    /// Binary file.
    pub binary_file: Option<PathBuf>,
    /// Expected verification value.
    pub expected: Option<u64>,
    /// Validate grid invariants.
    pub validate: bool,
    /// Report format.
    pub format: Option<OutputFormat>,
    /// Log level.
    pub log_level: Option<LogLevel>,
    /// Shorthand for debug logging.
    pub verbose: bool,
}

/// Builds the configuration from all sources.
///
/// Starts from `config_file` when given (it must exist), else from the
/// defaults.
pub fn build_config(config_file: Option<&Path>, cli: &CliArgs) -> Result<BenchConfig> {
    let mut config = match config_file {
        Some(path) => BenchConfig::from_file(path)?,
        None => BenchConfig::default(),
    };
    config.merge_with_cli(cli);
    Ok(config)
}
