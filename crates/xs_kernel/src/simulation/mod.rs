//! Simulation drivers.
//!
//! Three strategies run the same lookup kernel over the same sampled
//! workload:
//!
//! - [`EventBased`]: every lookup independent, full binary search
//! - [`EventBasedOptimised`]: lookups sorted by (material, energy), then
//!   evaluated in chunks with a hinted search
//! - [`HistoryBased`]: lookups grouped into particle histories whose energies
//!   follow a random walk
//!
//! The two event strategies produce the same checksum for the same
//! configuration. Every strategy is deterministic for a seed, whatever the
//! thread count.
//!
//! [`run_simulation`] is the timed entry point: it builds the worker pool,
//! enters the `simulation` region and measures wall time.

mod event;
mod history;
mod optimised;

pub use event::EventBased;
pub use history::HistoryBased;
pub use optimised::EventBasedOptimised;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use xs_core::SimulationData;

use crate::config::SimulationConfig;
use crate::error::{ConfigError, SimulationError};
use crate::region::{Region, SIMULATION_REGION};
use crate::verify::{Verification, VerificationOutcome};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A lookup simulation strategy.
pub trait Simulation {
    /// Short strategy name.
    fn name(&self) -> &'static str;

    /// Runs every configured lookup and returns the raw checksum.
    ///
    /// Parallel work runs on the current rayon pool.
    fn run(&self, data: &SimulationData, config: &SimulationConfig) -> u64;
}

/// Closed set of simulation strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SimulationMethod {
    /// Event-based, baseline kernel (kernel 0).
    #[default]
    EventBased,
    /// Event-based, sorted and chunked kernel (kernel 1).
    EventBasedOptimised,
    /// History-based.
    HistoryBased,
}

impl SimulationMethod {
    /// Every strategy.
    pub const ALL: [SimulationMethod; 3] = [
        SimulationMethod::EventBased,
        SimulationMethod::EventBasedOptimised,
        SimulationMethod::HistoryBased,
    ];

    /// Resolves a method name and kernel id.
    ///
    /// `event` accepts kernels 0 (baseline) and 1 (optimised); `history`
    /// accepts kernel 0 only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xs_kernel::SimulationMethod;
    ///
    /// assert_eq!(
    ///     SimulationMethod::from_selector("event", 1).unwrap(),
    ///     SimulationMethod::EventBasedOptimised
    /// );
    /// assert!(SimulationMethod::from_selector("history", 3).is_err());
    /// ```
    pub fn from_selector(method: &str, kernel_id: u32) -> Result<Self, ConfigError> {
        let unknown_kernel = || ConfigError::UnknownKernel {
            method: method.to_string(),
            kernel_id,
        };
        match method.to_ascii_lowercase().as_str() {
            "event" => match kernel_id {
                0 => Ok(SimulationMethod::EventBased),
                1 => Ok(SimulationMethod::EventBasedOptimised),
                _ => Err(unknown_kernel()),
            },
            "history" => match kernel_id {
                0 => Ok(SimulationMethod::HistoryBased),
                _ => Err(unknown_kernel()),
            },
            _ => Err(ConfigError::UnknownMethod(method.to_string())),
        }
    }

    /// Method family name (`event` or `history`).
    pub fn family(&self) -> &'static str {
        match self {
            SimulationMethod::EventBased | SimulationMethod::EventBasedOptimised => "event",
            SimulationMethod::HistoryBased => "history",
        }
    }

    /// Kernel id within the family.
    pub fn kernel_id(&self) -> u32 {
        match self {
            SimulationMethod::EventBasedOptimised => 1,
            _ => 0,
        }
    }

    fn strategy(&self) -> &'static dyn Simulation {
        match self {
            SimulationMethod::EventBased => &EventBased,
            SimulationMethod::EventBasedOptimised => &EventBasedOptimised,
            SimulationMethod::HistoryBased => &HistoryBased,
        }
    }
}

impl Simulation for SimulationMethod {
    fn name(&self) -> &'static str {
        self.strategy().name()
    }

    fn run(&self, data: &SimulationData, config: &SimulationConfig) -> u64 {
        self.strategy().run(data, config)
    }
}

impl fmt::Display for SimulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationMethod {
    type Err = ConfigError;

    /// Parses a strategy name as printed by `Display`, or a bare family
    /// name with kernel 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(method) = Self::ALL.iter().find(|m| m.name().eq_ignore_ascii_case(s)) {
            return Ok(*method);
        }
        Self::from_selector(s, 0)
    }
}

/// Outcome of a timed simulation run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationResult {
    /// Strategy that ran.
    pub method: SimulationMethod,
    /// Lookups performed.
    pub lookups: usize,
    /// Worker pool size.
    pub threads: usize,
    /// Wall time of the simulation phase.
    pub elapsed: Duration,
    /// Verification checksum.
    pub verification: Verification,
}

impl SimulationResult {
    /// Lookup throughput.
    pub fn lookups_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lookups as f64 / secs
        } else {
            f64::INFINITY
        }
    }

    /// Compares the verification value against `expected`.
    pub fn check(&self, expected: Option<u64>) -> VerificationOutcome {
        self.verification.check(expected)
    }
}

/// Runs the configured strategy on a dedicated pool of
/// `config.threads()` workers and times it.
///
/// # Errors
///
/// Returns [`SimulationError::Config`] if the configuration is invalid and
/// [`SimulationError::ThreadPool`] if the pool cannot be created.
///
/// # Examples
///
/// ```rust
/// use xs_core::{builder, GridConfig};
/// use xs_kernel::{run_simulation, SimulationConfig, SimulationMethod};
///
/// let grid = GridConfig::builder()
///     .n_isotopes(5)
///     .n_gridpoints(20)
///     .n_materials(3)
///     .build()
///     .unwrap();
/// let data = builder::generate(&grid).unwrap();
///
/// let config = SimulationConfig::builder()
///     .method(SimulationMethod::EventBased)
///     .lookups(1_000)
///     .threads(2)
///     .build()
///     .unwrap();
/// let result = run_simulation(&data, &config).unwrap();
/// assert!(result.verification.value() < 999_983);
/// ```
pub fn run_simulation(
    data: &SimulationData,
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads())
        .thread_name(|i| format!("xs-worker-{}", i))
        .build()?;

    let method = config.method();
    tracing::info!(
        method = method.name(),
        lookups = config.lookups(),
        threads = config.threads(),
        "Starting simulation"
    );

    let (checksum, elapsed) = {
        let _region = Region::enter(SIMULATION_REGION);
        let start = Instant::now();
        let checksum = pool.install(|| method.run(data, config));
        (checksum, start.elapsed())
    };

    let verification = Verification::new(checksum);
    tracing::info!(
        method = method.name(),
        elapsed_ms = elapsed.as_millis() as u64,
        verification = verification.value(),
        "Simulation complete"
    );

    Ok(SimulationResult {
        method,
        lookups: config.lookups(),
        threads: config.threads(),
        elapsed,
        verification,
    })
}
