//! Simulation configuration.
//!
//! [`SimulationConfig`] holds everything the drivers need besides the grid
//! data. Construct it through [`SimulationConfig::builder()`], which
//! validates on `build()`.

use crate::error::ConfigError;
use crate::simulation::SimulationMethod;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of lookups.
pub const DEFAULT_LOOKUPS: usize = 17_000_000;
/// Default seed of the lookup sampling stream.
pub const DEFAULT_LOOKUP_SEED: u64 = 1070;
/// Default lookups per particle history.
pub const DEFAULT_LOOKUPS_PER_HISTORY: usize = 34;
/// Default half-width of the history energy walk.
pub const DEFAULT_WALK_WIDTH: f64 = 0.05;
/// Default chunk size of the optimised event kernel.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Configuration for a simulation run.
///
/// # Default Values
///
/// | Parameter | Default | Description |
/// |-----------|---------|-------------|
/// | `method` | `EventBased` | Simulation strategy |
/// | `lookups` | 17 000 000 | Total macroscopic lookups |
/// | `threads` | logical CPUs | Worker pool size |
/// | `seed` | 1070 | Sampling stream seed |
/// | `lookups_per_history` | 34 | History length |
/// | `walk_width` | 0.05 | History energy walk half-width |
/// | `chunk_size` | 1024 | Optimised kernel chunk size |
///
/// # Examples
///
/// ```rust
/// use xs_kernel::{SimulationConfig, SimulationMethod};
///
/// let config = SimulationConfig::builder()
///     .method(SimulationMethod::HistoryBased)
///     .lookups(10_000)
///     .threads(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.histories(), 295);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    method: SimulationMethod,
    lookups: usize,
    threads: usize,
    seed: u64,
    lookups_per_history: usize,
    walk_width: f64,
    chunk_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            method: SimulationMethod::default(),
            lookups: DEFAULT_LOOKUPS,
            threads: num_cpus::get().max(1),
            seed: DEFAULT_LOOKUP_SEED,
            lookups_per_history: DEFAULT_LOOKUPS_PER_HISTORY,
            walk_width: DEFAULT_WALK_WIDTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SimulationConfig {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Simulation strategy.
    #[inline]
    pub fn method(&self) -> SimulationMethod {
        self.method
    }

    /// Total number of lookups.
    #[inline]
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Worker pool size.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Sampling stream seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Lookups per history (history-based strategy).
    #[inline]
    pub fn lookups_per_history(&self) -> usize {
        self.lookups_per_history
    }

    /// Half-width of the energy walk between consecutive history lookups.
    #[inline]
    pub fn walk_width(&self) -> f64 {
        self.walk_width
    }

    /// Lookups per work chunk (optimised event strategy).
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of histories covering `lookups`; the last may be short.
    #[inline]
    pub fn histories(&self) -> usize {
        self.lookups.div_ceil(self.lookups_per_history)
    }

    /// Checks every parameter range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookups == 0 {
            return Err(invalid("lookups", "must be at least 1"));
        }
        if self.threads == 0 {
            return Err(invalid("threads", "must be at least 1"));
        }
        if self.lookups_per_history == 0 {
            return Err(invalid("lookups_per_history", "must be at least 1"));
        }
        if !(self.walk_width > 0.0 && self.walk_width <= 1.0) {
            return Err(invalid(
                "walk_width",
                format!("must be in (0, 1], got {}", self.walk_width),
            ));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Builder for [`SimulationConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    /// Sets the simulation strategy.
    pub fn method(mut self, method: SimulationMethod) -> Self {
        self.config.method = method;
        self
    }

    /// Sets the total number of lookups.
    pub fn lookups(mut self, lookups: usize) -> Self {
        self.config.lookups = lookups;
        self
    }

    /// Sets the worker pool size.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Sets the sampling seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets the history length.
    pub fn lookups_per_history(mut self, lookups_per_history: usize) -> Self {
        self.config.lookups_per_history = lookups_per_history;
        self
    }

    /// Sets the history energy walk half-width.
    pub fn walk_width(mut self, walk_width: f64) -> Self {
        self.config.walk_width = walk_width;
        self
    }

    /// Sets the optimised kernel chunk size.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
