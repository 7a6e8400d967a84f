//! Error types for simulation configuration and execution.

use thiserror::Error;

/// Configuration error for the simulation drivers.
///
/// Raised while building a [`SimulationConfig`](crate::SimulationConfig) or
/// selecting a strategy, always before any lookup runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Simulation method name not recognised.
    #[error("Unknown simulation method '{0}': expected 'event' or 'history'")]
    UnknownMethod(String),

    /// Kernel selector not recognised for the chosen method.
    #[error("No kernel ID {kernel_id} found for the {method} method")]
    UnknownKernel {
        /// Method the kernel was requested for.
        method: String,
        /// Requested kernel id.
        kernel_id: u32,
    },

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Failure to start a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
