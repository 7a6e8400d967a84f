//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the `xsbench` commands.
///
/// Every variant is a fatal configuration or setup error and maps to exit
/// status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration file {path}: {reason}")]
    ConfigFile {
        /// File that failed.
        path: PathBuf,
        /// Read or parse failure.
        reason: String,
    },

    /// Invalid grid configuration.
    #[error(transparent)]
    Grid(#[from] xs_core::GridError),

    /// Saving or loading the binary grid failed.
    #[error(transparent)]
    Persist(#[from] xs_core::PersistError),

    /// Invalid simulation selector or parameter.
    #[error(transparent)]
    Simulation(#[from] xs_kernel::ConfigError),

    /// The simulation could not be started.
    #[error(transparent)]
    Run(#[from] xs_kernel::SimulationError),

    /// Report serialisation failed.
    #[error("Failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
