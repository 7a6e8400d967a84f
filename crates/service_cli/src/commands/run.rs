//! Benchmark run command
//!
//! Resolves the configuration, builds or loads the grid, runs the timed
//! simulation and checks the verification value. Every configuration error
//! is raised before the simulation starts.

use std::time::Instant;

use tracing::info;
use xs_core::{builder, io, SimulationData};
use xs_kernel::run_simulation;

use super::report::RunReport;
use crate::config::{BenchConfig, BinaryMode};
use crate::Result;

/// Runs the benchmark described by `config`.
pub fn execute(config: &BenchConfig) -> Result<RunReport> {
    let grid_config = config.grid_config()?;
    let sim_config = config.simulation_config()?;

    let setup = Instant::now();
    let data = prepare_data(config, &grid_config)?;
    let setup_seconds = setup.elapsed().as_secs_f64();
    info!(
        n_unionized = data.n_unionized(),
        memory_bytes = data.memory_footprint(),
        setup_seconds,
        "Grid ready"
    );

    let result = run_simulation(&data, &sim_config)?;
    let outcome = result.check(config.expected);
    Ok(RunReport::new(config, &data, &result, outcome, setup_seconds))
}

/// Generates or loads the grid according to the binary mode.
fn prepare_data(config: &BenchConfig, grid_config: &xs_core::GridConfig) -> Result<SimulationData> {
    let data = match config.binary_mode {
        BinaryMode::Read => {
            info!(path = %config.binary_file.display(), "Reading grid from binary file");
            io::load(&config.binary_file, grid_config)?
        }
        BinaryMode::None | BinaryMode::Write => builder::generate(grid_config)?,
    };

    if config.binary_mode == BinaryMode::Write {
        info!(path = %config.binary_file.display(), "Writing grid to binary file");
        io::save(&config.binary_file, &data)?;
    }

    if config.validate {
        info!("Checking grid invariants");
        data.check_invariants()?;
    }

    Ok(data)
}
