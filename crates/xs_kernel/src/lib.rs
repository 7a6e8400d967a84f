//! # xs_kernel: Lookup Kernel and Simulation Drivers
//!
//! ## Layer 2 Role
//!
//! xs_kernel runs the timed part of the benchmark on top of `xs_core`:
//! - Macroscopic and microscopic lookups with pluggable unionized-grid
//!   search (`lookup`)
//! - Position-addressed lookup sampling (`sampling`)
//! - Event-based, event-based-optimised and history-based drivers with
//!   per-worker accumulation (`simulation`)
//! - The verification checksum (`verify`)
//! - Validated run configuration (`config`)
//! - Instrumentation region markers (`region`)
//!
//! ## Usage Example
//!
//! ```rust
//! use xs_core::{builder, GridConfig};
//! use xs_kernel::{run_simulation, SimulationConfig, SimulationMethod};
//!
//! let grid = GridConfig::builder()
//!     .n_isotopes(8)
//!     .n_gridpoints(64)
//!     .n_materials(4)
//!     .build()
//!     .unwrap();
//! let data = builder::generate(&grid).unwrap();
//!
//! let config = SimulationConfig::builder()
//!     .method(SimulationMethod::HistoryBased)
//!     .lookups(5_000)
//!     .threads(2)
//!     .build()
//!     .unwrap();
//!
//! let result = run_simulation(&data, &config).unwrap();
//! println!("verification: {}", result.verification.value());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialisation for [`SimulationConfig`], [`SimulationMethod`]
//!   and [`SimulationResult`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod lookup;
pub mod region;
pub mod sampling;
pub mod simulation;
pub mod verify;

pub use config::{SimulationConfig, SimulationConfigBuilder};
pub use error::{ConfigError, SimulationError};
pub use simulation::{run_simulation, Simulation, SimulationMethod, SimulationResult};
pub use verify::{Verification, VerificationOutcome, VERIFICATION_MODULUS};
