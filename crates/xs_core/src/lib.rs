//! # xs_core: Cross-Section Data Model for the Lookup Benchmark
//!
//! ## Layer 1 (Foundation) Role
//!
//! xs_core is the bottom layer of the benchmark, providing:
//! - Grid value types: [`NuclideGridPoint`], [`Reaction`], [`XsVector`] (`grid`)
//! - Material compositions and the material selection mix (`material`)
//! - The read-only aggregate [`SimulationData`] (`data`)
//! - Deterministic grid generation from a [`GridConfig`] (`builder`)
//! - Bit-exact binary persistence (`io`)
//! - The skip-ahead generator [`XsRng`] (`rng`)
//!
//! Nothing here is timed. Grid generation and persistence are benchmark
//! setup; the lookup kernel and the simulation drivers live in `xs_kernel`.
//!
//! ## Usage Example
//!
//! ```rust
//! use xs_core::{builder, GridConfig};
//!
//! let config = GridConfig::builder()
//!     .n_isotopes(4)
//!     .n_gridpoints(16)
//!     .n_materials(2)
//!     .build()
//!     .unwrap();
//!
//! let data = builder::generate(&config).unwrap();
//! assert_eq!(data.n_isotopes(), 4);
//! assert!(data.check_invariants().is_ok());
//!
//! let bytes = xs_core::io::encode(&data);
//! assert_eq!(xs_core::io::decode(&bytes).unwrap(), data);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialisation for [`GridConfig`], grid points and materials

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod builder;
pub mod data;
pub mod error;
pub mod grid;
pub mod io;
pub mod material;
pub mod rng;

pub use builder::{generate, GridConfig, GridConfigBuilder};
pub use data::SimulationData;
pub use error::GridError;
pub use grid::{enclosing_interval, NuclideGridPoint, Reaction, XsVector, N_XS};
pub use io::PersistError;
pub use material::{Material, MaterialComponent, MaterialMix};
pub use rng::XsRng;
