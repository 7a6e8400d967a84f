//! CLI command implementations
//!
//! - `run`: grid setup, the timed simulation and verification
//! - `report`: input summary and result rendering

pub mod report;
pub mod run;
