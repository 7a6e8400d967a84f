//! # service_cli: the `xsbench` Command Line
//!
//! Service layer of the benchmark. Resolves configuration from TOML, the
//! environment and the command line, prepares the grid (generate, read or
//! write the binary file), runs the timed simulation through `xs_kernel`
//! and renders the report.
//!
//! Exit status:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, or no expected value to check against |
//! | 1 | Fatal configuration or setup error |
//! | 2 | Verification mismatch |

pub mod commands;
pub mod config;
pub mod error;

pub use error::{CliError, Result};

use xs_kernel::VerificationOutcome;

/// Exit status of a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status of a fatal configuration or setup error.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit status of a verification mismatch.
pub const EXIT_VERIFICATION_FAILED: u8 = 2;

/// Exit status for a completed run.
pub fn exit_status(outcome: &VerificationOutcome) -> u8 {
    match outcome {
        VerificationOutcome::Failed { .. } => EXIT_VERIFICATION_FAILED,
        VerificationOutcome::Passed | VerificationOutcome::Unchecked => EXIT_SUCCESS,
    }
}
