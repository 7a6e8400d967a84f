//! Report rendering
//!
//! Turns a finished run into the input summary and result sections, as
//! aligned text tables or a single JSON document.

use std::fmt::Write as _;

use serde::Serialize;
use xs_core::{Reaction, SimulationData};
use xs_kernel::{Simulation, SimulationResult, VerificationOutcome};

use crate::config::{BenchConfig, BinaryMode, OutputFormat};
use crate::Result;

const RULE: &str =
    "================================================================================";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Benchmark inputs as they were resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSummary {
    /// Strategy name.
    pub method: String,
    /// Worker count.
    pub threads: usize,
    /// Problem size preset.
    pub size: String,
    /// Nuclides.
    pub n_isotopes: usize,
    /// Grid points per nuclide.
    pub n_gridpoints: usize,
    /// Unionized grid length.
    pub n_unionized: usize,
    /// Materials.
    pub n_materials: usize,
    /// Cross-section channels of each lookup, in storage order.
    pub channels: Vec<&'static str>,
    /// Total lookups.
    pub lookups: usize,
    /// Lookups per history, for the history strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookups_per_history: Option<usize>,
    /// Sampling seed.
    pub seed: u64,
    /// Binary file handling.
    pub binary_mode: BinaryMode,
    /// Estimated grid memory in MB.
    pub memory_mb: f64,
    /// Seconds spent generating or loading the grid.
    pub setup_seconds: f64,
}

/// Timed results and verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    /// Wall time of the simulation phase.
    pub runtime_seconds: f64,
    /// Lookup throughput.
    pub lookups_per_second: f64,
    /// Verification value.
    pub verification: u64,
    /// Raw checksum before reduction.
    pub checksum: u64,
    /// Comparison with the expected value.
    pub outcome: VerificationOutcome,
}

/// Complete report of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Resolved inputs.
    pub inputs: InputSummary,
    /// Results.
    pub results: ResultSummary,
}

impl RunReport {
    /// Assembles the report of a finished run.
    pub fn new(
        config: &BenchConfig,
        data: &SimulationData,
        result: &SimulationResult,
        outcome: VerificationOutcome,
        setup_seconds: f64,
    ) -> Self {
        let history = result.method.family() == "history";
        let inputs = InputSummary {
            method: result.method.name().to_string(),
            threads: result.threads,
            size: config.size.to_string(),
            n_isotopes: data.n_isotopes(),
            n_gridpoints: data.n_gridpoints(),
            n_unionized: data.n_unionized(),
            n_materials: data.n_materials(),
            channels: Reaction::ALL.iter().map(|r| r.name()).collect(),
            lookups: result.lookups,
            lookups_per_history: history.then_some(config.lookups_per_history),
            seed: config.seed,
            binary_mode: config.binary_mode,
            memory_mb: data.memory_footprint() as f64 / BYTES_PER_MB,
            setup_seconds,
        };
        let results = ResultSummary {
            runtime_seconds: result.elapsed.as_secs_f64(),
            lookups_per_second: result.lookups_per_second(),
            verification: result.verification.value(),
            checksum: result.verification.checksum(),
            outcome,
        };
        Self { inputs, results }
    }

    /// Outcome of the verification check.
    pub fn outcome(&self) -> VerificationOutcome {
        self.results.outcome
    }
}

/// Renders `report` in `format`.
pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{:^80}", title);
    let _ = writeln!(out, "{}", RULE);
}

fn row(out: &mut String, key: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{:<32}{}", format!("{}:", key), value);
}

/// Renders the human-readable tables.
pub fn render_table(report: &RunReport) -> String {
    let inputs = &report.inputs;
    let results = &report.results;
    let mut out = String::new();

    banner(&mut out, "INPUT SUMMARY");
    row(&mut out, "Simulation method", &inputs.method);
    row(&mut out, "Worker threads", inputs.threads);
    row(&mut out, "Problem size", &inputs.size);
    row(&mut out, "Nuclides", inputs.n_isotopes);
    row(&mut out, "Grid points per nuclide", group_digits(inputs.n_gridpoints as u64));
    row(&mut out, "Unionized energy points", group_digits(inputs.n_unionized as u64));
    row(&mut out, "Materials", inputs.n_materials);
    row(&mut out, "Cross-section channels", inputs.channels.join(", "));
    row(&mut out, "Total lookups", group_digits(inputs.lookups as u64));
    if let Some(per_history) = inputs.lookups_per_history {
        row(&mut out, "Lookups per history", per_history);
    }
    row(&mut out, "Sampling seed", inputs.seed);
    row(&mut out, "Binary mode", inputs.binary_mode);
    row(&mut out, "Est. memory usage (MB)", format!("{:.1}", inputs.memory_mb));
    row(&mut out, "Grid setup time (s)", format!("{:.3}", inputs.setup_seconds));

    banner(&mut out, "RESULTS");
    row(&mut out, "Runtime (s)", format!("{:.3}", results.runtime_seconds));
    row(
        &mut out,
        "Lookups/s",
        group_digits(results.lookups_per_second.round() as u64),
    );
    row(&mut out, "Verification checksum", results.verification);
    let outcome = match results.outcome {
        VerificationOutcome::Passed => "PASSED".to_string(),
        VerificationOutcome::Failed { expected, .. } => {
            format!("FAILED (expected {})", expected)
        }
        VerificationOutcome::Unchecked => "not checked (no expected value)".to_string(),
    };
    row(&mut out, "Verification", outcome);
    let _ = write!(out, "{}", RULE);

    out
}

/// Formats `n` with thousands separators.
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
