//! End-to-end tests for the `xsbench` service layer.
//!
//! Drives configuration merging, binary write/read and report rendering
//! through the library API, with files under a temporary directory.

use std::fs;

use service_cli::commands::{report, run};
use service_cli::config::{build_config, BinaryMode, CliArgs, OutputFormat};
use service_cli::{exit_status, CliError, EXIT_SUCCESS, EXIT_VERIFICATION_FAILED};
use tempfile::tempdir;
use xs_kernel::VerificationOutcome;

fn small_args() -> CliArgs {
    CliArgs {
        isotopes: Some(5),
        gridpoints: Some(40),
        materials: Some(4),
        lookups: Some(3_000),
        threads: Some(2),
        ..Default::default()
    }
}

#[test]
fn test_write_then_read_gives_same_verification() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("XS_data.dat");

    let write = build_config(
        None,
        &CliArgs {
            binary_mode: Some(BinaryMode::Write),
            binary_file: Some(file.clone()),
            ..small_args()
        },
    )
    .unwrap();
    let written = run::execute(&write).unwrap();
    assert!(file.exists());

    let read = build_config(
        None,
        &CliArgs {
            binary_mode: Some(BinaryMode::Read),
            binary_file: Some(file.clone()),
            // A different grid seed is irrelevant once the grid is read.
            grid_seed: Some(999),
            ..small_args()
        },
    )
    .unwrap();
    let loaded = run::execute(&read).unwrap();

    assert_eq!(written.results.verification, loaded.results.verification);
    assert_eq!(written.inputs.n_unionized, loaded.inputs.n_unionized);
}

#[test]
fn test_read_rejects_mismatched_problem_size() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("XS_data.dat");

    let write = build_config(
        None,
        &CliArgs {
            binary_mode: Some(BinaryMode::Write),
            binary_file: Some(file.clone()),
            ..small_args()
        },
    )
    .unwrap();
    run::execute(&write).unwrap();

    let read = build_config(
        None,
        &CliArgs {
            binary_mode: Some(BinaryMode::Read),
            binary_file: Some(file),
            gridpoints: Some(41),
            ..small_args()
        },
    )
    .unwrap();
    assert!(matches!(run::execute(&read), Err(CliError::Persist(_))));
}

#[test]
fn test_read_rejects_unordered_energy_grid() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("XS_data.dat");

    let write = build_config(
        None,
        &CliArgs {
            binary_mode: Some(BinaryMode::Write),
            binary_file: Some(file.clone()),
            ..small_args()
        },
    )
    .unwrap();
    run::execute(&write).unwrap();

    // First unionized energy: header, 5 × 40 grid points of 48 bytes, count.
    let offset = 24 + 5 * 40 * 48 + 8;
    let mut bytes = fs::read(&file).unwrap();
    bytes[offset..offset + 8].copy_from_slice(&2.0f64.to_le_bytes());
    fs::write(&file, &bytes).unwrap();

    let read = build_config(
        None,
        &CliArgs {
            binary_mode: Some(BinaryMode::Read),
            binary_file: Some(file),
            ..small_args()
        },
    )
    .unwrap();
    let err = run::execute(&read).unwrap_err();
    assert!(matches!(err, CliError::Persist(_)), "got {:?}", err);
}

#[test]
fn test_config_file_and_cli_precedence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("xsbench.toml");
    fs::write(
        &path,
        "isotopes = 3\ngridpoints = 20\nmaterials = 2\nlookups = 100\nmethod = \"history\"\nformat = \"json\"\n",
    )
    .unwrap();

    let config = build_config(
        Some(&path),
        &CliArgs {
            lookups: Some(250),
            threads: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(config.lookups, 250);
    assert_eq!(config.format, OutputFormat::Json);

    let report = run::execute(&config).unwrap();
    assert_eq!(report.inputs.lookups, 250);
    assert_eq!(report.inputs.method, "history-based");

    let json = report::render(&report, config.format).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["inputs"]["lookups"], 250);
}

#[test]
fn test_expected_value_controls_exit_status() {
    let config = build_config(None, &small_args()).unwrap();
    let first = run::execute(&config).unwrap();
    let value = first.results.verification;
    assert_eq!(first.outcome(), VerificationOutcome::Unchecked);
    assert_eq!(exit_status(&first.outcome()), EXIT_SUCCESS);

    let pass = build_config(
        None,
        &CliArgs {
            expected: Some(value),
            ..small_args()
        },
    )
    .unwrap();
    let passed = run::execute(&pass).unwrap();
    assert_eq!(passed.outcome(), VerificationOutcome::Passed);

    let fail = build_config(
        None,
        &CliArgs {
            expected: Some(value + 1),
            ..small_args()
        },
    )
    .unwrap();
    let failed = run::execute(&fail).unwrap();
    assert_eq!(exit_status(&failed.outcome()), EXIT_VERIFICATION_FAILED);
}
