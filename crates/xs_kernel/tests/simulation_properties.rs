//! Integration tests for the simulation drivers.
//!
//! Covers determinism across thread counts, agreement between the event
//! strategies, persistence transparency and the small two-nuclide scenario.

use xs_core::{builder, io, GridConfig, SimulationData};
use xs_kernel::lookup::{macro_xs, BinarySearch};
use xs_kernel::sampling::sample_lookup;
use xs_kernel::verify::lookup_score;
use xs_kernel::{
    run_simulation, ConfigError, SimulationConfig, SimulationMethod, VerificationOutcome,
    VERIFICATION_MODULUS,
};

fn data(n_isotopes: usize, n_gridpoints: usize, n_materials: usize) -> SimulationData {
    let config = GridConfig::builder()
        .n_isotopes(n_isotopes)
        .n_gridpoints(n_gridpoints)
        .n_materials(n_materials)
        .build()
        .unwrap();
    builder::generate(&config).unwrap()
}

fn config(method: SimulationMethod, lookups: usize, threads: usize) -> SimulationConfig {
    SimulationConfig::builder()
        .method(method)
        .lookups(lookups)
        .threads(threads)
        .chunk_size(64)
        .build()
        .unwrap()
}

fn checksum(data: &SimulationData, method: SimulationMethod, lookups: usize, threads: usize) -> u64 {
    run_simulation(data, &config(method, lookups, threads))
        .unwrap()
        .verification
        .checksum()
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_every_method_is_thread_count_independent() {
    let data = data(16, 120, 12);

    for method in SimulationMethod::ALL {
        let one = checksum(&data, method, 20_000, 1);
        let four = checksum(&data, method, 20_000, 4);
        let seven = checksum(&data, method, 20_000, 7);
        assert_eq!(one, four, "{}", method);
        assert_eq!(one, seven, "{}", method);
    }
}

#[test]
fn test_repeated_runs_agree() {
    let data = data(8, 64, 5);
    let first = checksum(&data, SimulationMethod::HistoryBased, 5_000, 3);
    let second = checksum(&data, SimulationMethod::HistoryBased, 5_000, 3);
    assert_eq!(first, second);
}

#[test]
fn test_optimised_matches_baseline() {
    let data = data(24, 150, 12);

    for lookups in [1, 63, 64, 65, 10_000] {
        assert_eq!(
            checksum(&data, SimulationMethod::EventBased, lookups, 4),
            checksum(&data, SimulationMethod::EventBasedOptimised, lookups, 4),
            "lookups = {}",
            lookups
        );
    }
}

#[test]
fn test_event_checksum_matches_sequential_sum() {
    let data = data(5, 30, 4);
    let config = config(SimulationMethod::EventBased, 2_000, 3);

    let expected: u64 = (0..2_000u64)
        .map(|i| {
            let s = sample_lookup(config.seed(), i, data.material_mix());
            lookup_score(&macro_xs(&data, s.energy, s.material, &mut BinarySearch))
        })
        .sum();

    let result = run_simulation(&data, &config).unwrap();
    assert_eq!(result.verification.checksum(), expected);
}

// =============================================================================
// Checksum bounds
// =============================================================================

#[test]
fn test_checksum_bounded_by_lookup_count() {
    let data = data(6, 40, 3);

    for method in SimulationMethod::ALL {
        let sum = checksum(&data, method, 3_000, 2);
        assert!((3_000..=5 * 3_000).contains(&sum), "{}: {}", method, sum);
    }
}

#[test]
fn test_doubling_lookups_changes_value_and_keeps_data() {
    let data = data(10, 80, 12);
    let before = data.clone();

    for method in SimulationMethod::ALL {
        let single = checksum(&data, method, 4_000, 2);
        let double = checksum(&data, method, 8_000, 2);
        assert_ne!(single % VERIFICATION_MODULUS, double % VERIFICATION_MODULUS);
    }
    assert_eq!(data, before);
}

// =============================================================================
// Scenario: two nuclides, four points, one material
// =============================================================================

#[test]
fn test_two_nuclide_scenario() {
    let data = data(2, 4, 1);
    assert_eq!(data.material(0).len(), 2);

    for method in [SimulationMethod::EventBased, SimulationMethod::HistoryBased] {
        let on_four = run_simulation(&data, &config(method, 1_000, 4)).unwrap();
        let on_one = run_simulation(&data, &config(method, 1_000, 1)).unwrap();

        assert!(on_four.verification.value() < VERIFICATION_MODULUS);
        assert_eq!(on_four.verification, on_one.verification);
        assert_eq!(on_four.lookups, 1_000);
        assert_eq!(on_four.threads, 4);
    }
}

// =============================================================================
// Persistence transparency
// =============================================================================

#[test]
fn test_decoded_data_gives_same_checksum() {
    let original = data(9, 70, 6);
    let decoded = io::decode(&io::encode(&original)).unwrap();

    for method in SimulationMethod::ALL {
        assert_eq!(
            checksum(&original, method, 6_000, 3),
            checksum(&decoded, method, 6_000, 3)
        );
    }
}

#[test]
fn test_saved_file_gives_same_checksum() {
    let grid = GridConfig::builder()
        .n_isotopes(7)
        .n_gridpoints(50)
        .n_materials(5)
        .seed(3)
        .build()
        .unwrap();
    let original = builder::generate(&grid).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("XS_data.dat");
    io::save(&path, &original).unwrap();
    let loaded = io::load(&path, &grid).unwrap();

    for method in SimulationMethod::ALL {
        assert_eq!(
            checksum(&original, method, 4_000, 2),
            checksum(&loaded, method, 4_000, 2)
        );
    }
}

// =============================================================================
// Configuration errors and outcomes
// =============================================================================

#[test]
fn test_unknown_selectors_rejected_before_work() {
    assert!(matches!(
        SimulationMethod::from_selector("event", 9),
        Err(ConfigError::UnknownKernel { kernel_id: 9, .. })
    ));
    assert!(matches!(
        SimulationMethod::from_selector("history", 1),
        Err(ConfigError::UnknownKernel { kernel_id: 1, .. })
    ));
    assert!(matches!(
        "random".parse::<SimulationMethod>(),
        Err(ConfigError::UnknownMethod(_))
    ));
}

#[test]
fn test_verification_outcome_against_expected() {
    let data = data(4, 20, 2);
    let result = run_simulation(&data, &config(SimulationMethod::EventBased, 500, 2)).unwrap();
    let value = result.verification.value();

    assert_eq!(result.check(Some(value)), VerificationOutcome::Passed);
    assert_eq!(result.check(None), VerificationOutcome::Unchecked);
    assert_eq!(
        result.check(Some(value + 1)),
        VerificationOutcome::Failed {
            expected: value + 1,
            actual: value
        }
    );
}
