//! Integration tests for grid generation and persistence.
//!
//! These tests exercise the public API only: configuration, generation,
//! invariant checks and a file round trip.

use tempfile::tempdir;
use xs_core::{builder, io, GridConfig, PersistError, SimulationData};

fn generate(n_isotopes: usize, n_gridpoints: usize, n_materials: usize, seed: u64) -> SimulationData {
    let config = GridConfig::builder()
        .n_isotopes(n_isotopes)
        .n_gridpoints(n_gridpoints)
        .n_materials(n_materials)
        .seed(seed)
        .build()
        .unwrap();
    builder::generate(&config).unwrap()
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_generation_is_deterministic_across_pools() {
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| generate(12, 200, 12, 42));
    let multi = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| generate(12, 200, 12, 42));

    assert_eq!(single, multi);
}

#[test]
fn test_different_seeds_give_different_grids() {
    assert_ne!(generate(4, 50, 2, 1), generate(4, 50, 2, 2));
}

#[test]
fn test_generated_grid_satisfies_invariants() {
    let data = generate(20, 300, 12, 9);

    assert!(data.check_invariants().is_ok());
    assert_eq!(data.n_materials(), 12);
    assert!(data.n_unionized() <= 20 * 300);

    // Fuel is the largest material.
    let fuel = data.material(0).len();
    assert!(data.materials().iter().all(|m| m.len() <= fuel));
}

#[test]
fn test_index_table_encloses_unionized_energies() {
    let data = generate(6, 40, 3, 5);
    let last = data.n_gridpoints() - 2;

    for (e, &energy) in data.unionized_energy().iter().enumerate() {
        for (nuc, &idx) in data.index_row(e).iter().enumerate() {
            let grid = data.nuclide_grid(nuc);
            let idx = idx as usize;
            assert!(idx <= last);
            if energy >= grid[0].energy && energy < grid[last + 1].energy {
                assert!(grid[idx].energy <= energy && energy < grid[idx + 1].energy);
            } else if energy < grid[0].energy {
                assert_eq!(idx, 0);
            } else {
                assert_eq!(idx, last);
            }
        }
    }
}

#[test]
fn test_small_scenario_material_holds_every_nuclide() {
    let data = generate(2, 4, 1, 42);

    assert_eq!(data.material(0).len(), 2);
    assert!(data.material(0).contains(0));
    assert!(data.material(0).contains(1));
    assert_eq!(data.material_mix().pick(0.999), 0);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_file_round_trip_preserves_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("grid.xsbd");
    let config = GridConfig::builder()
        .n_isotopes(7)
        .n_gridpoints(33)
        .n_materials(4)
        .build()
        .unwrap();
    let data = builder::generate(&config).unwrap();

    io::save(&path, &data).unwrap();
    let metadata = std::fs::metadata(&path).unwrap();
    assert_eq!(metadata.len() as usize, io::encoded_len(&data));

    let loaded = io::load(&path, &config).unwrap();
    assert_eq!(loaded, data);
    assert_eq!(loaded.material_mix(), data.material_mix());
}

#[test]
fn test_load_rejects_blob_for_other_problem_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("grid.xsbd");
    io::save(&path, &generate(3, 10, 2, 42)).unwrap();

    let bigger = GridConfig::builder()
        .n_isotopes(3)
        .n_gridpoints(11)
        .n_materials(2)
        .build()
        .unwrap();
    assert!(matches!(
        io::load(&path, &bigger),
        Err(PersistError::CountMismatch { .. })
    ));
}

#[test]
fn test_decode_rejects_every_truncation_point() {
    let bytes = io::encode(&generate(2, 4, 1, 3));

    for len in [0, 3, 8, 16, bytes.len() / 2, bytes.len() - 1] {
        assert!(io::decode(&bytes[..len]).is_err(), "accepted {} bytes", len);
    }
}
