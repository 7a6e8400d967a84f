//! Grid generation.
//!
//! Builds a complete [`SimulationData`] from a handful of generation
//! parameters and a seeded [`XsRng`]. Generation is deterministic for a given
//! [`GridConfig`]: the same seed always yields bit-identical grids,
//! materials and index table, which is what makes verification values
//! reproducible.
//!
//! This is benchmark setup, not the modelled workload, and must never be
//! included in timed regions.

use rand::seq::index;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::data::SimulationData;
use crate::error::GridError;
use crate::grid::{enclosing_interval_by, next_energy_above, NuclideGridPoint, N_XS};
use crate::material::{Material, MaterialComponent};
use crate::rng::XsRng;

/// Default number of nuclides (large problem).
pub const DEFAULT_ISOTOPES: usize = 355;

/// Default grid points per nuclide.
pub const DEFAULT_GRIDPOINTS: usize = 11_303;

/// Default number of materials.
pub const DEFAULT_MATERIALS: usize = 12;

/// Default generator seed for grid construction.
pub const DEFAULT_GRID_SEED: u64 = 42;

/// Nuclide counts of the non-fuel reference materials, cycled for
/// materials 1, 2, ...
pub const REFERENCE_MATERIAL_SIZES: [usize; 11] = [5, 4, 4, 27, 21, 21, 21, 21, 21, 9, 9];

/// Fraction of all nuclides placed in the fuel material (material 0).
const FUEL_FRACTION: f64 = 0.9;

/// Grid generation parameters.
///
/// Use [`GridConfigBuilder`] to construct validated instances.
///
/// # Examples
///
/// ```rust
/// use xs_core::GridConfig;
///
/// let config = GridConfig::builder()
///     .n_isotopes(68)
///     .n_gridpoints(1000)
///     .seed(7)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_isotopes(), 68);
/// assert_eq!(config.n_materials(), 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    n_isotopes: usize,
    n_gridpoints: usize,
    n_materials: usize,
    seed: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            n_isotopes: DEFAULT_ISOTOPES,
            n_gridpoints: DEFAULT_GRIDPOINTS,
            n_materials: DEFAULT_MATERIALS,
            seed: DEFAULT_GRID_SEED,
        }
    }
}

impl GridConfig {
    /// Creates a new configuration builder seeded with the defaults.
    #[inline]
    pub fn builder() -> GridConfigBuilder {
        GridConfigBuilder::default()
    }

    /// Number of nuclides.
    #[inline]
    pub fn n_isotopes(&self) -> usize {
        self.n_isotopes
    }

    /// Grid points per nuclide.
    #[inline]
    pub fn n_gridpoints(&self) -> usize {
        self.n_gridpoints
    }

    /// Number of materials.
    #[inline]
    pub fn n_materials(&self) -> usize {
        self.n_materials
    }

    /// Generator seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Nuclide count of material `m`.
    ///
    /// Material 0 (fuel) holds `ceil(0.9 × n_isotopes)` nuclides; the others
    /// follow [`REFERENCE_MATERIAL_SIZES`], clamped to the fuel size so the
    /// fuel stays the largest material.
    pub fn material_size(&self, m: usize) -> usize {
        let fuel = (FUEL_FRACTION * self.n_isotopes as f64).ceil() as usize;
        let fuel = fuel.clamp(1, self.n_isotopes);
        if m == 0 {
            return fuel;
        }
        REFERENCE_MATERIAL_SIZES[(m - 1) % REFERENCE_MATERIAL_SIZES.len()].clamp(1, fuel)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidParameter`] if:
    /// - `n_isotopes` is 0
    /// - `n_gridpoints` is below 2
    /// - `n_materials` is 0
    /// - the grid has more points than a `u32` index can address
    pub fn validate(&self) -> Result<(), GridError> {
        if self.n_isotopes == 0 {
            return Err(GridError::invalid("n_isotopes", "must be at least 1"));
        }
        if self.n_gridpoints < 2 {
            return Err(GridError::invalid("n_gridpoints", "must be at least 2"));
        }
        if self.n_materials == 0 {
            return Err(GridError::invalid("n_materials", "must be at least 1"));
        }
        let total = self.n_isotopes.checked_mul(self.n_gridpoints);
        if total.map_or(true, |t| t > u32::MAX as usize) {
            return Err(GridError::invalid(
                "n_gridpoints",
                format!(
                    "{} nuclides × {} points exceeds the addressable grid size",
                    self.n_isotopes, self.n_gridpoints
                ),
            ));
        }
        Ok(())
    }
}

/// Builder for [`GridConfig`].
#[derive(Clone, Debug, Default)]
pub struct GridConfigBuilder {
    config: GridConfig,
}

impl GridConfigBuilder {
    /// Sets the number of nuclides.
    #[inline]
    pub fn n_isotopes(mut self, n_isotopes: usize) -> Self {
        self.config.n_isotopes = n_isotopes;
        self
    }

    /// Sets the number of grid points per nuclide.
    #[inline]
    pub fn n_gridpoints(mut self, n_gridpoints: usize) -> Self {
        self.config.n_gridpoints = n_gridpoints;
        self
    }

    /// Sets the number of materials.
    #[inline]
    pub fn n_materials(mut self, n_materials: usize) -> Self {
        self.config.n_materials = n_materials;
        self
    }

    /// Sets the generator seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// See [`GridConfig::validate`].
    pub fn build(self) -> Result<GridConfig, GridError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Generates the complete data model for `config`.
///
/// # Errors
///
/// Returns [`GridError`] if the configuration is invalid.
pub fn generate(config: &GridConfig) -> Result<SimulationData, GridError> {
    config.validate()?;
    let mut rng = XsRng::from_seed(config.seed());

    info!(
        n_isotopes = config.n_isotopes(),
        n_gridpoints = config.n_gridpoints(),
        n_materials = config.n_materials(),
        seed = config.seed(),
        "Generating nuclide grids"
    );

    let nuclide_grids = generate_nuclide_grids(config, &mut rng);
    let unionized_energy = unionize(&nuclide_grids);
    debug!(
        n_unionized = unionized_energy.len(),
        "Unionized energy grid built"
    );

    let index_grid = build_index_table(
        &nuclide_grids,
        &unionized_energy,
        config.n_isotopes(),
        config.n_gridpoints(),
    );
    debug!(entries = index_grid.len(), "Index table built");

    let materials = generate_materials(config, &mut rng);

    SimulationData::from_parts(
        config.n_isotopes(),
        config.n_gridpoints(),
        nuclide_grids,
        unionized_energy,
        index_grid,
        materials,
    )
}

/// Draws every nuclide grid, then sorts each by energy.
///
/// Draw order is fixed (nuclide by nuclide, point by point, energy before
/// cross sections) so that the sequence consumed from `rng` never depends on
/// thread count.
fn generate_nuclide_grids(config: &GridConfig, rng: &mut XsRng) -> Vec<NuclideGridPoint> {
    let n_points = config.n_isotopes() * config.n_gridpoints();
    let mut grids = Vec::with_capacity(n_points);

    for _ in 0..n_points {
        let energy = rng.gen_uniform();
        let mut xs = [0.0; N_XS];
        for value in xs.iter_mut() {
            *value = rng.gen_uniform();
        }
        grids.push(NuclideGridPoint::new(energy, xs));
    }

    grids
        .par_chunks_mut(config.n_gridpoints())
        .for_each(|grid| {
            grid.sort_unstable_by(|a, b| a.energy.total_cmp(&b.energy));
            for k in 1..grid.len() {
                if grid[k].energy <= grid[k - 1].energy {
                    grid[k].energy = next_energy_above(grid[k - 1].energy);
                }
            }
        });

    grids
}

/// Merges all nuclide energies into one strictly increasing grid.
fn unionize(nuclide_grids: &[NuclideGridPoint]) -> Vec<f64> {
    let mut energies: Vec<f64> = nuclide_grids.par_iter().map(|p| p.energy).collect();
    energies.par_sort_unstable_by(f64::total_cmp);
    energies.dedup();
    energies
}

/// Computes, for each unionized energy and nuclide, the enclosing interval in
/// that nuclide's grid.
fn build_index_table(
    nuclide_grids: &[NuclideGridPoint],
    unionized_energy: &[f64],
    n_isotopes: usize,
    n_gridpoints: usize,
) -> Vec<u32> {
    let mut index_grid = vec![0u32; unionized_energy.len() * n_isotopes];

    index_grid
        .par_chunks_mut(n_isotopes)
        .zip(unionized_energy.par_iter())
        .for_each(|(row, &energy)| {
            for (nuc, slot) in row.iter_mut().enumerate() {
                let grid = &nuclide_grids[nuc * n_gridpoints..(nuc + 1) * n_gridpoints];
                *slot = enclosing_interval_by(grid, energy, |p| p.energy) as u32;
            }
        });

    index_grid
}

/// Samples each material's nuclide subset and concentrations.
fn generate_materials(config: &GridConfig, rng: &mut XsRng) -> Vec<Material> {
    (0..config.n_materials())
        .map(|m| {
            let size = config.material_size(m);
            let mut ids = index::sample(&mut *rng, config.n_isotopes(), size).into_vec();
            ids.sort_unstable();

            let components = ids
                .into_iter()
                .map(|nuclide| MaterialComponent {
                    nuclide: nuclide as u32,
                    concentration: 1.0 - rng.gen_uniform(),
                })
                .collect();
            Material::new(components)
        })
        .collect()
}
