//! The aggregate simulation data model.
//!
//! [`SimulationData`] owns every nuclide grid, the unionized grid with its
//! index table, and the materials. It is assembled once, by the grid builder
//! or the persistence layer, through [`SimulationData::from_parts`], and is
//! read-only from then on: there are no mutating methods, so a single
//! instance can be shared by reference across any number of workers.

use crate::error::GridError;
use crate::grid::{enclosing_interval_by, NuclideGridPoint};
use crate::material::{Material, MaterialMix};

/// Nuclide grids, unionized grid, index table and materials.
///
/// # Layout
///
/// - nuclide grids: flat, nuclide-major, `n_isotopes × n_gridpoints` points
/// - unionized grid: `n_unionized` strictly increasing energies
/// - index table: row-major `[unionized index][nuclide]`, `u32` entries in
///   `[0, n_gridpoints - 2]`
///
/// The index table is the dominant memory cost
/// (`4 × n_unionized × n_isotopes` bytes).
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationData {
    n_isotopes: usize,
    n_gridpoints: usize,
    nuclide_grids: Vec<NuclideGridPoint>,
    unionized_energy: Vec<f64>,
    index_grid: Vec<u32>,
    materials: Vec<Material>,
    mix: MaterialMix,
}

impl SimulationData {
    /// Assembles the data model from its arrays.
    ///
    /// Validates array shapes against the declared counts, that every energy
    /// grid is finite and strictly increasing, that index-table entries lie in
    /// `[0, n_gridpoints - 2]`, and the material definitions against the
    /// nuclide count. All of these are linear. Whether each index entry is the
    /// *enclosing* interval is left to
    /// [`check_invariants`](Self::check_invariants).
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidParameter`] for zero counts
    /// - [`GridError::ShapeMismatch`] if an array length disagrees with the counts
    /// - [`GridError::InvariantViolated`] for unordered or non-finite energies,
    ///   out-of-range index entries or malformed materials
    pub fn from_parts(
        n_isotopes: usize,
        n_gridpoints: usize,
        nuclide_grids: Vec<NuclideGridPoint>,
        unionized_energy: Vec<f64>,
        index_grid: Vec<u32>,
        materials: Vec<Material>,
    ) -> Result<Self, GridError> {
        if n_isotopes == 0 {
            return Err(GridError::invalid("n_isotopes", "must be at least 1"));
        }
        if n_gridpoints < 2 {
            return Err(GridError::invalid("n_gridpoints", "must be at least 2"));
        }
        if materials.is_empty() {
            return Err(GridError::invalid("n_materials", "must be at least 1"));
        }

        let expected_points = n_isotopes * n_gridpoints;
        if nuclide_grids.len() != expected_points {
            return Err(GridError::ShapeMismatch {
                what: "nuclide grids",
                expected: expected_points,
                found: nuclide_grids.len(),
            });
        }
        if unionized_energy.len() < 2 || unionized_energy.len() > expected_points {
            return Err(GridError::InvariantViolated(format!(
                "unionized grid length {} outside [2, {}]",
                unionized_energy.len(),
                expected_points
            )));
        }
        let expected_index = unionized_energy.len() * n_isotopes;
        if index_grid.len() != expected_index {
            return Err(GridError::ShapeMismatch {
                what: "index table",
                expected: expected_index,
                found: index_grid.len(),
            });
        }

        for (nuc, grid) in nuclide_grids.chunks_exact(n_gridpoints).enumerate() {
            if let Some(k) = first_unordered(grid.iter().map(|p| p.energy)) {
                return Err(GridError::InvariantViolated(format!(
                    "nuclide {} grid not finite and strictly increasing at point {}",
                    nuc, k
                )));
            }
        }
        if let Some(k) = first_unordered(unionized_energy.iter().copied()) {
            return Err(GridError::InvariantViolated(format!(
                "unionized grid not finite and strictly increasing at entry {}",
                k
            )));
        }
        let max_index = n_gridpoints - 2;
        if let Some(k) = index_grid.iter().position(|&idx| idx as usize > max_index) {
            return Err(GridError::InvariantViolated(format!(
                "index table entry {} is {}, grid has {} points",
                k, index_grid[k], n_gridpoints
            )));
        }

        for (m, material) in materials.iter().enumerate() {
            if material.is_empty() {
                return Err(GridError::InvariantViolated(format!(
                    "material {} has no nuclides",
                    m
                )));
            }
            let components = material.components();
            for (k, component) in components.iter().enumerate() {
                if component.nuclide as usize >= n_isotopes {
                    return Err(GridError::InvariantViolated(format!(
                        "material {} references nuclide {} of {}",
                        m, component.nuclide, n_isotopes
                    )));
                }
                if !(component.concentration > 0.0 && component.concentration.is_finite()) {
                    return Err(GridError::InvariantViolated(format!(
                        "material {} has non-positive concentration {} for nuclide {}",
                        m, component.concentration, component.nuclide
                    )));
                }
                if k > 0 && components[k - 1].nuclide == component.nuclide {
                    return Err(GridError::InvariantViolated(format!(
                        "material {} lists nuclide {} twice",
                        m, component.nuclide
                    )));
                }
            }
        }

        let mix = MaterialMix::new(materials.len());
        Ok(Self {
            n_isotopes,
            n_gridpoints,
            nuclide_grids,
            unionized_energy,
            index_grid,
            materials,
            mix,
        })
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

    /// Length of the unionized grid.
    #[inline]
    pub fn n_unionized(&self) -> usize {
        self.unionized_energy.len()
    }

    /// Number of materials.
    #[inline]
    pub fn n_materials(&self) -> usize {
        self.materials.len()
    }

    /// The grid of nuclide `nuclide`.
    ///
    /// # Panics
    ///
    /// Panics if `nuclide >= n_isotopes`.
    #[inline]
    pub fn nuclide_grid(&self, nuclide: usize) -> &[NuclideGridPoint] {
        let start = nuclide * self.n_gridpoints;
        &self.nuclide_grids[start..start + self.n_gridpoints]
    }

    /// All nuclide grids, flat and nuclide-major.
    #[inline]
    pub fn nuclide_grids(&self) -> &[NuclideGridPoint] {
        &self.nuclide_grids
    }

    /// The unionized energy grid.
    #[inline]
    pub fn unionized_energy(&self) -> &[f64] {
        &self.unionized_energy
    }

    /// Index-table row of unionized entry `e`: one grid index per nuclide.
    #[inline]
    pub fn index_row(&self, e: usize) -> &[u32] {
        let start = e * self.n_isotopes;
        &self.index_grid[start..start + self.n_isotopes]
    }

    /// The whole index table, row-major.
    #[inline]
    pub fn index_grid(&self) -> &[u32] {
        &self.index_grid
    }

    /// All materials.
    #[inline]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Material `m`.
    #[inline]
    pub fn material(&self, m: usize) -> &Material {
        &self.materials[m]
    }

    /// Material selection distribution for samplers.
    #[inline]
    pub fn material_mix(&self) -> &MaterialMix {
        &self.mix
    }

    /// Lowest and highest unionized energies.
    #[inline]
    pub fn energy_range(&self) -> (f64, f64) {
        let first = self.unionized_energy[0];
        let last = self.unionized_energy[self.unionized_energy.len() - 1];
        (first, last)
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_footprint(&self) -> usize {
        let grids = self.nuclide_grids.len() * std::mem::size_of::<NuclideGridPoint>();
        let unionized = self.unionized_energy.len() * std::mem::size_of::<f64>();
        let index = self.index_grid.len() * std::mem::size_of::<u32>();
        let materials: usize = self
            .materials
            .iter()
            .map(|m| m.len() * std::mem::size_of::<crate::material::MaterialComponent>())
            .sum();
        grids + unionized + index + materials
    }

    /// Checks every ordering invariant of the model.
    ///
    /// - each nuclide grid is strictly increasing in energy
    /// - the unionized grid is strictly increasing
    /// - each index-table entry is the enclosing interval of its unionized
    ///   energy in its nuclide grid (clamped at the extremes)
    ///
    /// Cost is `O(n_unionized × n_isotopes × log n_gridpoints)`.
    pub fn check_invariants(&self) -> Result<(), GridError> {
        for nuc in 0..self.n_isotopes {
            let grid = self.nuclide_grid(nuc);
            if let Some(k) = grid.windows(2).position(|w| w[0].energy >= w[1].energy) {
                return Err(GridError::InvariantViolated(format!(
                    "nuclide {} grid not strictly increasing at point {}",
                    nuc,
                    k + 1
                )));
            }
        }

        if let Some(k) = self
            .unionized_energy
            .windows(2)
            .position(|w| w[0] >= w[1])
        {
            return Err(GridError::InvariantViolated(format!(
                "unionized grid not strictly increasing at entry {}",
                k + 1
            )));
        }

        for (e, &energy) in self.unionized_energy.iter().enumerate() {
            let row = self.index_row(e);
            for (nuc, &idx) in row.iter().enumerate() {
                let expected = enclosing_interval_by(self.nuclide_grid(nuc), energy, |p| p.energy);
                if idx as usize != expected {
                    return Err(GridError::InvariantViolated(format!(
                        "index table entry ({}, {}) is {}, expected {}",
                        e, nuc, idx, expected
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Position of the first energy that is non-finite or not above its
/// predecessor.
fn first_unordered(energies: impl Iterator<Item = f64>) -> Option<usize> {
    let mut prev = f64::NEG_INFINITY;
    for (k, energy) in energies.enumerate() {
        if !energy.is_finite() || (k > 0 && energy <= prev) {
            return Some(k);
        }
        prev = energy;
    }
    None
}
