//! Cross-section lookup kernel.
//!
//! Two entry points:
//!
//! - [`micro_xs`]: one nuclide at one energy, interpolated linearly between
//!   the two bracketing grid points
//! - [`macro_xs`]: one material at one energy, the concentration-weighted sum
//!   of its nuclides' microscopic cross sections
//!
//! The unionized-grid interval is found by a [`UnionLocator`]. The baseline
//! kernel uses [`BinarySearch`]; the optimised kernel uses [`HintedSearch`],
//! which restarts from its previous hit. Both compute
//! [`enclosing_interval`], so every kernel sees the same interval for the
//! same energy.
//!
//! # Domain Policy
//!
//! Energies outside the unionized grid are clamped to its boundary before
//! the search. Inside a single nuclide, energies outside that nuclide's own
//! grid take the boundary point's values. Both rules apply to every locator
//! and every simulation strategy.
//!
//! # Examples
//!
//! ```rust
//! use xs_core::{builder, GridConfig};
//! use xs_kernel::lookup::{macro_xs, BinarySearch, HintedSearch};
//!
//! let config = GridConfig::builder()
//!     .n_isotopes(6)
//!     .n_gridpoints(32)
//!     .n_materials(3)
//!     .build()
//!     .unwrap();
//! let data = builder::generate(&config).unwrap();
//!
//! let baseline = macro_xs(&data, 0.37, 1, &mut BinarySearch);
//! let hinted = macro_xs(&data, 0.37, 1, &mut HintedSearch::new());
//! assert_eq!(baseline, hinted);
//! ```

use xs_core::grid::{enclosing_interval, NuclideGridPoint, XsVector, N_XS};
use xs_core::SimulationData;

/// Strategy for locating the unionized-grid interval of an energy.
///
/// Implementations must return [`enclosing_interval`]`(grid, energy)`;
/// they may only differ in how many comparisons they spend.
pub trait UnionLocator {
    /// Index `i` with `grid[i] <= energy < grid[i + 1]`, clamped to
    /// `[0, grid.len() - 2]`.
    fn locate(&mut self, grid: &[f64], energy: f64) -> usize;
}

/// Full binary search over the unionized grid on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinarySearch;

impl UnionLocator for BinarySearch {
    #[inline]
    fn locate(&mut self, grid: &[f64], energy: f64) -> usize {
        grid_search(grid, energy)
    }
}

/// Bounded local search from the previous hit.
///
/// Gallops forward from the last interval found (steps 1, 2, 4, ...) until
/// it overshoots, then binary-searches the final window. Falls back to a
/// full binary search when the energy moves backwards. Cheap for a stream of
/// ascending energies, such as lookups sorted by energy.
#[derive(Clone, Copy, Debug, Default)]
pub struct HintedSearch {
    hint: usize,
}

impl HintedSearch {
    /// Creates a search starting at the bottom of the grid.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval returned by the last call.
    #[inline]
    pub fn hint(&self) -> usize {
        self.hint
    }
}

impl UnionLocator for HintedSearch {
    fn locate(&mut self, grid: &[f64], energy: f64) -> usize {
        let last = grid.len() - 2;
        let mut lo = self.hint.min(last);

        if energy < grid[lo] {
            self.hint = grid_search(grid, energy);
            return self.hint;
        }

        // grid[lo] <= energy from here on; gallop until grid[hi] > energy.
        let mut step = 1;
        let mut hi = lo + step;
        while hi <= last && grid[hi] <= energy {
            lo = hi;
            step *= 2;
            hi = lo + step;
        }
        let hi = hi.min(last + 1);

        // The answer lies in [lo, hi - 1] and grid[lo] <= energy.
        self.hint = lo + grid[lo..hi].partition_point(|&g| g <= energy) - 1;
        self.hint
    }
}

/// Baseline unionized-grid search: plain binary search.
#[inline]
pub fn grid_search(grid: &[f64], energy: f64) -> usize {
    enclosing_interval(grid, energy)
}

/// Linear interpolation of every channel between two grid points.
///
/// Returns `low.xs` / `high.xs` unchanged when `energy` is at or beyond the
/// corresponding point, so a lookup exactly on a grid point is exact.
#[inline]
pub fn interpolate(low: &NuclideGridPoint, high: &NuclideGridPoint, energy: f64) -> XsVector {
    if energy <= low.energy {
        return low.xs;
    }
    if energy >= high.energy {
        return high.xs;
    }

    let t = (energy - low.energy) / (high.energy - low.energy);
    let mut xs = [0.0; N_XS];
    for (k, value) in xs.iter_mut().enumerate() {
        *value = low.xs[k] + t * (high.xs[k] - low.xs[k]);
    }
    xs
}

/// Microscopic cross sections of one nuclide at `energy`.
///
/// `union_idx` is the unionized interval of `energy` when the caller already
/// knows it; with `None` the unionized grid is binary-searched. The
/// precomputed index table then gives the nuclide's bracketing grid points
/// directly.
///
/// # Panics
///
/// Panics if `nuclide` or `union_idx` is out of range.
#[inline]
pub fn micro_xs(
    data: &SimulationData,
    energy: f64,
    nuclide: usize,
    union_idx: Option<usize>,
) -> XsVector {
    let union_idx = union_idx.unwrap_or_else(|| grid_search(data.unionized_energy(), energy));
    let idx = data.index_row(union_idx)[nuclide] as usize;
    micro_xs_at(data.nuclide_grid(nuclide), idx, energy)
}

#[inline(always)]
fn micro_xs_at(grid: &[NuclideGridPoint], idx: usize, energy: f64) -> XsVector {
    interpolate(&grid[idx], &grid[idx + 1], energy)
}

/// Clamps `energy` into the unionized grid's range.
#[inline]
pub fn clamp_energy(data: &SimulationData, energy: f64) -> f64 {
    let (lo, hi) = data.energy_range();
    energy.clamp(lo, hi)
}

/// Macroscopic cross sections of material `material` at `energy`.
///
/// The energy is clamped into the unionized range, located once with
/// `locator`, and every constituent nuclide is interpolated through the
/// index-table row of that interval.
///
/// # Panics
///
/// Panics if `material` is out of range.
#[inline]
pub fn macro_xs<L: UnionLocator>(
    data: &SimulationData,
    energy: f64,
    material: usize,
    locator: &mut L,
) -> XsVector {
    let energy = clamp_energy(data, energy);
    let union_idx = locator.locate(data.unionized_energy(), energy);
    let row = data.index_row(union_idx);

    let mut macro_xs = [0.0; N_XS];
    for component in data.material(material).components() {
        let nuclide = component.nuclide as usize;
        let micro = micro_xs_at(data.nuclide_grid(nuclide), row[nuclide] as usize, energy);
        for (total, value) in macro_xs.iter_mut().zip(micro.iter()) {
            *total += component.concentration * value;
        }
    }
    macro_xs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use xs_core::{builder, GridConfig};

    fn data(n_isotopes: usize, n_gridpoints: usize, n_materials: usize) -> SimulationData {
        let config = GridConfig::builder()
            .n_isotopes(n_isotopes)
            .n_gridpoints(n_gridpoints)
            .n_materials(n_materials)
            .seed(17)
            .build()
            .unwrap();
        builder::generate(&config).unwrap()
    }

    #[test]
    fn test_interpolate_midpoint() {
        let low = NuclideGridPoint::new(1.0, [0.0, 1.0, 2.0, 3.0, 4.0]);
        let high = NuclideGridPoint::new(2.0, [2.0, 3.0, 4.0, 5.0, 6.0]);
        let xs = interpolate(&low, &high, 1.5);

        for (k, value) in xs.iter().enumerate() {
            assert_relative_eq!(*value, k as f64 + 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interpolate_holds_boundary_values() {
        let low = NuclideGridPoint::new(1.0, [1.0; N_XS]);
        let high = NuclideGridPoint::new(2.0, [3.0; N_XS]);

        assert_eq!(interpolate(&low, &high, 0.5), low.xs);
        assert_eq!(interpolate(&low, &high, 2.5), high.xs);
    }

    #[test]
    fn test_micro_xs_exact_at_grid_points() {
        let data = data(3, 40, 2);

        for nuc in 0..data.n_isotopes() {
            for point in data.nuclide_grid(nuc) {
                let xs = micro_xs(&data, point.energy, nuc, None);
                assert_eq!(xs, point.xs, "nuclide {} at {}", nuc, point.energy);
            }
        }
    }

    #[test]
    fn test_micro_xs_with_known_union_index() {
        let data = data(4, 25, 2);
        let energy = 0.4321;
        let union_idx = grid_search(data.unionized_energy(), energy);

        for nuc in 0..data.n_isotopes() {
            assert_eq!(
                micro_xs(&data, energy, nuc, Some(union_idx)),
                micro_xs(&data, energy, nuc, None)
            );
        }
    }

    #[test]
    fn test_micro_xs_matches_direct_nuclide_search() {
        let data = data(5, 30, 2);

        for k in 0..200 {
            let energy = k as f64 / 200.0;
            let energy = clamp_energy(&data, energy);
            for nuc in 0..data.n_isotopes() {
                let grid = data.nuclide_grid(nuc);
                let idx = xs_core::grid::enclosing_interval_by(grid, energy, |p| p.energy);
                let expected = interpolate(&grid[idx], &grid[idx + 1], energy);
                assert_eq!(micro_xs(&data, energy, nuc, None), expected);
            }
        }
    }

    #[test]
    fn test_macro_xs_is_weighted_sum() {
        let data = data(4, 20, 3);
        let energy = 0.55;

        for m in 0..data.n_materials() {
            let mut expected = [0.0; N_XS];
            for c in data.material(m).components() {
                let micro = micro_xs(&data, energy, c.nuclide as usize, None);
                for k in 0..N_XS {
                    expected[k] += c.concentration * micro[k];
                }
            }
            let actual = macro_xs(&data, energy, m, &mut BinarySearch);
            for k in 0..N_XS {
                assert_relative_eq!(actual[k], expected[k], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_macro_xs_clamps_outside_range() {
        let data = data(3, 10, 1);
        let (lo, hi) = data.energy_range();

        assert_eq!(
            macro_xs(&data, -5.0, 0, &mut BinarySearch),
            macro_xs(&data, lo, 0, &mut BinarySearch)
        );
        assert_eq!(
            macro_xs(&data, 7.0, 0, &mut BinarySearch),
            macro_xs(&data, hi, 0, &mut BinarySearch)
        );
    }

    #[test]
    fn test_hinted_search_handles_backward_moves() {
        let grid: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mut search = HintedSearch::new();

        assert_eq!(search.locate(&grid, 80.5), 80);
        assert_eq!(search.hint(), 80);
        assert_eq!(search.locate(&grid, 3.2), 3);
        assert_eq!(search.locate(&grid, 99.0), 98);
        assert_eq!(search.locate(&grid, 150.0), 98);
        assert_eq!(search.locate(&grid, -1.0), 0);
    }

    proptest! {
        #[test]
        fn prop_hinted_search_agrees_with_binary_search(
            energies in proptest::collection::vec(-0.1f64..1.1, 1..200),
            sort in any::<bool>(),
        ) {
            let grid: Vec<f64> = (0..257).map(|i| (i as f64 / 256.0).powi(2)).collect();
            let mut energies = energies;
            if sort {
                energies.sort_by(f64::total_cmp);
            }

            let mut hinted = HintedSearch::new();
            for &e in &energies {
                prop_assert_eq!(hinted.locate(&grid, e), grid_search(&grid, e));
            }
        }
    }
}
