//! Energy-grid value types and interval search.
//!
//! This module provides:
//! - [`Reaction`]: the fixed set of reaction channels carried per grid point
//! - [`XsVector`]: one cross-section value per channel
//! - [`NuclideGridPoint`]: one energy sample of one nuclide
//! - [`enclosing_interval`]: the interval search every grid lookup is defined by

/// Number of reaction channels stored per grid point.
pub const N_XS: usize = 5;

/// One cross-section value per [`Reaction`], in channel order.
pub type XsVector = [f64; N_XS];

/// Reaction channels, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reaction {
    /// Total cross section.
    Total,
    /// Elastic scattering.
    Elastic,
    /// Absorption.
    Absorption,
    /// Fission.
    Fission,
    /// Fission neutron production (nu-fission).
    NuFission,
}

impl Reaction {
    /// All channels in storage order.
    pub const ALL: [Reaction; N_XS] = [
        Reaction::Total,
        Reaction::Elastic,
        Reaction::Absorption,
        Reaction::Fission,
        Reaction::NuFission,
    ];

    /// Position of this channel inside an [`XsVector`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short lowercase name, listed in the run report.
    pub fn name(self) -> &'static str {
        match self {
            Reaction::Total => "total",
            Reaction::Elastic => "elastic",
            Reaction::Absorption => "absorption",
            Reaction::Fission => "fission",
            Reaction::NuFission => "nu-fission",
        }
    }
}

/// One energy sample of one nuclide.
///
/// Grid points are plain values; a nuclide grid is a slice of them sorted by
/// strictly increasing energy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NuclideGridPoint {
    /// Incident neutron energy.
    pub energy: f64,
    /// Cross sections at `energy`, indexed by [`Reaction::index`].
    pub xs: XsVector,
}

impl NuclideGridPoint {
    /// Creates a grid point.
    #[inline]
    pub fn new(energy: f64, xs: XsVector) -> Self {
        Self { energy, xs }
    }
}

/// Returns the index `i` of the interval `[sorted[i], sorted[i + 1])`
/// enclosing `energy`.
///
/// The result is clamped to `[0, len - 2]`: energies below the first point
/// map to `0`, energies at or above the last point map to `len - 2`. The
/// baseline binary search, the hinted search of the optimised kernel and the
/// build-time index table are all defined by this function, so they agree
/// on every input.
///
/// `sorted` must be strictly increasing and hold at least two points.
///
/// # Examples
///
/// ```rust
/// use xs_core::grid::enclosing_interval;
///
/// let grid = [0.1, 0.2, 0.4, 0.8];
/// assert_eq!(enclosing_interval(&grid, 0.05), 0);
/// assert_eq!(enclosing_interval(&grid, 0.2), 1);
/// assert_eq!(enclosing_interval(&grid, 0.5), 2);
/// assert_eq!(enclosing_interval(&grid, 0.8), 2);
/// assert_eq!(enclosing_interval(&grid, 9.0), 2);
/// ```
#[inline]
pub fn enclosing_interval(sorted: &[f64], energy: f64) -> usize {
    enclosing_interval_by(sorted, energy, |&e| e)
}

/// [`enclosing_interval`] over any slice, reading the energy with `key`.
#[inline]
pub fn enclosing_interval_by<T, F>(sorted: &[T], energy: f64, key: F) -> usize
where
    F: Fn(&T) -> f64,
{
    debug_assert!(sorted.len() >= 2, "a grid needs at least two points");
    let pos = sorted.partition_point(|item| key(item) <= energy);
    pos.saturating_sub(1).min(sorted.len() - 2)
}

/// Returns the smallest `f64` strictly greater than a non-negative finite
/// `value`.
#[inline]
pub(crate) fn next_energy_above(value: f64) -> f64 {
    debug_assert!(value >= 0.0 && value.is_finite());
    // Adding 0.0 folds -0.0 into +0.0 before the bit increment.
    f64::from_bits((value + 0.0).to_bits() + 1)
}
