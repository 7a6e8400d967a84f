//! Material compositions and the material selection distribution.

/// Selection weights of the reference twelve-material workload (fuel first).
pub const REFERENCE_MATERIAL_WEIGHTS: [f64; 12] = [
    0.140, 0.052, 0.275, 0.134, 0.154, 0.064, 0.066, 0.055, 0.008, 0.015, 0.025, 0.013,
];

/// Weight given to materials beyond the reference twelve.
const EXTRA_MATERIAL_WEIGHT: f64 = 0.01;

/// One nuclide of a material and its atomic concentration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialComponent {
    /// Index into the nuclide grid collection.
    pub nuclide: u32,
    /// Atomic concentration, strictly positive.
    pub concentration: f64,
}

/// A material: a set of nuclides with concentrations.
///
/// Components are kept sorted by nuclide id, and each id appears once.
/// Nuclide grids are referenced by id, never owned.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    components: Vec<MaterialComponent>,
}

impl Material {
    /// Creates a material, sorting components by nuclide id.
    pub fn new(mut components: Vec<MaterialComponent>) -> Self {
        components.sort_by_key(|c| c.nuclide);
        Self { components }
    }

    /// The material's components, sorted by nuclide id.
    #[inline]
    pub fn components(&self) -> &[MaterialComponent] {
        &self.components
    }

    /// Number of constituent nuclides.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if the material has no nuclides.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// True if `nuclide` is a constituent.
    pub fn contains(&self, nuclide: u32) -> bool {
        self.components
            .binary_search_by_key(&nuclide, |c| c.nuclide)
            .is_ok()
    }
}

/// Cumulative distribution used to pick the material of a sampled lookup.
///
/// Derived from the material count alone, so it needs no persistence: the
/// first twelve materials follow [`REFERENCE_MATERIAL_WEIGHTS`], further
/// ones get a small flat weight, and the result is normalised.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialMix {
    cdf: Vec<f64>,
}

impl MaterialMix {
    /// Builds the distribution for `n_materials` materials.
    pub fn new(n_materials: usize) -> Self {
        let weights: Vec<f64> = (0..n_materials)
            .map(|i| {
                REFERENCE_MATERIAL_WEIGHTS
                    .get(i)
                    .copied()
                    .unwrap_or(EXTRA_MATERIAL_WEIGHT)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let mut running = 0.0;
        let mut cdf: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w / total;
                running
            })
            .collect();
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Self { cdf }
    }

    /// Number of materials covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.cdf.len()
    }

    /// True if the distribution covers no material.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cdf.is_empty()
    }

    /// Selection probability of material `i`.
    pub fn probability(&self, i: usize) -> f64 {
        match i {
            0 => self.cdf[0],
            _ => self.cdf[i] - self.cdf[i - 1],
        }
    }

    /// Maps a uniform `roll` in `[0, 1)` to a material index.
    #[inline]
    pub fn pick(&self, roll: f64) -> usize {
        self.cdf
            .partition_point(|&c| c <= roll)
            .min(self.cdf.len().saturating_sub(1))
    }
}
