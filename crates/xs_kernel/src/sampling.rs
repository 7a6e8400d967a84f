//! Lookup sampling.
//!
//! A lookup consumes [`DRAWS_PER_LOOKUP`] draws: the first is the energy,
//! the second picks the material through the [`MaterialMix`]. Event-based
//! lookup `i` starts at draw `DRAWS_PER_LOOKUP * i` of the seeded stream, so
//! its sample does not depend on which worker evaluates it or when.

use xs_core::{MaterialMix, XsRng};

/// Generator draws consumed by one freshly sampled lookup.
pub const DRAWS_PER_LOOKUP: u64 = 2;

/// A sampled (energy, material) pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Energy in `[0, 1)`.
    pub energy: f64,
    /// Material index.
    pub material: usize,
}

/// Draws energy then material from `rng`.
#[inline]
pub fn draw_sample(rng: &mut XsRng, mix: &MaterialMix) -> Sample {
    let energy = rng.gen_uniform();
    let material = mix.pick(rng.gen_uniform());
    Sample { energy, material }
}

/// Sample of event-based lookup `i` under `seed`.
#[inline]
pub fn sample_lookup(seed: u64, i: u64, mix: &MaterialMix) -> Sample {
    let mut rng = XsRng::at(seed, DRAWS_PER_LOOKUP * i);
    draw_sample(&mut rng, mix)
}

/// Folds `x` back into `[0, 1)` by reflection at both ends.
#[inline]
pub fn reflect_unit(x: f64) -> f64 {
    let mut x = x.rem_euclid(2.0);
    if x >= 1.0 {
        x = 2.0 - x;
    }
    // 2.0 - x can land exactly on 1.0
    if x >= 1.0 {
        x = 1.0 - f64::EPSILON / 2.0;
    }
    x
}
