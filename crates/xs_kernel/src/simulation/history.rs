//! History-based kernel.
//!
//! Lookups are grouped into particle histories. History `h` owns the stream
//! segment starting at draw `STREAM_STRIDE * lookups_per_history * h`; one
//! lookup never consumes more than [`MAX_DRAWS_PER_LOOKUP`] draws, so
//! segments never overlap.
//!
//! The first lookup of a history samples energy and material like an event.
//! Every later lookup:
//!
//! 1. skips `n` draws, `n` being the number of channels of the previous
//!    result above 1.0
//! 2. moves the previous energy by `walk_width * (2u - 1)`, reflected into
//!    `[0, 1)`
//! 3. draws a fresh material
//!
//! Step 1 makes each lookup depend on the one before, so a history runs in
//! order on one worker while histories run in parallel.

use rayon::prelude::*;
use xs_core::{SimulationData, XsRng, N_XS};

use super::Simulation;
use crate::config::SimulationConfig;
use crate::lookup::{macro_xs, BinarySearch};
use crate::sampling::{draw_sample, reflect_unit};
use crate::verify::lookup_score;

/// Most draws a single history lookup consumes (skip plus walk plus
/// material).
pub const MAX_DRAWS_PER_LOOKUP: u64 = N_XS as u64 + 2;

/// Stream segment reserved per lookup of a history.
const STREAM_STRIDE: u64 = 8;

/// Channel value above which a result advances the history stream.
const SKIP_THRESHOLD: f64 = 1.0;

/// Histories of dependent lookups following an energy random walk.
#[derive(Clone, Copy, Debug, Default)]
pub struct HistoryBased;

impl Simulation for HistoryBased {
    fn name(&self) -> &'static str {
        "history-based"
    }

    fn run(&self, data: &SimulationData, config: &SimulationConfig) -> u64 {
        let lookups = config.lookups();
        let per_history = config.lookups_per_history();

        (0..config.histories())
            .into_par_iter()
            .fold(
                || 0u64,
                |acc, h| {
                    let start = h * per_history;
                    let len = per_history.min(lookups - start);
                    acc + run_history(data, config, h as u64, len)
                },
            )
            .reduce(|| 0, |a, b| a + b)
    }
}

/// Checksum contribution of history `h` with `len` lookups.
fn run_history(data: &SimulationData, config: &SimulationConfig, h: u64, len: usize) -> u64 {
    let mix = data.material_mix();
    let offset = STREAM_STRIDE * config.lookups_per_history() as u64 * h;
    let mut rng = XsRng::at(config.seed(), offset);

    let first = draw_sample(&mut rng, mix);
    let mut energy = first.energy;
    let mut material = first.material;
    let mut checksum = 0;

    for step in 0..len {
        if step > 0 {
            energy = reflect_unit(energy + config.walk_width() * (2.0 * rng.gen_uniform() - 1.0));
            material = mix.pick(rng.gen_uniform());
        }

        let xs = macro_xs(data, energy, material, &mut BinarySearch);
        checksum += lookup_score(&xs);

        let skip = xs.iter().filter(|&&v| v > SKIP_THRESHOLD).count();
        rng.advance(skip as u64);
    }
    checksum
}
