//! Event-based baseline kernel.

use rayon::prelude::*;
use xs_core::SimulationData;

use super::Simulation;
use crate::config::SimulationConfig;
use crate::lookup::{macro_xs, BinarySearch};
use crate::sampling::sample_lookup;
use crate::verify::lookup_score;

/// Independent lookups, each with a full binary search of the unionized
/// grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventBased;

impl Simulation for EventBased {
    fn name(&self) -> &'static str {
        "event-based"
    }

    fn run(&self, data: &SimulationData, config: &SimulationConfig) -> u64 {
        let seed = config.seed();
        let mix = data.material_mix();

        (0..config.lookups() as u64)
            .into_par_iter()
            .fold(
                || 0u64,
                |acc, i| {
                    let sample = sample_lookup(seed, i, mix);
                    let xs = macro_xs(data, sample.energy, sample.material, &mut BinarySearch);
                    acc + lookup_score(&xs)
                },
            )
            .reduce(|| 0, |a, b| a + b)
    }
}
