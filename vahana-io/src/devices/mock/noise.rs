//! Range noise for simulated distance sensors

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Gaussian perturbation of distance readings, seedable for replays.
pub struct RangeNoise {
    rng: SmallRng,
    stddev: f32,
}

impl RangeNoise {
    /// Seed 0 draws from entropy.
    pub fn new(seed: u64, stddev: f32) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng, stddev }
    }

    /// Perturb a hit distance, keeping it within `[0, max_range]`.
    pub fn apply(&mut self, distance: f32, max_range: f32) -> f32 {
        if self.stddev == 0.0 {
            return distance;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        (distance + n * self.stddev).clamp(0.0, max_range)
    }
}
