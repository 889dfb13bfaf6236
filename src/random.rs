// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reproducible random numbers for stochastic station-beam errors.
//!
//! A [`RandomState`] is fully determined by its keys. Creating one with the
//! same keys always yields the same stream, so beam errors don't depend on
//! how the sky was split into chunks or on which device simulated a chunk.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

#[derive(Debug, Clone)]
pub struct RandomState {
    rng: StdRng,
    max_station_size: usize,
}

impl RandomState {
    pub fn new(max_station_size: usize, seed: u64, key1: u64, key2: u64) -> RandomState {
        let mut bytes = [0; 32];
        for (dst, word) in bytes
            .chunks_exact_mut(8)
            .zip([seed, key1, key2, max_station_size as u64])
        {
            dst.copy_from_slice(&word.to_le_bytes());
        }
        RandomState {
            rng: StdRng::from_seed(bytes),
            max_station_size,
        }
    }

    /// The largest number of elements in any station; every station draws
    /// this many values so the number of draws doesn't depend on the station.
    pub fn max_station_size(&self) -> usize {
        self.max_station_size
    }

    /// Two independent samples from the standard normal distribution.
    pub fn gaussian_pair(&mut self) -> (f64, f64) {
        (
            self.rng.sample(StandardNormal),
            self.rng.sample(StandardNormal),
        )
    }
}
