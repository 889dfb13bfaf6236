// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Adding system noise to simulated visibilities.

use log::debug;
use ndarray::Axis;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Normal, NormalError};

use super::Visibilities;
use crate::jones::{JonesElement, VisFloat};

/// Add Gaussian noise to the real and imaginary parts of every visibility.
/// The standard deviation on baseline (p, q) is `sqrt(σ_p σ_q)`, where σ is
/// the RMS of each station \[Jy\]. The same seed always gives the same noise.
pub fn add_noise<E: JonesElement>(
    vis: &mut Visibilities<E>,
    station_rms_jy: &[f64],
    seed: u64,
) -> Result<(), NormalError> {
    let dists = vis
        .metadata
        .baselines
        .iter()
        .map(|&(p, q)| Normal::new(0.0, (station_rms_jy[p] * station_rms_jy[q]).sqrt()))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Adding noise with seed {seed}");

    let mut rng = StdRng::seed_from_u64(seed);
    for mut vis_tb in vis.data.outer_iter_mut() {
        for mut vis_b in vis_tb.axis_iter_mut(Axis(0)) {
            for (v, dist) in vis_b.iter_mut().zip(&dists) {
                for c in v.components_mut() {
                    c.re += E::Float::from_double(rng.sample(dist));
                    c.im += E::Float::from_double(rng.sample(dist));
                }
            }
        }
    }
    Ok(())
}
