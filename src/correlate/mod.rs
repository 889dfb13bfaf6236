// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cross-correlating station Jones terms into visibilities.
//!
//! For every baseline (p, q), the visibility is the sum over sources s of
//! `J_p,s · B_s · J_q,s^H`, where B_s is the brightness matrix of the source.
//! Sums are done in double precision and added into the snapshot buffer once
//! per baseline.
//!
//! Averaging over a channel's bandwidth and over a time interval can be
//! modelled analytically; each multiplies a source's contribution by a sinc
//! of how much its fringe phase changes over the channel or the interval.

#[cfg(test)]
mod tests;

use marlu::{RADec, XyzGeodetic, UVW};
use rayon::prelude::*;

use crate::{
    constants::{EARTH_ROTATION_RATE, PI, VEL_C},
    jones::{JonesElement, JonesError, JonesField, VisFloat},
    sky::LocalSky,
    telescope::Telescope,
};

/// Settings for [`Correlator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelatorSettings {
    /// The width of each channel \[Hz\]. If this is 0, bandwidth smearing is
    /// not simulated.
    pub channel_bandwidth_hz: f64,

    /// Baselines shorter than this get no signal \[wavelengths\].
    pub uv_min_lambda: f64,

    /// Baselines longer than this get no signal \[wavelengths\].
    pub uv_max_lambda: f64,

    /// The time interval that visibilities are averaged over \[seconds\].
    /// If this is 0, time-average smearing is not simulated. Sub-sample
    /// averaging already smears visibilities numerically, so this is normally
    /// used with a single sub-sample per dump.
    pub time_average_sec: f64,
}

impl Default for CorrelatorSettings {
    fn default() -> Self {
        CorrelatorSettings {
            channel_bandwidth_hz: 0.0,
            uv_min_lambda: 0.0,
            uv_max_lambda: f64::INFINITY,
            time_average_sec: 0.0,
        }
    }
}

pub struct Correlator {
    baselines: Vec<(usize, usize)>,
    num_stations: usize,
    station_xyzs: Vec<XyzGeodetic>,
    phase_centre: RADec,
    longitude_rad: f64,
    settings: CorrelatorSettings,
}

impl Correlator {
    pub fn new(telescope: &Telescope, settings: CorrelatorSettings) -> Correlator {
        Correlator {
            baselines: telescope.baseline_pairs().collect(),
            num_stations: telescope.num_stations(),
            station_xyzs: telescope.station_xyzs().collect(),
            phase_centre: telescope.phase_centre,
            longitude_rad: telescope.array_position.longitude_rad,
            settings,
        }
    }

    pub fn num_baselines(&self) -> usize {
        self.baselines.len()
    }

    /// The station pairs of every baseline, in visibility order.
    pub fn baselines(&self) -> &[(usize, usize)] {
        &self.baselines
    }

    /// Add the visibilities of the sources in `sky` into `vis`, which has one
    /// element per baseline. `j` holds the full Jones chain of each station
    /// towards each source, and `station_uvws` are in metres. `gast` is the
    /// Greenwich apparent sidereal time of the sample \[radians\].
    ///
    /// Nothing is done if there are no sources.
    pub fn correlate<E: JonesElement>(
        &self,
        vis: &mut [E],
        sky: &LocalSky,
        j: &JonesField<E>,
        station_uvws: &[UVW],
        freq_hz: f64,
        gast: f64,
    ) -> Result<(), JonesError> {
        if vis.len() != self.baselines.len() {
            return Err(JonesError::BufferLength {
                expected: self.baselines.len(),
                got: vis.len(),
            });
        }
        if station_uvws.len() != self.num_stations {
            return Err(JonesError::BufferLength {
                expected: self.num_stations,
                got: station_uvws.len(),
            });
        }
        if j.num_stations() != self.num_stations || j.num_sources() != sky.len() {
            return Err(JonesError::DimensionMismatch {
                lhs_stations: j.num_stations(),
                lhs_sources: j.num_sources(),
                rhs_stations: self.num_stations,
                rhs_sources: sky.len(),
            });
        }
        if sky.is_empty() {
            return Ok(());
        }

        let inv_lambda = freq_hz / VEL_C;
        let frac_bandwidth = self.settings.channel_bandwidth_hz / freq_hz;
        let CorrelatorSettings {
            uv_min_lambda,
            uv_max_lambda,
            time_average_sec,
            ..
        } = self.settings;
        let sources = sky.sources();

        // The phase centre's local hour angle, and how fast baseline (u, v, w)
        // coordinates change with it.
        let ha0 = gast + self.longitude_rad - self.phase_centre.ra;
        let (s_ha0, c_ha0) = ha0.sin_cos();
        let (s_dec0, c_dec0) = self.phase_centre.dec.sin_cos();
        let time_smearing_scale = PI * inv_lambda * time_average_sec * EARTH_ROTATION_RATE;

        vis.par_iter_mut()
            .zip(self.baselines.par_iter())
            .for_each(|(vis, &(p, q))| {
                let uvw_p = station_uvws[p];
                let uvw_q = station_uvws[q];
                let u = (uvw_p.u - uvw_q.u) * inv_lambda;
                let v = (uvw_p.v - uvw_q.v) * inv_lambda;
                let w = (uvw_p.w - uvw_q.w) * inv_lambda;
                let uv_length = (u * u + v * v).sqrt();
                if uv_length < uv_min_lambda || uv_length > uv_max_lambda {
                    return;
                }

                // Derivatives of (u, v, w) over the averaging interval,
                // scaled for the sinc argument.
                let uvw_rate = if time_average_sec > 0.0 {
                    let xyz_p = self.station_xyzs[p];
                    let xyz_q = self.station_xyzs[q];
                    let xd = xyz_p.x - xyz_q.x;
                    let yd = xyz_p.y - xyz_q.y;
                    let t = xd * s_ha0 + yd * c_ha0;
                    Some([
                        (xd * c_ha0 - yd * s_ha0) * time_smearing_scale,
                        t * s_dec0 * time_smearing_scale,
                        -t * c_dec0 * time_smearing_scale,
                    ])
                } else {
                    None
                };

                let mut sum = E::Wide::default();
                for ((src, &jp), &jq) in sources.iter().zip(j.station(p)).zip(j.station(q)) {
                    let lmn = src.source.lmn;
                    let mut factor = 1.0;
                    if frac_bandwidth > 0.0 {
                        let phase = u * lmn.l + v * lmn.m + w * (lmn.n - 1.0);
                        factor *= sinc(PI * frac_bandwidth * phase);
                    }
                    if let Some([du, dv, dw]) = uvw_rate {
                        factor *= sinc(du * lmn.l + dv * lmn.m + dw * (lmn.n - 1.0));
                    }
                    if let Some([a, b, c]) = src.source.gaussian {
                        factor *= (-(a * u * u + b * u * v + c * v * v)).exp();
                    }

                    let brightness = src.source.flux_density.to_coherency();
                    sum += E::correlate(jp, &brightness, jq) * factor;
                }
                *vis += E::narrow(sum);
            });

        Ok(())
    }
}

/// `sin(x) / x`, which is 1 at 0.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-10 {
        1.0
    } else {
        x.sin() / x
    }
}

/// Divide a snapshot's running sum by the number of sub-samples that went
/// into it. This must be done exactly once per snapshot.
pub fn normalise_snapshot<E: JonesElement>(
    vis: &mut [E],
    num_vis_ave: usize,
    num_fringe_ave: usize,
) {
    let factor = E::Float::from_double(1.0 / (num_vis_ave * num_fringe_ave) as f64);
    for v in vis {
        *v = v.scale_real(factor);
    }
}
