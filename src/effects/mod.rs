// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to evaluate the Jones terms of the measurement equation for the
//! visible sources of a chunk.
//!
//! * R: the rotation from the parallactic angle (matrix mode only);
//! * E: the station beam;
//! * K: the interferometric phase.

pub mod compose;
mod error;

pub use compose::{compose, join_in_place};
pub use error::EffectError;

use marlu::{LatLngHeight, RADec, UVW};
use num_complex::Complex;

use crate::{
    beam::{Beam, BeamDirection},
    constants::{TAU, VEL_C},
    jones::{Jones, JonesElement, JonesField, VisFloat},
    random::RandomState,
    sky::{hadec_to_horizon, LocalSky},
    telescope::Telescope,
};

/// The parallactic angle of a source with hour angle `ha` and declination
/// `dec`, seen from `latitude` (all radians).
pub fn parallactic_angle(ha: f64, dec: f64, latitude: f64) -> f64 {
    let (s_lat, c_lat) = latitude.sin_cos();
    let (s_dec, c_dec) = dec.sin_cos();
    let (s_ha, c_ha) = ha.sin_cos();
    (c_lat * s_ha).atan2(s_lat * c_dec - c_lat * s_dec * c_ha)
}

/// Fill `r` with the parallactic-angle rotation of each visible source. The
/// rotation is the same for every station.
pub fn evaluate_jones_r<E: JonesElement>(
    r: &mut JonesField<E>,
    sky: &LocalSky,
    latitude_rad: f64,
) -> Result<(), EffectError> {
    r.set_num_sources(sky.len())?;
    for row in r.stations_mut() {
        for (r, src) in row.iter_mut().zip(sky.sources()) {
            let q = parallactic_angle(src.hour_angle, src.source.radec.dec, latitude_rad);
            let (s, c) = q.sin_cos();
            *r = E::from_matrix(Jones::from([
                Complex::new(c, 0.0),
                Complex::new(-s, 0.0),
                Complex::new(s, 0.0),
                Complex::new(c, 0.0),
            ]));
        }
    }
    Ok(())
}

/// The direction that every station beam is steered towards: the phase
/// centre, at local sidereal time `lst`.
pub fn beam_pointing(phase_centre: RADec, array_position: LatLngHeight, lst: f64) -> BeamDirection {
    BeamDirection {
        lmn: [0.0, 0.0, 1.0],
        horizon: hadec_to_horizon(phase_centre.to_hadec(lst), array_position.latitude_rad),
    }
}

/// Scratch space for per-station beam evaluation.
#[derive(Debug, Clone)]
pub struct StationWork {
    element_errors: Vec<Complex<f64>>,
    responses: Vec<Complex<f64>>,
}

impl StationWork {
    pub fn new(max_station_size: usize, capacity: usize) -> StationWork {
        StationWork {
            element_errors: vec![Complex::new(1.0, 0.0); max_station_size.max(1)],
            responses: vec![Complex::default(); capacity],
        }
    }

    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.responses.len() {
            self.responses.resize(capacity, Complex::default());
        }
    }
}

/// Fill `e` with the beam response of each station towards each visible
/// source. Sources that are below the horizon at the current positions of
/// `sky` get a zero response.
///
/// Element errors are drawn from `random` once per station, so the draws made
/// by a call only depend on the telescope.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_jones_e<E: JonesElement>(
    e: &mut JonesField<E>,
    beam: &dyn Beam,
    telescope: &Telescope,
    sky: &LocalSky,
    pointing: &BeamDirection,
    freq_hz: f64,
    random: &mut RandomState,
    work: &mut StationWork,
) -> Result<(), EffectError> {
    e.set_num_sources(sky.len())?;
    work.ensure_capacity(sky.len());
    let responses = &mut work.responses[..sky.len()];

    for (i_station, station) in telescope.stations.iter().enumerate() {
        beam.draw_element_errors(random, &mut work.element_errors);
        beam.calc_responses(
            station,
            &work.element_errors,
            sky.sources(),
            pointing,
            freq_hz,
            responses,
        )?;

        let norm = if telescope.normalise_beams_at_phase_centre {
            let norm =
                beam.calc_response(station, &work.element_errors, pointing, pointing, freq_hz);
            if norm.norm_sqr() > 0.0 {
                norm.inv()
            } else {
                Complex::new(1.0, 0.0)
            }
        } else {
            Complex::new(1.0, 0.0)
        };

        for ((e, &response), src) in e
            .station_mut(i_station)
            .iter_mut()
            .zip(responses.iter())
            .zip(sky.sources())
        {
            // Sources that have set since the snapshot was clipped get no
            // response.
            *e = if src.horizon[2] > 0.0 {
                E::from_scalar(response * norm)
            } else {
                E::default()
            };
        }
    }
    Ok(())
}

/// Make the random draws that [`evaluate_jones_e`] would make, without
/// evaluating anything. Used for snapshots with no visible sources, so that
/// later snapshots get the same element errors however the sky is chunked.
pub fn skip_jones_e(
    beam: &dyn Beam,
    telescope: &Telescope,
    random: &mut RandomState,
    work: &mut StationWork,
) {
    for _ in &telescope.stations {
        beam.draw_element_errors(random, &mut work.element_errors);
    }
}

/// Fill `k` with the interferometric phase of each station towards each
/// visible source. `station_uvws` are in metres.
pub fn evaluate_jones_k<F: VisFloat>(
    k: &mut JonesField<Complex<F>>,
    sky: &LocalSky,
    station_uvws: &[UVW],
    freq_hz: f64,
) -> Result<(), EffectError> {
    if station_uvws.len() != k.num_stations() {
        return Err(EffectError::NumStations {
            expected: k.num_stations(),
            got: station_uvws.len(),
        });
    }
    k.set_num_sources(sky.len())?;
    let wavenumber = TAU * freq_hz / VEL_C;
    for (row, uvw) in k.stations_mut().zip(station_uvws) {
        for (k, src) in row.iter_mut().zip(sky.sources()) {
            let lmn = src.source.lmn;
            let phase = wavenumber * (uvw.u * lmn.l + uvw.v * lmn.m + uvw.w * (lmn.n - 1.0));
            *k = Complex::<F>::from_scalar(Complex::cis(phase));
        }
    }
    Ok(())
}

/// Get the (u, v, w) coordinates of every station \[metres\] at the Greenwich
/// apparent sidereal time `gast` \[radians\].
pub fn station_uvw(telescope: &Telescope, gast: f64, out: &mut [UVW]) -> Result<(), EffectError> {
    if out.len() != telescope.num_stations() {
        return Err(EffectError::NumStations {
            expected: telescope.num_stations(),
            got: out.len(),
        });
    }
    let lst = gast + telescope.array_position.longitude_rad;
    let hadec = telescope.phase_centre.to_hadec(lst);
    for (uvw, xyz) in out.iter_mut().zip(telescope.station_xyzs()) {
        *uvw = UVW::from_xyz(xyz, hadec);
    }
    Ok(())
}
