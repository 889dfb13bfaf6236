// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The interferometer: its position on the Earth, its stations, and the
//! global parameters used when simulating it.

mod error;
mod layout;

pub use error::TelescopeError;
pub use layout::read_layout_file;

use marlu::{LatLngHeight, RADec, XyzGeodetic};

use crate::beam::BeamModel;

/// One station (a.k.a. antenna, tile) of the interferometer.
#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,

    /// The position of the station relative to the array reference position.
    pub xyz: XyzGeodetic,

    /// East and north offsets of each of this station's elements from the
    /// station centre \[metres\]. Only aperture-array beams use these; an
    /// empty list means a single element.
    pub elements: Vec<[f64; 2]>,

    /// The RMS of the noise on this station's visibilities \[Jy\].
    pub noise_rms_jy: f64,
}

impl Station {
    pub fn num_elements(&self) -> usize {
        self.elements.len().max(1)
    }
}

#[derive(Debug, Clone)]
pub struct Telescope {
    pub array_position: LatLngHeight,

    pub stations: Vec<Station>,

    pub phase_centre: RADec,

    pub beam: BeamModel,

    /// Seed for stochastic beam errors.
    pub seed: u64,

    /// Should station beams be divided by their response in the direction of
    /// the phase centre?
    pub normalise_beams_at_phase_centre: bool,
}

impl Telescope {
    /// Check that this telescope makes sense.
    pub fn validate(&self) -> Result<(), TelescopeError> {
        if self.stations.len() < 2 {
            return Err(TelescopeError::NotEnoughStations(self.stations.len()));
        }
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2)
            .contains(&self.array_position.latitude_rad)
        {
            return Err(TelescopeError::BadLatitude(
                self.array_position.latitude_rad.to_degrees(),
            ));
        }
        self.beam.validate()?;
        Ok(())
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn num_baselines(&self) -> usize {
        let n = self.stations.len();
        n * n.saturating_sub(1) / 2
    }

    /// The number of elements in the largest station.
    pub fn max_station_size(&self) -> usize {
        self.stations
            .iter()
            .map(|s| s.num_elements())
            .max()
            .unwrap_or(1)
    }

    /// The station pairs of each cross-correlation baseline, in the order that
    /// visibilities are stored (first station major, `p < q`).
    pub fn baseline_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.stations.len();
        (0..n).flat_map(move |p| (p + 1..n).map(move |q| (p, q)))
    }

    pub fn station_xyzs(&self) -> impl Iterator<Item = XyzGeodetic> + '_ {
        self.stations.iter().map(|s| s.xyz)
    }
}
