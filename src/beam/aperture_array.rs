// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The array factor of an aperture-array station.

use num_complex::Complex;

use super::{Beam, BeamDirection, BeamType};
use crate::{constants::VEL_C, random::RandomState, telescope::Station};

/// A station beam formed by summing its elements with phase delays that
/// steer the beam towards the pointing direction. Each element has a random
/// complex gain error.
pub struct ApertureArrayBeam {
    gain_std: f64,
    phase_std_rad: f64,
}

impl ApertureArrayBeam {
    pub fn new(gain_std: f64, phase_std_rad: f64) -> ApertureArrayBeam {
        ApertureArrayBeam {
            gain_std,
            phase_std_rad,
        }
    }
}

impl Beam for ApertureArrayBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::ApertureArray
    }

    fn draw_element_errors(&self, random: &mut RandomState, errors: &mut [Complex<f64>]) {
        // One pair is drawn for every slot, even when the errors are disabled,
        // so the stream only depends on the telescope.
        for e in errors.iter_mut().take(random.max_station_size()) {
            let (g1, g2) = random.gaussian_pair();
            let gain = 1.0 + self.gain_std * g1;
            *e = Complex::from_polar(gain, self.phase_std_rad * g2);
        }
    }

    fn calc_response(
        &self,
        station: &Station,
        element_errors: &[Complex<f64>],
        direction: &BeamDirection,
        pointing: &BeamDirection,
        freq_hz: f64,
    ) -> Complex<f64> {
        let wavenumber = std::f64::consts::TAU * freq_hz / VEL_C;
        let dx = direction.horizon[0] - pointing.horizon[0];
        let dy = direction.horizon[1] - pointing.horizon[1];

        let origin = [[0.0, 0.0]];
        let elements: &[[f64; 2]] = if station.elements.is_empty() {
            &origin
        } else {
            &station.elements
        };

        let sum: Complex<f64> = elements
            .iter()
            .zip(element_errors)
            .map(|(&[x, y], &w)| w * Complex::cis(wavenumber * (x * dx + y * dy)))
            .sum();
        sum / elements.len() as f64
    }
}
