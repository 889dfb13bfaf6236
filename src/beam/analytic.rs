// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Analytic station beams: a circular Gaussian and the VLA primary beam.

use num_complex::Complex;

use super::{angular_separation, Beam, BeamDirection, BeamType};
use crate::{constants::RAD_TO_ARCMIN, telescope::Station};

/// A circular Gaussian beam that tracks the phase centre. The width scales
/// inversely with frequency.
pub struct GaussianBeam {
    /// The standard deviation of the Gaussian at the reference frequency,
    /// in direction-cosine units.
    sigma_ref: f64,

    ref_freq_hz: f64,
}

impl GaussianBeam {
    /// The FWHM must be positive; [`super::BeamModel::validate`] checks this.
    pub fn new(fwhm_deg: f64, ref_freq_hz: f64) -> GaussianBeam {
        let fwhm_lm = fwhm_deg.to_radians().sin();
        GaussianBeam {
            sigma_ref: fwhm_lm / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt()),
            ref_freq_hz,
        }
    }

    pub fn sigma(&self, freq_hz: f64) -> f64 {
        self.sigma_ref * self.ref_freq_hz / freq_hz
    }
}

impl Beam for GaussianBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::Gaussian
    }

    fn calc_response(
        &self,
        _station: &Station,
        _element_errors: &[Complex<f64>],
        direction: &BeamDirection,
        pointing: &BeamDirection,
        freq_hz: f64,
    ) -> Complex<f64> {
        let dx = direction.horizon[0] - pointing.horizon[0];
        let dy = direction.horizon[1] - pointing.horizon[1];
        let sigma = self.sigma(freq_hz);
        let r = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
        Complex::new(r, 0.0)
    }
}

// AIPS PBCOR coefficients.
const VLA_FREQS_GHZ: [f64; 8] = [0.0738, 0.3275, 1.465, 4.885, 8.435, 14.965, 22.485, 43.315];
const VLA_P1S: [f64; 8] = [-0.897, -0.935, -1.343, -1.372, -1.306, -1.305, -1.417, -1.321];
const VLA_P2S: [f64; 8] = [2.71, 3.23, 6.579, 6.940, 6.253, 6.155, 7.332, 6.185];
const VLA_P3S: [f64; 8] = [-0.242, -0.378, -1.186, -1.309, -1.100, -1.030, -1.352, -0.983];
const VLA_CUTOFF_FREQS_GHZ: [f64; 4] = [1.485, 4.885, 15.0, 22.5];
const VLA_CUTOFF_RADII_ARCMIN: [f64; 4] = [29.8, 9.13, 2.95, 1.97];

fn nearest_index(values: &[f64], target: f64) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best_i, best_d), (i, v)| {
            let d = (v - target).abs();
            if d < best_d {
                (i, d)
            } else {
                (best_i, best_d)
            }
        })
        .0
}

/// The VLA primary beam, from the polynomial used by AIPS task PBCOR. The
/// coefficients of the tabulated frequency nearest to the observing frequency
/// are used, and the response is zero beyond a cutoff radius.
pub struct VlaBeam;

impl VlaBeam {
    /// The response at `radius_arcmin` from the pointing centre.
    pub fn response_at_radius(radius_arcmin: f64, freq_hz: f64) -> f64 {
        let freq_ghz = freq_hz / 1e9;
        let cutoff = VLA_CUTOFF_RADII_ARCMIN[nearest_index(&VLA_CUTOFF_FREQS_GHZ, freq_ghz)];
        if radius_arcmin >= cutoff {
            return 0.0;
        }

        let i = nearest_index(&VLA_FREQS_GHZ, freq_ghz);
        let rf = radius_arcmin * VLA_FREQS_GHZ[i];
        let x = rf * rf;
        1.0 + x * (VLA_P1S[i] * 1e-3 + x * (VLA_P2S[i] * 1e-7 + x * VLA_P3S[i] * 1e-10))
    }
}

impl Beam for VlaBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::Vla
    }

    fn calc_response(
        &self,
        _station: &Station,
        _element_errors: &[Complex<f64>],
        direction: &BeamDirection,
        pointing: &BeamDirection,
        freq_hz: f64,
    ) -> Complex<f64> {
        let r = angular_separation(&direction.horizon, &pointing.horizon) * RAD_TO_ARCMIN;
        Complex::new(Self::response_at_radius(r, freq_hz), 0.0)
    }
}
