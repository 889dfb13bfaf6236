// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract station-beam calculations.
//!
//! [`Beam`] is a trait detailing how to calculate the response of a station
//! towards a direction on the sky. By making this trait, we can neatly abstract
//! over multiple beam models, including a simple [`NoBeam`] type (which just
//! returns unit gains).
//!
//! All beams are scalar; in matrix mode the response is put on both diagonals
//! of each Jones matrix. Every beam tracks the phase centre.

mod analytic;
mod aperture_array;
mod error;

pub use analytic::{GaussianBeam, VlaBeam};
pub use aperture_array::ApertureArrayBeam;
pub use error::BeamError;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::{random::RandomState, sky::VisibleSource, telescope::Station};

/// Supported beam types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamType {
    /// a.k.a. [`NoBeam`]. Only returns unit gains.
    None,

    Gaussian,

    /// The VLA primary beam, as used by AIPS task PBCOR.
    Vla,

    ApertureArray,
}

/// The beam model of a telescope, as it's specified by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeamModel {
    #[default]
    None,

    /// A circular Gaussian.
    Gaussian {
        /// The full width at half maximum at the reference frequency
        /// \[degrees\].
        fwhm_deg: f64,

        /// \[Hz\]
        ref_freq_hz: f64,
    },

    Vla,

    /// The array factor of the elements of each station, with random gain
    /// and phase errors on every element.
    ApertureArray {
        /// The standard deviation of element gains (relative to 1).
        #[serde(default)]
        element_gain_std: f64,

        /// The standard deviation of element phases \[degrees\].
        #[serde(default)]
        element_phase_std_deg: f64,
    },
}

impl BeamModel {
    pub fn validate(&self) -> Result<(), BeamError> {
        match *self {
            BeamModel::None | BeamModel::Vla => (),
            BeamModel::Gaussian {
                fwhm_deg,
                ref_freq_hz,
            } => {
                if fwhm_deg <= 0.0 || !fwhm_deg.is_finite() {
                    return Err(BeamError::BadFwhm(fwhm_deg));
                }
                if ref_freq_hz <= 0.0 || !ref_freq_hz.is_finite() {
                    return Err(BeamError::BadRefFreq(ref_freq_hz));
                }
            }
            BeamModel::ApertureArray {
                element_gain_std,
                element_phase_std_deg,
            } => {
                if element_gain_std < 0.0 {
                    return Err(BeamError::BadErrorStd(element_gain_std));
                }
                if element_phase_std_deg < 0.0 {
                    return Err(BeamError::BadErrorStd(element_phase_std_deg));
                }
            }
        }
        Ok(())
    }

    /// Create a [`Beam`] trait object for this model.
    pub fn create_beam(&self) -> Result<Box<dyn Beam>, BeamError> {
        self.validate()?;
        let beam: Box<dyn Beam> = match *self {
            BeamModel::None => Box::new(NoBeam),
            BeamModel::Gaussian {
                fwhm_deg,
                ref_freq_hz,
            } => Box::new(GaussianBeam::new(fwhm_deg, ref_freq_hz)),
            BeamModel::Vla => Box::new(VlaBeam),
            BeamModel::ApertureArray {
                element_gain_std,
                element_phase_std_deg,
            } => Box::new(ApertureArrayBeam::new(
                element_gain_std,
                element_phase_std_deg.to_radians(),
            )),
        };
        Ok(beam)
    }
}

/// A direction that a beam is evaluated towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamDirection {
    /// Direction cosines relative to the phase centre.
    pub lmn: [f64; 3],

    /// Direction cosines in the local horizon frame (east, north, up).
    pub horizon: [f64; 3],
}

impl From<&VisibleSource> for BeamDirection {
    fn from(s: &VisibleSource) -> Self {
        BeamDirection {
            lmn: [s.source.lmn.l, s.source.lmn.m, s.source.lmn.n],
            horizon: s.horizon,
        }
    }
}

/// A trait abstracting beam code functions.
pub trait Beam: Sync + Send {
    /// Get the type of beam.
    fn get_beam_type(&self) -> BeamType;

    /// Draw the complex gain errors of a station's elements. Every call must
    /// make the same number of draws from `random` (this may only depend on
    /// [`RandomState::max_station_size`]), so the random stream of every
    /// station is reproducible. `errors` has `max_station_size` elements.
    fn draw_element_errors(&self, _random: &mut RandomState, errors: &mut [Complex<f64>]) {
        errors.fill(Complex::new(1.0, 0.0));
    }

    /// Calculate the response of a station towards `direction`, when its
    /// beam is steered towards `pointing`.
    fn calc_response(
        &self,
        station: &Station,
        element_errors: &[Complex<f64>],
        direction: &BeamDirection,
        pointing: &BeamDirection,
        freq_hz: f64,
    ) -> Complex<f64>;

    /// Calculate the responses of a station towards many sources, saving the
    /// results into the supplied slice. The slice must have the same length as
    /// `sources`.
    fn calc_responses(
        &self,
        station: &Station,
        element_errors: &[Complex<f64>],
        sources: &[VisibleSource],
        pointing: &BeamDirection,
        freq_hz: f64,
        results: &mut [Complex<f64>],
    ) -> Result<(), BeamError> {
        if sources.len() != results.len() {
            return Err(BeamError::DimensionMismatch {
                directions: sources.len(),
                results: results.len(),
            });
        }
        for (source, result) in sources.iter().zip(results.iter_mut()) {
            *result = self.calc_response(
                station,
                element_errors,
                &BeamDirection::from(source),
                pointing,
                freq_hz,
            );
        }
        Ok(())
    }
}

/// A beam implementation that returns only unit gains for all directions.
pub struct NoBeam;

impl Beam for NoBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::None
    }

    fn calc_response(
        &self,
        _station: &Station,
        _element_errors: &[Complex<f64>],
        _direction: &BeamDirection,
        _pointing: &BeamDirection,
        _freq_hz: f64,
    ) -> Complex<f64> {
        Complex::new(1.0, 0.0)
    }
}

/// The angular distance between two unit vectors \[radians\].
fn angular_separation(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let cross = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let sin = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    let cos = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    sin.atan2(cos)
}
