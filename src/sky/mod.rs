// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sky-model sources, and how they're split up and prepared for simulation.
//!
//! A [`SkyModel`] is split into [`SkyChunk`]s, each of which is simulated
//! independently. For every channel, each chunk gets a frequency-scaled and
//! flux-filtered working copy, and for every time step the working copy is
//! clipped to the sources above the horizon ([`LocalSky`]).

mod error;
mod horizon;
pub mod read;
#[cfg(test)]
mod tests;

pub use error::SkyError;
pub use horizon::{hadec_to_horizon, LocalSky, VisibleSource};

use marlu::{RADec, LMN};
use serde::{Deserialize, Serialize};

use crate::{constants::VEL_C, jones::Coherency};

/// At a frequency, four flux densities for each Stokes parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxDensity {
    /// The frequency that these flux densities apply to \[Hz\]
    pub freq: f64,

    /// The flux density of Stokes I \[Jy\]
    pub i: f64,

    /// The flux density of Stokes Q \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub q: f64,

    /// The flux density of Stokes U \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub u: f64,

    /// The flux density of Stokes V \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub v: f64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(num: &f64) -> bool {
    num.abs() < f64::EPSILON
}

impl FluxDensity {
    pub fn to_coherency(self) -> Coherency {
        Coherency {
            i: self.i,
            q: self.q,
            u: self.u,
            v: self.v,
        }
    }
}

/// The shape of an elliptical Gaussian source. All angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianShape {
    /// Full width at half maximum of the major axis.
    pub maj: f64,

    /// Full width at half maximum of the minor axis.
    pub min: f64,

    /// Position angle of the major axis, east of north.
    pub pa: f64,
}

impl GaussianShape {
    /// The coefficients `[a, b, c]` of this source's visibility envelope
    /// `exp(-(a u² + b u v + c v²))`, with `u` and `v` in wavelengths.
    pub fn uv_coefficients(&self) -> [f64; 3] {
        let fwhm_to_sigma = 1.0 / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt());
        let sigma_maj = self.maj * fwhm_to_sigma;
        let sigma_min = self.min * fwhm_to_sigma;
        let (s_pa, c_pa) = self.pa.sin_cos();
        let two_pi_sq = 2.0 * std::f64::consts::PI * std::f64::consts::PI;
        let var_maj = sigma_maj * sigma_maj;
        let var_min = sigma_min * sigma_min;
        [
            two_pi_sq * (var_maj * s_pa * s_pa + var_min * c_pa * c_pa),
            two_pi_sq * 2.0 * s_pa * c_pa * (var_maj - var_min),
            two_pi_sq * (var_maj * c_pa * c_pa + var_min * s_pa * s_pa),
        ]
    }
}

/// A single sky-model source.
#[derive(Debug, Clone, Copy)]
pub struct Source {
    pub radec: RADec,

    /// Flux densities at the reference frequency.
    pub flux_density: FluxDensity,

    pub spectral_index: f64,

    /// \[rad/m^2\]
    pub rotation_measure: f64,

    /// The visibility envelope coefficients if this is a Gaussian source (see
    /// [`GaussianShape::uv_coefficients`]).
    pub gaussian: Option<[f64; 3]>,

    /// Direction cosines relative to the phase centre.
    pub lmn: LMN,
}

impl Source {
    pub fn new(
        radec: RADec,
        flux_density: FluxDensity,
        spectral_index: f64,
        rotation_measure: f64,
        shape: Option<GaussianShape>,
        phase_centre: RADec,
    ) -> Source {
        Source {
            radec,
            flux_density,
            spectral_index,
            rotation_measure,
            gaussian: shape.map(|s| s.uv_coefficients()),
            lmn: radec.to_lmn(phase_centre),
        }
    }

    /// Get this source's flux densities at another frequency. Stokes I, Q, U
    /// and V follow the spectral index, and the linear polarisation is rotated
    /// by the rotation measure.
    pub fn scaled_flux_density(&self, freq_hz: f64) -> FluxDensity {
        let fd = self.flux_density;
        let ratio = (freq_hz / fd.freq).powf(self.spectral_index);
        let (q, u) = if self.rotation_measure == 0.0 {
            (fd.q, fd.u)
        } else {
            let lambda = VEL_C / freq_hz;
            let lambda_ref = VEL_C / fd.freq;
            let angle = 2.0 * self.rotation_measure * (lambda * lambda - lambda_ref * lambda_ref);
            let (s, c) = angle.sin_cos();
            (fd.q * c - fd.u * s, fd.q * s + fd.u * c)
        };
        FluxDensity {
            freq: freq_hz,
            i: fd.i * ratio,
            q: q * ratio,
            u: u * ratio,
            v: fd.v * ratio,
        }
    }
}

/// Inclusive Stokes I limits for sources to be simulated. A missing limit
/// doesn't filter anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxFilter {
    pub min_jy: Option<f64>,
    pub max_jy: Option<f64>,
}

impl FluxFilter {
    pub fn accepts(&self, stokes_i: f64) -> bool {
        self.min_jy.map(|min| stokes_i >= min).unwrap_or(true)
            && self.max_jy.map(|max| stokes_i <= max).unwrap_or(true)
    }
}

/// A whole sky model, with direction cosines relative to its phase centre.
#[derive(Debug, Clone)]
pub struct SkyModel {
    pub phase_centre: RADec,
    pub sources: Vec<Source>,
}

impl SkyModel {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Split this sky model into chunks of at most `max_sources_per_chunk`
    /// sources. Source order is preserved.
    pub fn into_chunks(self, max_sources_per_chunk: usize) -> Result<Vec<SkyChunk>, SkyError> {
        if max_sources_per_chunk == 0 {
            return Err(SkyError::ZeroChunkSize);
        }
        Ok(self
            .sources
            .chunks(max_sources_per_chunk)
            .map(|sources| SkyChunk {
                sources: sources.to_vec(),
            })
            .collect())
    }
}

/// An ordered group of sources that is simulated as a unit. Chunks loaded from
/// a sky model are never mutated; per-channel working copies are made with
/// [`SkyChunk::scaled_copy_into`].
#[derive(Debug, Clone, Default)]
pub struct SkyChunk {
    pub sources: Vec<Source>,
}

impl SkyChunk {
    pub fn with_capacity(capacity: usize) -> SkyChunk {
        SkyChunk {
            sources: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Overwrite `out` with this chunk's sources scaled to `freq_hz`, keeping
    /// only those whose scaled Stokes I passes the filter.
    pub fn scaled_copy_into(&self, freq_hz: f64, filter: FluxFilter, out: &mut SkyChunk) {
        out.sources.clear();
        out.sources.extend(self.sources.iter().filter_map(|src| {
            let flux_density = src.scaled_flux_density(freq_hz);
            if filter.accepts(flux_density.i) {
                Some(Source {
                    flux_density,
                    ..*src
                })
            } else {
                None
            }
        }));
    }

    pub fn scaled_copy(&self, freq_hz: f64, filter: FluxFilter) -> SkyChunk {
        let mut out = SkyChunk::with_capacity(self.len());
        self.scaled_copy_into(freq_hz, filter, &mut out);
        out
    }
}
