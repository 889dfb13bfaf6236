// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read in sky-model files.
//!
//! Sky models are yaml or json maps from source names to lists of components:
//!
//! ```yaml
//! bright_source:
//! - ra: 60.0            # degrees
//!   dec: -27.0          # degrees
//!   flux_density:
//!     freq: 150000000.0 # Hz
//!     i: 1.0            # Jy
//!     q: 0.1            # Q, U and V are optional
//!   spectral_index: -0.7          # optional
//!   rotation_measure: 2.0         # optional [rad/m^2]
//!   gaussian:                     # optional
//!     maj: 120.0                  # arcsec
//!     min: 60.0                   # arcsec
//!     pa: 45.0                    # degrees
//! ```

use std::{
    collections::BTreeMap,
    f64::consts::{FRAC_PI_2, TAU},
    fs::File,
    io::BufReader,
    path::Path,
};

use log::{debug, trace};
use marlu::RADec;
use serde::{Deserialize, Serialize};

use super::{FluxDensity, GaussianShape, SkyError, SkyModel, Source};

pub const SKY_MODEL_EXTENSIONS: &str = "yaml, yml, json";

/// A sky model as it is written in a file: source names mapped to their
/// components.
pub type FileSkyModel = BTreeMap<String, Vec<FileComponent>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileComponent {
    /// \[degrees\]
    pub ra: f64,

    /// \[degrees\]
    pub dec: f64,

    pub flux_density: FluxDensity,

    #[serde(default)]
    pub spectral_index: f64,

    /// \[rad/m^2\]
    #[serde(default)]
    pub rotation_measure: f64,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaussian: Option<FileGaussian>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileGaussian {
    /// \[arcsec\]
    pub maj: f64,
    /// \[arcsec\]
    pub min: f64,
    /// \[degrees\]
    pub pa: f64,
}

/// Read a yaml or json sky-model file. Direction cosines are calculated with
/// respect to `phase_centre`.
pub fn read_sky_model<P: AsRef<Path>>(path: P, phase_centre: RADec) -> Result<SkyModel, SkyError> {
    fn inner(path: &Path, phase_centre: RADec) -> Result<SkyModel, SkyError> {
        debug!("Attempting to read sky model {}", path.display());
        if !path.exists() {
            return Err(SkyError::FileDoesntExist(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .and_then(|os_str| os_str.to_str())
            .map(|s| s.to_lowercase());
        let file_sky: FileSkyModel = match ext.as_deref() {
            Some("yaml" | "yml") => {
                trace!("Reading as yaml");
                let f = BufReader::new(File::open(path)?);
                serde_yaml::from_reader(f)?
            }
            Some("json") => {
                trace!("Reading as json");
                let f = BufReader::new(File::open(path)?);
                serde_json::from_reader(f)?
            }
            _ => {
                return Err(SkyError::UnknownExtension {
                    file: path.to_path_buf(),
                    supported: SKY_MODEL_EXTENSIONS.to_string(),
                })
            }
        };

        sky_model_from_components(file_sky, phase_centre)
    }
    inner(path.as_ref(), phase_centre)
}

/// Validate and convert sky-model components into a [`SkyModel`].
pub fn sky_model_from_components(
    file_sky: FileSkyModel,
    phase_centre: RADec,
) -> Result<SkyModel, SkyError> {
    let mut sources = Vec::with_capacity(file_sky.values().map(|c| c.len()).sum());
    for (name, components) in file_sky {
        for comp in components {
            let invalid = |field: &'static str, value: f64| SkyError::InvalidValue {
                name: name.clone(),
                field,
                value,
            };

            let radec = RADec::from_degrees(comp.ra, comp.dec);
            if !(0.0..TAU).contains(&radec.ra) {
                return Err(invalid("RA", comp.ra));
            }
            if !(-FRAC_PI_2..=FRAC_PI_2).contains(&radec.dec) {
                return Err(invalid("Dec", comp.dec));
            }
            if comp.flux_density.freq <= 0.0 || !comp.flux_density.freq.is_finite() {
                return Err(invalid("reference frequency", comp.flux_density.freq));
            }
            if !comp.spectral_index.is_finite() {
                return Err(invalid("spectral index", comp.spectral_index));
            }

            let shape = match comp.gaussian {
                None => None,
                Some(FileGaussian { maj, min, pa }) => {
                    if maj < 0.0 {
                        return Err(invalid("Gaussian major axis", maj));
                    }
                    if min < 0.0 {
                        return Err(invalid("Gaussian minor axis", min));
                    }
                    Some(GaussianShape {
                        maj: (maj / 3600.0).to_radians(),
                        min: (min / 3600.0).to_radians(),
                        pa: pa.to_radians(),
                    })
                }
            };

            sources.push(Source::new(
                radec,
                comp.flux_density,
                comp.spectral_index,
                comp.rotation_measure,
                shape,
                phase_centre,
            ));
        }
    }

    debug!("Read {} sky-model sources", sources.len());
    Ok(SkyModel {
        phase_centre,
        sources,
    })
}
