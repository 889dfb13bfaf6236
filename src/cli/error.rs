// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all rimesim-related errors. This should be the *only* error
//! enum that is publicly visible from the command line.

use thiserror::Error;

use crate::{
    device::DeviceError, io::write::VisWriteError, settings::SettingsError,
    simulate::SimulateError, sky::SkyError, telescope::TelescopeError,
};

const SETTINGS_HELP: &str = "Run 'rimesim simulate --help' for the available settings";

/// The *only* publicly visible error from rimesim. Each error message should
/// include a hint, unless it's "generic".
#[derive(Error, Debug)]
pub enum RimeSimError {
    /// An error related to settings files or arguments.
    #[error("{0}\n\n{SETTINGS_HELP}")]
    Settings(String),

    /// An error related to sky models.
    #[error("{0}\n\nSky models are yaml or json maps from source names to lists of components")]
    SkyModel(String),

    /// An error related to the telescope description.
    #[error("{0}\n\nLayout files hold the east, north and (optionally) up offsets of each station [metres]")]
    Telescope(String),

    /// An error related to devices.
    #[error("{0}\n\nTry requesting fewer devices with --num-devices")]
    Device(String),

    /// An error related to writing visibilities.
    #[error("{0}")]
    VisWrite(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SettingsError> for RimeSimError {
    fn from(e: SettingsError) -> Self {
        let s = e.to_string();
        match e {
            SettingsError::Sky(e) => Self::from(e),
            SettingsError::Telescope(e) => Self::from(e),
            SettingsError::Device(e) => Self::from(e),
            SettingsError::VisWrite(e) => Self::from(e),
            SettingsError::IO(e) => Self::from(e),
            _ => Self::Settings(s),
        }
    }
}

impl From<SimulateError> for RimeSimError {
    fn from(e: SimulateError) -> Self {
        let s = e.to_string();
        match e {
            SimulateError::NoOutput => Self::Settings(s),
            SimulateError::Device(e) => Self::from(e),
            SimulateError::VisWrite(e) => Self::from(e),
            SimulateError::Beam(_) => Self::Telescope(s),
            SimulateError::WorkerPanicked(_)
            | SimulateError::Noise(_)
            | SimulateError::Effect(_)
            | SimulateError::Jones(_)
            | SimulateError::IO(_) => Self::Generic(s),
        }
    }
}

impl From<SkyError> for RimeSimError {
    fn from(e: SkyError) -> Self {
        let s = e.to_string();
        match e {
            SkyError::ZeroChunkSize => Self::Settings(s),
            SkyError::IO(e) => Self::from(e),
            _ => Self::SkyModel(s),
        }
    }
}

impl From<TelescopeError> for RimeSimError {
    fn from(e: TelescopeError) -> Self {
        let s = e.to_string();
        match e {
            TelescopeError::IO(e) => Self::from(e),
            _ => Self::Telescope(s),
        }
    }
}

impl From<DeviceError> for RimeSimError {
    fn from(e: DeviceError) -> Self {
        Self::Device(e.to_string())
    }
}

impl From<VisWriteError> for RimeSimError {
    fn from(e: VisWriteError) -> Self {
        Self::VisWrite(e.to_string())
    }
}

impl From<std::io::Error> for RimeSimError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
