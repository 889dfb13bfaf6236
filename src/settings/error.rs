// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings file '{file}' doesn't have a recognised extension! Valid extensions are: {supported}")]
    UnknownExtension { file: PathBuf, supported: String },

    #[error("Couldn't decode toml structure from '{file}':\n{err}")]
    Toml { file: PathBuf, err: toml::de::Error },

    #[error("Couldn't decode json structure from '{file}':\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("No phase centre was given; both RA and Dec are required")]
    NoPhaseCentre,

    #[error("One of RA and Dec was specified, but both are required!")]
    OnlyOneRaOrDec,

    #[error("Right Ascension was not within 0 to 360!")]
    RaInvalid,

    #[error("Declination was not within -90 to 90!")]
    DecInvalid,

    #[error("No start frequency was given")]
    NoStartFrequency,

    #[error("The start frequency must be positive, but got {0} Hz")]
    BadStartFrequency(f64),

    #[error("Number of channels cannot be 0!")]
    ZeroChannels,

    #[error("There are {num_channels} channels, so the frequency increment must be positive, but got {inc} Hz")]
    BadFrequencyInc { num_channels: usize, inc: f64 },

    #[error("No observation start time (MJD) was given")]
    NoStartTime,

    #[error("Number of time steps cannot be 0!")]
    ZeroTimeSteps,

    #[error("Only one of the time resolution and the observation length may be given")]
    TimeResAndLength,

    #[error("The time resolution must be positive, but got {0} s")]
    BadTimeRes(f64),

    #[error("The number of {0} averages cannot be 0!")]
    ZeroAverages(&'static str),

    #[error("The channel bandwidth cannot be negative, but got {0} Hz")]
    BadChannelBandwidth(f64),

    #[error("The time-average smearing interval must be a non-negative number of seconds, but got {0}")]
    BadTimeAverage(f64),

    #[error("The uv range {min} to {max} wavelengths is empty or negative")]
    BadUvRange { min: f64, max: f64 },

    #[error("The flux density range {min} to {max} Jy is empty")]
    BadFluxRange { min: f64, max: f64 },

    #[error("The maximum number of sources per chunk cannot be 0!")]
    ZeroChunkSize,

    #[error("No array position was given")]
    NoArrayPosition,

    #[error("Array position specified as {pos:?}, not [<Longitude>, <Latitude>, <Height>]")]
    BadArrayPosition { pos: Vec<f64> },

    #[error("No stations were given; either a layout file or inline stations are required")]
    NoStations,

    #[error("A layout file and inline stations were both given; only one may be used")]
    LayoutAndStations,

    #[error("Station noise RMS values cannot be negative, but got {0} Jy")]
    BadNoiseRms(f64),

    #[error("An empty list of output visibility files was given")]
    NoOutput,

    #[error(transparent)]
    Sky(#[from] crate::sky::SkyError),

    #[error(transparent)]
    Telescope(#[from] crate::telescope::TelescopeError),

    #[error(transparent)]
    Device(#[from] crate::device::DeviceError),

    #[error(transparent)]
    VisWrite(#[from] crate::io::write::VisWriteError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
