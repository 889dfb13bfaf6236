// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulation settings.
//!
//! Settings may be given on the command line, in a toml or json settings
//! file, or both; command-line values take precedence. All booleans must
//! have `#[serde(default)]` annotated, and anything that isn't a boolean must
//! be optional. This allows every setting to be given in either place.
//!
//! A settings file has a table for each section:
//!
//! ```toml
//! [observation]
//! ra = 60.0
//! dec = -27.0
//! start_frequency_hz = 150e6
//! frequency_inc_hz = 1e6
//! num_channels = 4
//! start_time_mjd = 59000.3
//!
//! [telescope]
//! array_position = [116.67, -26.7, 377.0]
//! layout = "layout.txt"
//! beam = { type = "gaussian", fwhm_deg = 20.0, ref_freq_hz = 150e6 }
//!
//! [interferometer]
//! outputs = ["out.vis"]
//! ```

mod error;

pub use error::SettingsError;

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use clap::Parser;
use console::style;
use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, info, trace};
use marlu::{LatLngHeight, RADec, ENH};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    beam::BeamModel,
    cli::{display_warnings, InfoPrinter, RimeSimError, Warn},
    constants::{
        DEFAULT_MAX_SOURCES_PER_CHUNK, DEFAULT_NUM_CHANNELS, DEFAULT_NUM_FRINGE_AVE,
        DEFAULT_NUM_TIME_STEPS, DEFAULT_NUM_VIS_AVE, DEFAULT_OUTPUT_VIS_FILENAME,
        DEFAULT_RANDOM_SEED, DEFAULT_TIME_RES_SECONDS,
    },
    correlate::CorrelatorSettings,
    device::acquire_devices,
    io::{write::vis_output_type, VIS_OUTPUT_EXTENSIONS},
    jones::VisType,
    simulate::{FrequencyGrid, Simulation},
    sky::{
        read::{read_sky_model, sky_model_from_components, FileSkyModel, SKY_MODEL_EXTENSIONS},
        FluxFilter, SkyModel,
    },
    telescope::{read_layout_file, Station, Telescope},
    time::TimeGrid,
};

lazy_static::lazy_static! {
    static ref SETTINGS_FILE_TYPES_COMMA_SEPARATED: String = SettingsFileType::iter().join(", ");

    static ref SETTINGS_FILE_HELP: String =
        format!("All settings may be specified in a file. Any CLI arguments override settings in the file. Supported formats: {}", *SETTINGS_FILE_TYPES_COMMA_SEPARATED);

    static ref MAX_SOURCES_PER_CHUNK_HELP: String =
        format!("The maximum number of sources simulated together by a device. Default: {DEFAULT_MAX_SOURCES_PER_CHUNK}");

    static ref SKY_MODEL_HELP: String =
        format!("Path to a sky-model file. Supported formats: {SKY_MODEL_EXTENSIONS}");

    static ref NUM_CHANNELS_HELP: String =
        format!("The number of frequency channels. Default: {DEFAULT_NUM_CHANNELS}");

    static ref NUM_TIME_STEPS_HELP: String =
        format!("The number of time steps (correlator dumps). Default: {DEFAULT_NUM_TIME_STEPS}");

    static ref TIME_RES_HELP: String =
        format!("The time resolution of each dump [seconds]. Default: {DEFAULT_TIME_RES_SECONDS}");

    static ref SEED_HELP: String =
        format!("The random seed used for station beam errors. Default: {DEFAULT_RANDOM_SEED}");

    static ref NUM_VIS_AVE_HELP: String =
        format!("The number of averages of the full measurement equation per dump. Default: {DEFAULT_NUM_VIS_AVE}");

    static ref NUM_FRINGE_AVE_HELP: String =
        format!("The number of averages of the interferometer phase for each full average. Default: {DEFAULT_NUM_FRINGE_AVE}");

    static ref OUTPUTS_HELP: String =
        format!("Paths to the output visibility files. Supported formats: {}. Default: {}", *VIS_OUTPUT_EXTENSIONS, DEFAULT_OUTPUT_VIS_FILENAME);
}

#[derive(Debug, Display, EnumIter, EnumString)]
enum SettingsFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[clap(name = "SETTINGS_FILE", help = SETTINGS_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    pub settings_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(default)]
    pub simulator: SimulatorSettings,

    #[clap(flatten)]
    #[serde(default)]
    pub sky: SkySettings,

    #[clap(flatten)]
    #[serde(default)]
    pub observation: ObservationSettings,

    #[clap(flatten)]
    #[serde(default)]
    pub telescope: TelescopeSettings,

    #[clap(flatten)]
    #[serde(default)]
    pub interferometer: InterferometerSettings,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorSettings {
    /// Simulate in single precision rather than double precision.
    #[clap(long, help_heading = "SIMULATOR")]
    #[serde(default)]
    pub single_precision: bool,

    /// The number of devices to use. Default: all of them.
    #[clap(long, help_heading = "SIMULATOR")]
    pub num_devices: Option<usize>,

    #[clap(long, help = MAX_SOURCES_PER_CHUNK_HELP.as_str(), help_heading = "SIMULATOR")]
    pub max_sources_per_chunk: Option<usize>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkySettings {
    #[clap(short, long, help = SKY_MODEL_HELP.as_str(), parse(from_os_str), help_heading = "SKY MODEL")]
    pub sky_model: Option<PathBuf>,

    /// Sources fainter than this in Stokes I at a channel frequency are
    /// ignored at that channel [Jy].
    #[clap(long, help_heading = "SKY MODEL")]
    pub flux_min: Option<f64>,

    /// Sources brighter than this in Stokes I at a channel frequency are
    /// ignored at that channel [Jy].
    #[clap(long, help_heading = "SKY MODEL")]
    pub flux_max: Option<f64>,

    /// Sources given directly in a settings file, in the same form as a
    /// sky-model file. These are added to any sources in the sky-model file.
    #[clap(skip)]
    pub sources: Option<FileSkyModel>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationSettings {
    /// The phase centre right ascension [degrees].
    #[clap(short, long, help_heading = "OBSERVATION")]
    pub ra: Option<f64>,

    /// The phase centre declination [degrees].
    #[clap(short, long, allow_hyphen_values = true, help_heading = "OBSERVATION")]
    pub dec: Option<f64>,

    /// The frequency of the first channel [Hz].
    #[clap(long, help_heading = "OBSERVATION")]
    pub start_frequency_hz: Option<f64>,

    /// The frequency increment between channels [Hz].
    #[clap(long, help_heading = "OBSERVATION")]
    pub frequency_inc_hz: Option<f64>,

    #[clap(short = 'c', long, help = NUM_CHANNELS_HELP.as_str(), help_heading = "OBSERVATION")]
    pub num_channels: Option<usize>,

    /// The start of the observation [UTC MJD].
    #[clap(long, help_heading = "OBSERVATION")]
    pub start_time_mjd: Option<f64>,

    #[clap(short = 't', long, help = NUM_TIME_STEPS_HELP.as_str(), help_heading = "OBSERVATION")]
    pub num_time_steps: Option<usize>,

    #[clap(long, help = TIME_RES_HELP.as_str(), help_heading = "OBSERVATION")]
    pub time_res: Option<f64>,

    /// The length of the observation [seconds]. This may be given instead of
    /// the time resolution.
    #[clap(long, conflicts_with = "time-res", help_heading = "OBSERVATION")]
    pub length: Option<f64>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelescopeSettings {
    /// The Earth longitude, latitude, and height of the array reference
    /// position [degrees, degrees, meters].
    #[clap(
        long, help_heading = "TELESCOPE",
        number_of_values = 3,
        allow_hyphen_values = true,
        value_names = &["LONG_DEG", "LAT_DEG", "HEIGHT_M"]
    )]
    pub array_position: Option<Vec<f64>>,

    /// A text file of station east, north and (optionally) up offsets from
    /// the array position [metres].
    #[clap(short, long, parse(from_os_str), help_heading = "TELESCOPE")]
    pub layout: Option<PathBuf>,

    /// Stations given directly in a settings file.
    #[clap(skip)]
    pub stations: Option<Vec<StationSettings>>,

    /// The station beam model. Default: no beam.
    #[clap(skip)]
    pub beam: Option<BeamModel>,

    /// Don't apply a station beam, regardless of the beam model.
    #[clap(long, help_heading = "TELESCOPE")]
    #[serde(default)]
    pub no_beam: bool,

    /// Element east and north offsets used by stations that don't have their
    /// own [metres].
    #[clap(skip)]
    pub elements: Option<Vec<[f64; 2]>>,

    #[clap(long, help = SEED_HELP.as_str(), help_heading = "TELESCOPE")]
    pub seed: Option<u64>,

    /// Divide station beams by their response at the phase centre.
    #[clap(long, help_heading = "TELESCOPE")]
    #[serde(default)]
    pub normalise_beams: bool,

    /// The system noise RMS of stations that don't have their own [Jy].
    /// Default: 0
    #[clap(long, help_heading = "TELESCOPE")]
    pub station_noise_rms: Option<f64>,
}

/// A station given directly in a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSettings {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// \[metres\]
    pub east: f64,

    /// \[metres\]
    pub north: f64,

    /// \[metres\]
    #[serde(default)]
    pub up: f64,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<[f64; 2]>>,

    /// \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_rms_jy: Option<f64>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterferometerSettings {
    /// Simulate Stokes I only, rather than all four polarisation products.
    #[clap(long, help_heading = "INTERFEROMETER")]
    #[serde(default)]
    pub scalar_mode: bool,

    #[clap(long, help = NUM_VIS_AVE_HELP.as_str(), help_heading = "INTERFEROMETER")]
    pub num_vis_ave: Option<usize>,

    #[clap(long, help = NUM_FRINGE_AVE_HELP.as_str(), help_heading = "INTERFEROMETER")]
    pub num_fringe_ave: Option<usize>,

    /// The width of each channel, used for bandwidth smearing [Hz]. Default: 0
    /// (no smearing)
    #[clap(long, help_heading = "INTERFEROMETER")]
    pub channel_bandwidth_hz: Option<f64>,

    /// The time that each visibility is averaged over, used for analytic
    /// time-average smearing [seconds]. Default: 0 (no smearing)
    #[clap(long, help_heading = "INTERFEROMETER")]
    pub time_average_sec: Option<f64>,

    /// Baselines shorter than this have no signal [wavelengths].
    #[clap(long, help_heading = "INTERFEROMETER")]
    pub uv_min: Option<f64>,

    /// Baselines longer than this have no signal [wavelengths].
    #[clap(long, help_heading = "INTERFEROMETER")]
    pub uv_max: Option<f64>,

    /// Add system noise to the visibilities.
    #[clap(long, help_heading = "INTERFEROMETER")]
    #[serde(default)]
    pub noise: bool,

    /// The seed of the system noise. Default: 1
    #[clap(long, help_heading = "INTERFEROMETER")]
    pub noise_seed: Option<u64>,

    #[clap(
        short = 'o',
        long,
        multiple_values(true),
        help = OUTPUTS_HELP.as_str(),
        help_heading = "OUTPUT FILES"
    )]
    pub outputs: Option<Vec<PathBuf>>,
}

/// Read settings from a toml or json file.
pub fn read_settings_file(file: &Path) -> Result<Settings, SettingsError> {
    debug!("Attempting to parse settings file {}", file.display());

    let file_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| SettingsFileType::from_str(&e).ok());
    let mut contents = String::new();
    match file_type {
        Some(SettingsFileType::Toml) => {
            debug!("Parsing toml file...");
            File::open(file)?.read_to_string(&mut contents)?;
            toml::from_str(&contents).map_err(|err| SettingsError::Toml {
                file: file.to_path_buf(),
                err,
            })
        }
        Some(SettingsFileType::Json) => {
            debug!("Parsing json file...");
            File::open(file)?.read_to_string(&mut contents)?;
            serde_json::from_str(&contents).map_err(|err| SettingsError::Json {
                file: file.to_path_buf(),
                err,
            })
        }
        None => Err(SettingsError::UnknownExtension {
            file: file.to_path_buf(),
            supported: SETTINGS_FILE_TYPES_COMMA_SEPARATED.clone(),
        }),
    }
}

impl Settings {
    /// Both command-line and file settings overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct, preferring CLI values over those in the file.
    ///
    /// This function should only ever merge settings, and not try to make
    /// sense of them.
    pub fn merge(self) -> Result<Settings, SettingsError> {
        debug!("Merging command-line arguments with the settings file");

        let cli = self;
        if let Some(settings_file) = &cli.settings_file {
            // Ensure all of the file settings are accounted for by pattern
            // matching.
            let Settings {
                settings_file: _,
                simulator,
                sky,
                observation,
                telescope,
                interferometer,
            } = read_settings_file(settings_file)?;

            Ok(Settings {
                settings_file: None,
                simulator: cli.simulator.merge(simulator),
                sky: cli.sky.merge(sky),
                observation: cli.observation.merge(observation),
                telescope: cli.telescope.merge(telescope),
                interferometer: cli.interferometer.merge(interferometer),
            })
        } else {
            Ok(cli)
        }
    }

    /// Make sense of the settings, read the sky model and telescope layout,
    /// and report what will be simulated.
    pub fn parse(self) -> Result<Simulation, SettingsError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let Settings {
            settings_file: _,
            simulator:
                SimulatorSettings {
                    single_precision,
                    num_devices,
                    max_sources_per_chunk,
                },
            sky:
                SkySettings {
                    sky_model,
                    flux_min,
                    flux_max,
                    sources,
                },
            observation:
                ObservationSettings {
                    ra,
                    dec,
                    start_frequency_hz,
                    frequency_inc_hz,
                    num_channels,
                    start_time_mjd,
                    num_time_steps,
                    time_res,
                    length,
                },
            telescope:
                TelescopeSettings {
                    array_position,
                    layout,
                    stations,
                    beam,
                    no_beam,
                    elements,
                    seed,
                    normalise_beams,
                    station_noise_rms,
                },
            interferometer:
                InterferometerSettings {
                    scalar_mode,
                    num_vis_ave,
                    num_fringe_ave,
                    channel_bandwidth_hz,
                    time_average_sec,
                    uv_min,
                    uv_max,
                    noise,
                    noise_seed,
                    outputs,
                },
        } = self;

        let devices = acquire_devices(num_devices)?;
        let vis_type = VisType::new(!single_precision, scalar_mode);
        let max_sources_per_chunk = max_sources_per_chunk.unwrap_or(DEFAULT_MAX_SOURCES_PER_CHUNK);
        if max_sources_per_chunk == 0 {
            return Err(SettingsError::ZeroChunkSize);
        }
        let mut sim_printer = InfoPrinter::new("Simulating visibilities".into());
        sim_printer.push_block(vec![
            format!("{vis_type} visibilities").into(),
            format!("Using {} device(s)", devices.len()).into(),
            format!("At most {max_sources_per_chunk} sources per chunk").into(),
        ]);
        sim_printer.display();

        let mut coord_printer = InfoPrinter::new("Coordinates".into());
        let phase_centre = match (ra, dec) {
            (Some(ra), Some(dec)) => {
                if !(0.0..=360.0).contains(&ra) {
                    return Err(SettingsError::RaInvalid);
                }
                if !(-90.0..=90.0).contains(&dec) {
                    return Err(SettingsError::DecInvalid);
                }
                RADec::from_degrees(ra, dec)
            }
            (Some(_), None) | (None, Some(_)) => return Err(SettingsError::OnlyOneRaOrDec),
            (None, None) => return Err(SettingsError::NoPhaseCentre),
        };
        let array_position = match array_position {
            Some(v) => {
                if v.len() != 3 {
                    return Err(SettingsError::BadArrayPosition { pos: v });
                }
                LatLngHeight {
                    longitude_rad: v[0].to_radians(),
                    latitude_rad: v[1].to_radians(),
                    height_metres: v[2],
                }
            }
            None => return Err(SettingsError::NoArrayPosition),
        };
        coord_printer.push_block(vec![
            style("                   RA        Dec")
                .bold()
                .to_string()
                .into(),
            format!(
                "Phase centre:      {:>8.4}° {:>8.4}°",
                phase_centre.ra.to_degrees(),
                phase_centre.dec.to_degrees()
            )
            .into(),
        ]);
        coord_printer.push_line(
            format!(
                "Array position:    {:>8.4}° {:>8.4}° {:.4}m",
                array_position.longitude_rad.to_degrees(),
                array_position.latitude_rad.to_degrees(),
                array_position.height_metres
            )
            .into(),
        );
        coord_printer.display();

        let telescope = {
            let default_noise_rms_jy = station_noise_rms.unwrap_or(0.0);
            if default_noise_rms_jy < 0.0 {
                return Err(SettingsError::BadNoiseRms(default_noise_rms_jy));
            }
            let latitude_rad = array_position.latitude_rad;
            let common_elements = elements.unwrap_or_default();
            let stations = match (layout, stations) {
                (Some(_), Some(_)) => return Err(SettingsError::LayoutAndStations),
                (Some(layout), None) => {
                    // Layout files only have positions.
                    let mut stations = read_layout_file(layout, latitude_rad)?;
                    for station in stations.iter_mut() {
                        station.noise_rms_jy = default_noise_rms_jy;
                        station.elements.clone_from(&common_elements);
                    }
                    stations
                }
                (None, Some(stations)) => stations
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| {
                        s.into_station(i, latitude_rad, default_noise_rms_jy, &common_elements)
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                (None, None) => return Err(SettingsError::NoStations),
            };

            let beam = if no_beam {
                BeamModel::None
            } else {
                beam.unwrap_or_default()
            };
            let telescope = Telescope {
                array_position,
                stations,
                phase_centre,
                beam,
                seed: seed.unwrap_or(DEFAULT_RANDOM_SEED),
                normalise_beams_at_phase_centre: normalise_beams,
            };
            telescope.validate()?;

            if matches!(telescope.beam, BeamModel::ApertureArray { .. })
                && telescope.max_station_size() < 2
            {
                "The aperture-array beam is used, but no station has more than one element"
                    .warn();
            }

            let mut telescope_printer = InfoPrinter::new("Telescope info".into());
            telescope_printer.push_block(vec![
                format!("{} stations", telescope.num_stations()).into(),
                format!("{} baselines", telescope.num_baselines()).into(),
                format!("Largest station: {} elements", telescope.max_station_size()).into(),
            ]);
            telescope_printer.push_line(format!("Beam: {}", describe_beam(&telescope.beam)).into());
            if telescope.normalise_beams_at_phase_centre {
                telescope_printer.push_line("Beams are normalised at the phase centre".into());
            }
            telescope_printer.push_line(format!("Random seed: {}", telescope.seed).into());
            telescope_printer.display();

            telescope
        };

        let time_grid = {
            let start_time_mjd = start_time_mjd.ok_or(SettingsError::NoStartTime)?;
            let num_times = num_time_steps.unwrap_or(DEFAULT_NUM_TIME_STEPS);
            if num_times == 0 {
                return Err(SettingsError::ZeroTimeSteps);
            }
            let time_res = match (time_res, length) {
                (Some(_), Some(_)) => return Err(SettingsError::TimeResAndLength),
                (Some(time_res), None) => time_res,
                (None, Some(length)) => length / num_times as f64,
                (None, None) => DEFAULT_TIME_RES_SECONDS,
            };
            if time_res <= 0.0 || !time_res.is_finite() {
                return Err(SettingsError::BadTimeRes(time_res));
            }
            let num_vis_ave = num_vis_ave.unwrap_or(DEFAULT_NUM_VIS_AVE);
            if num_vis_ave == 0 {
                return Err(SettingsError::ZeroAverages("visibility"));
            }
            let num_fringe_ave = num_fringe_ave.unwrap_or(DEFAULT_NUM_FRINGE_AVE);
            if num_fringe_ave == 0 {
                return Err(SettingsError::ZeroAverages("fringe"));
            }
            let time_grid = TimeGrid {
                start: Epoch::from_mjd_utc(start_time_mjd),
                time_res: Duration::from_seconds(time_res),
                num_times,
                num_vis_ave,
                num_fringe_ave,
            };

            let mut time_printer = InfoPrinter::new("Time info".into());
            time_printer.push_line(format!("Resolution: {}", time_grid.time_res).into());
            time_printer.push_block(vec![
                format!("Number of time steps: {num_times}").into(),
                format!("Start:           {}", time_grid.start).into(),
                format!(
                    "Last dump centre: {}",
                    time_grid.start + time_grid.time_res * (num_times as f64 - 0.5)
                )
                .into(),
            ]);
            time_printer.push_line(
                format!("Averages per dump: {num_vis_ave} (each with {num_fringe_ave} fringe averages)")
                    .into(),
            );
            time_printer.display();

            time_grid
        };

        let (freqs, correlator) = {
            let start_hz = start_frequency_hz.ok_or(SettingsError::NoStartFrequency)?;
            if start_hz <= 0.0 || !start_hz.is_finite() {
                return Err(SettingsError::BadStartFrequency(start_hz));
            }
            let num_channels = num_channels.unwrap_or(DEFAULT_NUM_CHANNELS);
            if num_channels == 0 {
                return Err(SettingsError::ZeroChannels);
            }
            let inc_hz = frequency_inc_hz.unwrap_or(0.0);
            if num_channels > 1 && inc_hz <= 0.0 {
                return Err(SettingsError::BadFrequencyInc {
                    num_channels,
                    inc: inc_hz,
                });
            }
            let freqs = FrequencyGrid {
                start_hz,
                inc_hz,
                num_channels,
            };

            let channel_bandwidth_hz = channel_bandwidth_hz.unwrap_or(0.0);
            if channel_bandwidth_hz < 0.0 {
                return Err(SettingsError::BadChannelBandwidth(channel_bandwidth_hz));
            }
            let time_average_sec = time_average_sec.unwrap_or(0.0);
            if time_average_sec < 0.0 || !time_average_sec.is_finite() {
                return Err(SettingsError::BadTimeAverage(time_average_sec));
            }
            let uv_min_lambda = uv_min.unwrap_or(0.0);
            let uv_max_lambda = uv_max.unwrap_or(f64::INFINITY);
            if uv_min_lambda < 0.0 || uv_max_lambda <= uv_min_lambda {
                return Err(SettingsError::BadUvRange {
                    min: uv_min_lambda,
                    max: uv_max_lambda,
                });
            }
            let correlator = CorrelatorSettings {
                channel_bandwidth_hz,
                uv_min_lambda,
                uv_max_lambda,
                time_average_sec,
            };

            let mut chan_printer = InfoPrinter::new("Channel info".into());
            chan_printer.push_block(vec![
                format!("Number of channels: {num_channels}").into(),
                format!("First channel: {:.6} MHz", freqs.freq(0) / 1e6).into(),
                format!(
                    "Last channel:  {:.6} MHz",
                    freqs.freq(num_channels - 1) / 1e6
                )
                .into(),
            ]);
            if channel_bandwidth_hz > 0.0 {
                chan_printer.push_line(
                    format!(
                        "Bandwidth smearing with {:.3} kHz channels",
                        channel_bandwidth_hz / 1e3
                    )
                    .into(),
                );
            }
            if time_average_sec > 0.0 {
                chan_printer.push_line(
                    format!("Time-average smearing over {time_average_sec} s").into(),
                );
                if time_grid.num_vis_ave * time_grid.num_fringe_ave > 1 {
                    "Time-average smearing is simulated both analytically and with sub-samples"
                        .warn();
                }
            }
            if uv_min_lambda > 0.0 || uv_max_lambda.is_finite() {
                chan_printer.push_line(
                    format!("uv range: {uv_min_lambda} to {uv_max_lambda} wavelengths").into(),
                );
            }
            chan_printer.display();

            (freqs, correlator)
        };

        let (chunks, flux_filter) = {
            if let (Some(min), Some(max)) = (flux_min, flux_max) {
                if max < min {
                    return Err(SettingsError::BadFluxRange { min, max });
                }
            }
            let flux_filter = FluxFilter {
                min_jy: flux_min,
                max_jy: flux_max,
            };

            let mut sky_printer = InfoPrinter::new("Sky model info".into());
            let mut sky = match sky_model {
                Some(file) => {
                    sky_printer.push_line(format!("From {}", file.display()).into());
                    read_sky_model(file, phase_centre)?
                }
                None => SkyModel {
                    phase_centre,
                    sources: vec![],
                },
            };
            if let Some(inline) = sources {
                let inline = sky_model_from_components(inline, phase_centre)?;
                sky_printer
                    .push_line(format!("{} sources from the settings file", inline.len()).into());
                sky.sources.extend(inline.sources);
            }
            if sky.is_empty() {
                "The sky model has no sources; the visibilities will only contain noise, if any"
                    .warn();
            }
            let num_sources = sky.len();
            let chunks = sky.into_chunks(max_sources_per_chunk)?;
            sky_printer.push_block(vec![
                format!("{num_sources} sources").into(),
                format!("{} chunks", chunks.len()).into(),
            ]);
            if flux_min.is_some() || flux_max.is_some() {
                sky_printer.push_line(
                    format!(
                        "Stokes I flux-density range: {} to {} Jy",
                        flux_min.unwrap_or(0.0),
                        flux_max.unwrap_or(f64::INFINITY)
                    )
                    .into(),
                );
            }
            sky_printer.display();

            (chunks, flux_filter)
        };

        let noise_seed = if noise {
            if telescope.stations.iter().all(|s| s.noise_rms_jy == 0.0) {
                "Noise is enabled, but every station has a noise RMS of 0 Jy".warn();
            }
            Some(noise_seed.unwrap_or(DEFAULT_RANDOM_SEED))
        } else {
            if noise_seed.is_some() {
                "A noise seed was given, but noise isn't enabled; ignoring".warn();
            }
            None
        };

        let outputs = match outputs {
            None => vec![PathBuf::from(DEFAULT_OUTPUT_VIS_FILENAME)],
            Some(outputs) if outputs.is_empty() => return Err(SettingsError::NoOutput),
            Some(outputs) => outputs,
        };
        let mut output_printer = InfoPrinter::new("Output info".into());
        let mut block = Vec::with_capacity(outputs.len());
        for output in &outputs {
            vis_output_type(output)?;
            block.push(output.display().to_string().into());
        }
        output_printer.push_block(block);
        if let Some(seed) = noise_seed {
            output_printer.push_line(format!("With noise (seed {seed})").into());
        }
        output_printer.display();

        display_warnings();

        Ok(Simulation {
            telescope: Arc::new(telescope),
            chunks,
            flux_filter,
            vis_type,
            freqs,
            time_grid,
            correlator,
            num_devices,
            noise_seed,
            outputs,
        })
    }

    /// Parse these settings and, unless this is a dry run, simulate.
    pub fn run(self, dry_run: bool) -> Result<(), RimeSimError> {
        debug!("Converting settings into a simulation");
        trace!("{:#?}", self);
        let sim = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        sim.run()?;
        Ok(())
    }

    /// Save these settings into a toml file.
    pub fn save_toml(&self, file: &Path) -> Result<(), RimeSimError> {
        let toml_str = toml::to_string(self)
            .map_err(|e| RimeSimError::Settings(format!("Couldn't serialise settings: {e}")))?;
        let mut f = BufWriter::new(File::create(file)?);
        f.write_all(toml_str.as_bytes())?;
        f.flush()?;
        Ok(())
    }
}

impl StationSettings {
    /// Settings that this station doesn't have are taken from the defaults
    /// of the telescope.
    fn into_station(
        self,
        index: usize,
        latitude_rad: f64,
        default_noise_rms_jy: f64,
        common_elements: &[[f64; 2]],
    ) -> Result<Station, SettingsError> {
        let noise_rms_jy = self.noise_rms_jy.unwrap_or(default_noise_rms_jy);
        if noise_rms_jy < 0.0 {
            return Err(SettingsError::BadNoiseRms(noise_rms_jy));
        }
        let enh = ENH {
            e: self.east,
            n: self.north,
            h: self.up,
        };
        Ok(Station {
            name: self.name.unwrap_or_else(|| format!("station_{index:03}")),
            xyz: enh.to_xyz(latitude_rad),
            elements: self.elements.unwrap_or_else(|| common_elements.to_vec()),
            noise_rms_jy,
        })
    }
}

fn describe_beam(beam: &BeamModel) -> String {
    match beam {
        BeamModel::None => "none".to_string(),
        BeamModel::Gaussian {
            fwhm_deg,
            ref_freq_hz,
        } => format!(
            "Gaussian, FWHM {fwhm_deg}° at {:.3} MHz",
            ref_freq_hz / 1e6
        ),
        BeamModel::Vla => "VLA (PBCOR)".to_string(),
        BeamModel::ApertureArray {
            element_gain_std,
            element_phase_std_deg,
        } => format!(
            "aperture array, element errors: gain σ {element_gain_std}, phase σ {element_phase_std_deg}°"
        ),
    }
}

impl SimulatorSettings {
    fn merge(self, other: Self) -> Self {
        Self {
            single_precision: self.single_precision || other.single_precision,
            num_devices: self.num_devices.or(other.num_devices),
            max_sources_per_chunk: self.max_sources_per_chunk.or(other.max_sources_per_chunk),
        }
    }
}

impl SkySettings {
    fn merge(self, other: Self) -> Self {
        Self {
            sky_model: self.sky_model.or(other.sky_model),
            flux_min: self.flux_min.or(other.flux_min),
            flux_max: self.flux_max.or(other.flux_max),
            sources: self.sources.or(other.sources),
        }
    }
}

impl ObservationSettings {
    fn merge(self, other: Self) -> Self {
        Self {
            ra: self.ra.or(other.ra),
            dec: self.dec.or(other.dec),
            start_frequency_hz: self.start_frequency_hz.or(other.start_frequency_hz),
            frequency_inc_hz: self.frequency_inc_hz.or(other.frequency_inc_hz),
            num_channels: self.num_channels.or(other.num_channels),
            start_time_mjd: self.start_time_mjd.or(other.start_time_mjd),
            num_time_steps: self.num_time_steps.or(other.num_time_steps),
            time_res: self.time_res.or(other.time_res),
            length: self.length.or(other.length),
        }
    }
}

impl TelescopeSettings {
    fn merge(self, other: Self) -> Self {
        Self {
            array_position: self.array_position.or(other.array_position),
            layout: self.layout.or(other.layout),
            stations: self.stations.or(other.stations),
            beam: self.beam.or(other.beam),
            no_beam: self.no_beam || other.no_beam,
            elements: self.elements.or(other.elements),
            seed: self.seed.or(other.seed),
            normalise_beams: self.normalise_beams || other.normalise_beams,
            station_noise_rms: self.station_noise_rms.or(other.station_noise_rms),
        }
    }
}

impl InterferometerSettings {
    fn merge(self, other: Self) -> Self {
        Self {
            scalar_mode: self.scalar_mode || other.scalar_mode,
            num_vis_ave: self.num_vis_ave.or(other.num_vis_ave),
            num_fringe_ave: self.num_fringe_ave.or(other.num_fringe_ave),
            channel_bandwidth_hz: self.channel_bandwidth_hz.or(other.channel_bandwidth_hz),
            time_average_sec: self.time_average_sec.or(other.time_average_sec),
            uv_min: self.uv_min.or(other.uv_min),
            uv_max: self.uv_max.or(other.uv_max),
            noise: self.noise || other.noise,
            noise_seed: self.noise_seed.or(other.noise_seed),
            outputs: self.outputs.or(other.outputs),
        }
    }
}
