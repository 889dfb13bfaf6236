// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Calculations should be done in
double precision as much as possible before converting to a lower precision,
if it is ever required.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light \[metres/second\].
pub const VEL_C: f64 = 299_792_458.0;

/// The rotation rate of the Earth \[radians/second\].
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// The MJD of the J2000 epoch (2000-01-01 12:00:00 TT, approximately).
pub const MJD_J2000: f64 = 51544.5;

/// Radians to arcminutes.
pub const RAD_TO_ARCMIN: f64 = 60.0 * 180.0 / PI;

/// The default maximum number of sky-model sources in a chunk.
pub const DEFAULT_MAX_SOURCES_PER_CHUNK: usize = 16384;

pub const DEFAULT_NUM_CHANNELS: usize = 1;

pub const DEFAULT_NUM_TIME_STEPS: usize = 1;

pub const DEFAULT_TIME_RES_SECONDS: f64 = 10.0;

/// The default number of sub-samples used to average the Jones matrices over
/// each visibility dump.
pub const DEFAULT_NUM_VIS_AVE: usize = 1;

/// The default number of sub-samples used to average the fringe phase over
/// each visibility sub-sample.
pub const DEFAULT_NUM_FRINGE_AVE: usize = 1;

pub const DEFAULT_RANDOM_SEED: u64 = 1;

pub const DEFAULT_OUTPUT_VIS_FILENAME: &str = "rimesim.vis";
