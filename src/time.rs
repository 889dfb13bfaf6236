// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions around time.
//!
//! Sidereal times are computed with low-precision ("fast") formulae; they are
//! accurate to roughly a second of time, which is ample for visibility
//! simulation.

use hifitime::{Duration, Epoch};

use crate::constants::{MJD_J2000, SECONDS_PER_DAY, TAU};

/// Greenwich mean sidereal time \[radians, 0 to 2π\] for a UTC MJD.
pub fn mjd_to_gmst(mjd_utc: f64) -> f64 {
    let d = mjd_utc - MJD_J2000;
    let t = d / 36525.0;
    let gmst_deg =
        280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38_710_000.0;
    gmst_deg.to_radians().rem_euclid(TAU)
}

/// The equation of the equinoxes \[radians\], using only the two largest
/// nutation terms.
pub fn equation_of_equinoxes_fast(mjd_utc: f64) -> f64 {
    let d = mjd_utc - MJD_J2000;

    // Longitude of the ascending node of the Moon, mean longitude of the Sun
    // and the obliquity of the ecliptic.
    let omega = (125.04 - 0.052954 * d).to_radians();
    let l = (280.47 + 0.98565 * d).to_radians();
    let epsilon = (23.4393 - 0.0000004 * d).to_radians();

    // Nutation in longitude [hours].
    let d_psi = -0.000319 * omega.sin() - 0.000024 * (2.0 * l).sin();
    (d_psi * epsilon.cos() * 15.0).to_radians()
}

/// Greenwich apparent sidereal time \[radians, 0 to 2π\] for a UTC MJD.
pub fn mjd_to_gast_fast(mjd_utc: f64) -> f64 {
    (mjd_to_gmst(mjd_utc) + equation_of_equinoxes_fast(mjd_utc)).rem_euclid(TAU)
}

/// The times that visibilities are simulated at. Every visibility "dump" is
/// split into `num_vis_ave` sub-intervals (over which Jones matrices are
/// averaged), and each of those is split into `num_fringe_ave` sub-intervals
/// (over which the fringe phase is averaged).
#[derive(Debug, Clone, Copy)]
pub struct TimeGrid {
    /// The start of the first dump.
    pub start: Epoch,

    /// The length of each dump.
    pub time_res: Duration,

    pub num_times: usize,

    pub num_vis_ave: usize,

    pub num_fringe_ave: usize,
}

impl TimeGrid {
    fn start_mjd(&self) -> f64 {
        self.start.to_mjd_utc_days()
    }

    fn dump_days(&self) -> f64 {
        self.time_res.to_seconds() / SECONDS_PER_DAY
    }

    /// The UTC MJD at the centre of dump `i_time`.
    pub fn dump_centre_mjd(&self, i_time: usize) -> f64 {
        self.start_mjd() + self.dump_days() * (i_time as f64 + 0.5)
    }

    /// The UTC MJD at the centre of a Jones-averaging sub-interval.
    pub fn vis_ave_centre_mjd(&self, i_time: usize, i_vis_ave: usize) -> f64 {
        let dt_ave = self.dump_days() / self.num_vis_ave as f64;
        self.start_mjd() + self.dump_days() * i_time as f64 + dt_ave * (i_vis_ave as f64 + 0.5)
    }

    /// The UTC MJD at the centre of a fringe-averaging sub-interval.
    pub fn fringe_ave_centre_mjd(&self, i_time: usize, i_vis_ave: usize, i_fringe: usize) -> f64 {
        let dt_ave = self.dump_days() / self.num_vis_ave as f64;
        let dt_fringe = dt_ave / self.num_fringe_ave as f64;
        self.start_mjd()
            + self.dump_days() * i_time as f64
            + dt_ave * i_vis_ave as f64
            + dt_fringe * (i_fringe as f64 + 0.5)
    }

    /// The centres of every dump.
    pub fn dump_centres(&self) -> Vec<Epoch> {
        (0..self.num_times)
            .map(|i| self.start + self.time_res * (i as f64 + 0.5))
            .collect()
    }
}
