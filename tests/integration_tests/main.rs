// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod no_stderr;
mod simulate;

use std::{
    f64::consts::TAU,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

use rime_simulator::time::mjd_to_gast_fast;

const START_MJD: f64 = 59000.3;
const LONGITUDE_DEG: f64 = 116.67;
const LATITUDE_DEG: f64 = -26.7;

fn rimesim() -> Command {
    Command::cargo_bin("rimesim").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a settings file for a small array looking at the zenith, with the
/// output visibilities going to `output`.
fn write_settings(dir: &Path, output: &Path) -> PathBuf {
    let lst = (mjd_to_gast_fast(START_MJD) + LONGITUDE_DEG.to_radians()).rem_euclid(TAU);
    let ra = lst.to_degrees();
    let dec = LATITUDE_DEG;

    let settings = format!(
        r#"
[simulator]
max_sources_per_chunk = 1

[observation]
ra = {ra}
dec = {dec}
start_frequency_hz = 150e6
frequency_inc_hz = 2e6
num_channels = 3
start_time_mjd = {START_MJD}
num_time_steps = 2
time_res = 8.0

[telescope]
array_position = [{LONGITUDE_DEG}, {LATITUDE_DEG}, 377.0]
beam = {{ type = "gaussian", fwhm_deg = 30.0, ref_freq_hz = 150e6 }}
stations = [
    {{ east = 0.0, north = 0.0 }},
    {{ east = 50.0, north = 10.0 }},
    {{ east = -20.0, north = 70.0 }},
    {{ east = 35.0, north = -45.0 }},
]

[interferometer]
num_vis_ave = 2
num_fringe_ave = 2
outputs = ["{}"]

[[sky.sources.centre]]
ra = {ra}
dec = {dec}
flux_density = {{ freq = 150e6, i = 1.0 }}

[[sky.sources.offset]]
ra = {}
dec = {}
flux_density = {{ freq = 150e6, i = 2.0, q = 0.3 }}
spectral_index = -0.8
"#,
        output.display(),
        (ra + 2.0).rem_euclid(360.0),
        dec + 1.5,
    );

    let file = dir.join("settings.toml");
    let mut f = File::create(&file).unwrap();
    f.write_all(settings.as_bytes()).unwrap();
    file
}
