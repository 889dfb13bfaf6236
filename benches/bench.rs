// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f64::consts::TAU;

use criterion::*;
use num_complex::Complex;

use rime_simulator::{time::mjd_to_gast_fast, Jones, Settings};

fn jones_operations(c: &mut Criterion) {
    let j = Jones::from([
        Complex::new(1.0, -2.0),
        Complex::new(5.0, -6.0),
        Complex::new(3.0, -4.0),
        Complex::new(7.0, -8.0),
    ]);
    let j2 = Jones::from([
        Complex::new(2.0, -4.0),
        Complex::new(10.0, -12.0),
        Complex::new(6.0, -8.0),
        Complex::new(14.0, -16.0),
    ]);

    c.bench_function("hermitian multiply", |b| b.iter(|| j.mul_hermitian(&j2)));
}

/// Settings for a small array looking at the zenith, with `num_sources`
/// sources scattered around the phase centre.
fn settings(num_sources: usize, scalar_mode: bool) -> Settings {
    let lst = (mjd_to_gast_fast(59000.3) + 116.67_f64.to_radians()).rem_euclid(TAU);
    let ra = lst.to_degrees();
    let dec = -26.7;

    let mut toml = format!(
        r#"
[simulator]
num_devices = 1

[observation]
ra = {ra}
dec = {dec}
start_frequency_hz = 150e6
frequency_inc_hz = 1e6
num_channels = 2
start_time_mjd = 59000.3
num_time_steps = 4
time_res = 8.0

[telescope]
array_position = [116.67, -26.7, 377.0]
beam = {{ type = "gaussian", fwhm_deg = 25.0, ref_freq_hz = 150e6 }}

[interferometer]
scalar_mode = {scalar_mode}
num_vis_ave = 2
num_fringe_ave = 2
"#
    );
    toml.push_str("\n[[telescope.stations]]\neast = 0.0\nnorth = 0.0\n");
    for i in 1..32 {
        let angle = i as f64 * 0.7;
        let r = 15.0 * i as f64;
        toml.push_str(&format!(
            "\n[[telescope.stations]]\neast = {}\nnorth = {}\n",
            r * angle.cos(),
            r * angle.sin()
        ));
    }
    for i in 0..num_sources {
        let f = i as f64 / num_sources as f64;
        toml.push_str(&format!(
            "\n[[sky.sources.bench]]\nra = {}\ndec = {}\nflux_density = {{ freq = 150e6, i = {} }}\n",
            ra + 5.0 * (f - 0.5),
            dec + 3.0 * (0.5 - f),
            1.0 + f
        ));
    }

    toml::from_str(&toml).unwrap()
}

fn simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    group.sample_size(10);
    for (name, scalar_mode) in [("scalar", true), ("matrix", false)] {
        let sim = settings(100, scalar_mode).parse().unwrap();
        group.bench_function(format!("32 stations, 100 sources, {name}"), |b| {
            b.iter(|| sim.simulate().unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, jones_operations, simulate);
criterion_main!(benches);
