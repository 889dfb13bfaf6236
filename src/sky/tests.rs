// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use marlu::{LatLngHeight, RADec};

use super::{read::*, *};

fn point(ra_deg: f64, dec_deg: f64, i: f64, phase_centre: RADec) -> Source {
    Source::new(
        RADec::from_degrees(ra_deg, dec_deg),
        FluxDensity {
            freq: 150e6,
            i,
            ..Default::default()
        },
        0.0,
        0.0,
        None,
        phase_centre,
    )
}

#[test]
fn test_phase_centre_source_has_zero_lm() {
    let pc = RADec::from_degrees(30.0, -27.0);
    let src = point(30.0, -27.0, 1.0, pc);
    assert_abs_diff_eq!(src.lmn.l, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(src.lmn.m, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(src.lmn.n, 1.0, epsilon = 1e-12);
}

#[test]
fn test_spectral_index_scaling() {
    let pc = RADec::from_degrees(0.0, 0.0);
    let mut src = point(0.0, 0.0, 2.0, pc);
    src.spectral_index = -0.8;
    src.flux_density.q = 1.0;
    let fd = src.scaled_flux_density(300e6);
    let ratio = 2.0_f64.powf(-0.8);
    assert_abs_diff_eq!(fd.freq, 300e6);
    assert_abs_diff_eq!(fd.i, 2.0 * ratio, epsilon = 1e-12);
    assert_abs_diff_eq!(fd.q, ratio, epsilon = 1e-12);
}

#[test]
fn test_rotation_measure_preserves_linear_polarisation() {
    let pc = RADec::from_degrees(0.0, 0.0);
    let mut src = point(0.0, 0.0, 2.0, pc);
    src.flux_density.q = 0.6;
    src.flux_density.u = 0.8;
    src.rotation_measure = 5.0;
    let fd = src.scaled_flux_density(120e6);
    assert_abs_diff_eq!((fd.q * fd.q + fd.u * fd.u).sqrt(), 1.0, epsilon = 1e-12);
    // A rotation has actually happened.
    assert!((fd.q - 0.6).abs() > 1e-3);
    // No rotation at the reference frequency.
    let fd = src.scaled_flux_density(150e6);
    assert_abs_diff_eq!(fd.q, 0.6, epsilon = 1e-12);
    assert_abs_diff_eq!(fd.u, 0.8, epsilon = 1e-12);
}

#[test]
fn test_flux_filter() {
    let pc = RADec::from_degrees(0.0, 0.0);
    let chunk = SkyChunk {
        sources: vec![
            point(0.0, 0.0, 0.5, pc),
            point(1.0, 0.0, 1.0, pc),
            point(2.0, 0.0, 5.0, pc),
            point(3.0, 0.0, 10.0, pc),
        ],
    };
    let filter = FluxFilter {
        min_jy: Some(1.0),
        max_jy: Some(5.0),
    };
    let copy = chunk.scaled_copy(150e6, filter);
    assert_eq!(copy.len(), 2);
    assert_abs_diff_eq!(copy.sources[0].flux_density.i, 1.0);
    assert_abs_diff_eq!(copy.sources[1].flux_density.i, 5.0);
    // The original is untouched.
    assert_eq!(chunk.len(), 4);

    let everything = chunk.scaled_copy(150e6, FluxFilter::default());
    assert_eq!(everything.len(), 4);
}

#[test]
fn test_into_chunks() {
    let pc = RADec::from_degrees(0.0, 0.0);
    let sky = SkyModel {
        phase_centre: pc,
        sources: (0..10).map(|i| point(i as f64, 0.0, 1.0, pc)).collect(),
    };
    let chunks = sky.clone().into_chunks(4).unwrap();
    assert_eq!(
        chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
        vec![4, 4, 2]
    );
    assert_abs_diff_eq!(chunks[2].sources[1].radec.ra, 9.0_f64.to_radians());
    assert!(matches!(sky.into_chunks(0), Err(SkyError::ZeroChunkSize)));
}

#[test]
fn test_gaussian_coefficients() {
    // A circular Gaussian's envelope is rotationally symmetric.
    let shape = GaussianShape {
        maj: 1e-3,
        min: 1e-3,
        pa: 0.7,
    };
    let [a, b, c] = shape.uv_coefficients();
    assert_abs_diff_eq!(a, c, epsilon = 1e-18);
    assert_abs_diff_eq!(b, 0.0, epsilon = 1e-18);

    // With a position angle of 0, the major axis lies north-south, so the
    // visibility envelope is narrowest along v.
    let shape = GaussianShape {
        maj: 2e-3,
        min: 1e-3,
        pa: 0.0,
    };
    let [a, b, c] = shape.uv_coefficients();
    assert!(c > a);
    assert_abs_diff_eq!(b, 0.0, epsilon = 1e-18);
    // The half-power point of the major axis.
    let sigma = 2e-3 / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt());
    assert_abs_diff_eq!(
        c,
        2.0 * std::f64::consts::PI.powi(2) * sigma * sigma,
        epsilon = 1e-15
    );
}

#[test]
fn test_horizon_clip() {
    // A source at the zenith of the array is visible, and one at the opposite
    // declination near the "nadir" isn't.
    let array = LatLngHeight {
        longitude_rad: 0.0,
        latitude_rad: -30.0_f64.to_radians(),
        height_metres: 0.0,
    };
    let gast = 1.0;
    let lst = gast + array.longitude_rad;
    let pc = RADec::from_radians(lst, array.latitude_rad);
    let chunk = SkyChunk {
        sources: vec![
            point(lst.to_degrees(), -30.0, 1.0, pc),
            point((lst + std::f64::consts::PI).to_degrees(), 30.0, 2.0, pc),
            point(lst.to_degrees(), 0.0, 3.0, pc),
        ],
    };

    let mut local = LocalSky::new(3);
    let n = local.horizon_clip(&chunk, array, gast);
    assert_eq!(n, 2);
    assert_eq!(local.len(), 2);
    let visible = local.sources();
    assert_abs_diff_eq!(visible[0].source.flux_density.i, 1.0);
    assert_abs_diff_eq!(visible[1].source.flux_density.i, 3.0);
    assert_abs_diff_eq!(visible[0].horizon[2], 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(visible[0].hour_angle.cos(), 1.0, epsilon = 1e-10);

    // Clipping again with nothing visible empties the buffer.
    let n = local.horizon_clip(
        &SkyChunk {
            sources: vec![chunk.sources[1]],
        },
        array,
        gast,
    );
    assert_eq!(n, 0);
    assert!(local.is_empty());
    assert!(local.capacity() >= 3);
}

#[test]
fn test_update_positions_keeps_sources() {
    let array = LatLngHeight {
        longitude_rad: 0.5,
        latitude_rad: -30.0_f64.to_radians(),
        height_metres: 0.0,
    };
    let gast = 2.0;
    let lst = gast + array.longitude_rad;
    let pc = RADec::from_radians(lst, array.latitude_rad);
    let chunk = SkyChunk {
        sources: vec![point(lst.to_degrees(), -30.0, 1.0, pc)],
    };
    let mut local = LocalSky::new(1);
    local.horizon_clip(&chunk, array, gast);

    // Half a day later the source is below the horizon, but it's kept.
    local.update_positions(array, gast + std::f64::consts::PI);
    assert_eq!(local.len(), 1);
    let visible = local.sources()[0];
    assert_abs_diff_eq!(visible.hour_angle.abs(), std::f64::consts::PI, epsilon = 1e-10);
    assert!(visible.horizon[2] < 0.0);
}

#[test]
fn test_horizon_frame_east_is_positive_x() {
    // A source on the celestial equator, 6 hours before transit, seen from the
    // equator, is on the eastern horizon.
    let hadec = marlu::HADec::from_radians(-std::f64::consts::FRAC_PI_2, 0.0);
    let [x, y, z] = hadec_to_horizon(hadec, 0.0);
    assert_abs_diff_eq!(x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(z, 0.0, epsilon = 1e-12);
}

#[test]
fn test_read_yaml_sky_model() {
    let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    f.write_all(
        indoc! {r#"
        bright:
        - ra: 10.0
          dec: -27.0
          flux_density:
            freq: 150000000.0
            i: 2.0
          spectral_index: -0.7
        - ra: 11.0
          dec: -28.0
          flux_density:
            freq: 150000000.0
            i: 1.0
            v: 0.5
          gaussian:
            maj: 60.0
            min: 30.0
            pa: 10.0
        "#}
        .as_bytes(),
    )
    .unwrap();
    f.flush().unwrap();

    let pc = RADec::from_degrees(10.0, -27.0);
    let sky = read_sky_model(f.path(), pc).unwrap();
    assert_eq!(sky.len(), 2);
    assert_abs_diff_eq!(sky.sources[0].spectral_index, -0.7);
    assert!(sky.sources[0].gaussian.is_none());
    assert!(sky.sources[1].gaussian.is_some());
    assert_abs_diff_eq!(sky.sources[1].flux_density.v, 0.5);
}

#[test]
fn test_read_json_sky_model_with_bad_dec() {
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(
        br#"{"bad": [{"ra": 10.0, "dec": -100.0, "flux_density": {"freq": 1e8, "i": 1.0}}]}"#,
    )
    .unwrap();
    f.flush().unwrap();

    let result = read_sky_model(f.path(), RADec::from_degrees(0.0, 0.0));
    assert!(matches!(
        result,
        Err(SkyError::InvalidValue { field: "Dec", .. })
    ));
}

#[test]
fn test_read_unknown_extension() {
    let f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let result = read_sky_model(f.path(), RADec::from_degrees(0.0, 0.0));
    assert!(matches!(result, Err(SkyError::UnknownExtension { .. })));
}
