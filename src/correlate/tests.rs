// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use marlu::{LatLngHeight, RADec, XyzGeodetic, UVW};
use num_complex::Complex;

use super::*;
use crate::{
    beam::BeamModel,
    effects::station_uvw,
    jones::Jones,
    sky::{FluxDensity, GaussianShape, SkyChunk, Source},
    telescope::Station,
};

fn telescope() -> Telescope {
    let station = |x: f64, y: f64| Station {
        name: String::new(),
        xyz: XyzGeodetic { x, y, z: 0.0 },
        elements: vec![],
        noise_rms_jy: 0.0,
    };
    Telescope {
        array_position: LatLngHeight {
            longitude_rad: 0.0,
            latitude_rad: -0.5,
            height_metres: 0.0,
        },
        stations: vec![
            station(0.0, 0.0),
            station(300.0, 0.0),
            station(0.0, 500.0),
            station(-200.0, 120.0),
        ],
        phase_centre: RADec::from_degrees(0.0, -30.0),
        beam: BeamModel::None,
        seed: 1,
        normalise_beams_at_phase_centre: false,
    }
}

/// The visible sources of `sources` at a GAST of 0.
fn local_sky(tel: &Telescope, sources: Vec<Source>) -> LocalSky {
    let chunk = SkyChunk { sources };
    let mut sky = LocalSky::new(chunk.len());
    let n = sky.horizon_clip(&chunk, tel.array_position, 0.0);
    assert_eq!(n, chunk.len());
    sky
}

fn point(tel: &Telescope, radec: RADec, i: f64) -> Source {
    let fd = FluxDensity {
        freq: 150e6,
        i,
        ..Default::default()
    };
    Source::new(radec, fd, 0.0, 0.0, None, tel.phase_centre)
}

fn uvws(tel: &Telescope) -> Vec<UVW> {
    let mut uvws = vec![UVW::default(); tel.num_stations()];
    station_uvw(tel, 0.0, &mut uvws).unwrap();
    uvws
}

/// A Jones field of identities for `num_sources` sources.
fn identity_field<E: JonesElement>(tel: &Telescope, num_sources: usize) -> JonesField<E> {
    let mut j = JonesField::new(tel.num_stations(), num_sources);
    j.set_num_sources(num_sources).unwrap();
    j.fill(E::identity());
    j
}

#[test]
fn test_no_sources_is_a_no_op() {
    let tel = telescope();
    let correlator = Correlator::new(&tel, CorrelatorSettings::default());
    let sky = local_sky(&tel, vec![]);
    let j = identity_field::<Jones<f64>>(&tel, 0);
    let existing = Jones::identity() * 3.0;
    let mut vis = vec![existing; correlator.num_baselines()];
    correlator
        .correlate(&mut vis, &sky, &j, &uvws(&tel), 150e6, 0.0)
        .unwrap();
    for v in vis {
        assert_eq!(v, existing);
    }
}

#[test]
fn test_point_source_at_phase_centre() {
    let tel = telescope();
    let correlator = Correlator::new(&tel, CorrelatorSettings::default());
    let sky = local_sky(&tel, vec![point(&tel, tel.phase_centre, 2.5)]);
    let uvws = uvws(&tel);
    assert_eq!(correlator.num_baselines(), 6);

    // Scalar mode gives Stokes I.
    let j = identity_field::<Complex<f64>>(&tel, 1);
    let mut vis = vec![Complex::default(); 6];
    correlator.correlate(&mut vis, &sky, &j, &uvws, 150e6, 0.0).unwrap();
    for v in &vis {
        assert_abs_diff_eq!(*v, Complex::new(2.5, 0.0), epsilon = 1e-12);
    }

    // Matrix mode gives diag(I, I).
    let j = identity_field::<Jones<f64>>(&tel, 1);
    let mut vis = vec![Jones::default(); 6];
    correlator.correlate(&mut vis, &sky, &j, &uvws, 150e6, 0.0).unwrap();
    for v in &vis {
        assert_abs_diff_eq!(
            *v,
            Jones::diagonal(Complex::new(2.5, 0.0)),
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_single_precision_accumulates() {
    let tel = telescope();
    let correlator = Correlator::new(&tel, CorrelatorSettings::default());
    let sky = local_sky(&tel, vec![point(&tel, tel.phase_centre, 1.0)]);
    let j = identity_field::<Complex<f32>>(&tel, 1);
    let mut vis = vec![Complex::new(1.0_f32, 0.0); 6];
    correlator
        .correlate(&mut vis, &sky, &j, &uvws(&tel), 150e6, 0.0)
        .unwrap();
    for v in &vis {
        assert_abs_diff_eq!(*v, Complex::new(2.0_f32, 0.0));
    }
}

#[test]
fn test_polarised_brightness() {
    let tel = telescope();
    let correlator = Correlator::new(&tel, CorrelatorSettings::default());
    let mut src = point(&tel, tel.phase_centre, 1.0);
    src.flux_density.q = 0.2;
    src.flux_density.u = -0.1;
    src.flux_density.v = 0.05;
    let sky = local_sky(&tel, vec![src]);
    let j = identity_field::<Jones<f64>>(&tel, 1);
    let mut vis = vec![Jones::default(); 6];
    correlator
        .correlate(&mut vis, &sky, &j, &uvws(&tel), 150e6, 0.0)
        .unwrap();
    let expected = Jones::from([
        Complex::new(1.2, 0.0),
        Complex::new(-0.1, 0.05),
        Complex::new(-0.1, -0.05),
        Complex::new(0.8, 0.0),
    ]);
    assert_abs_diff_eq!(vis[0], expected, epsilon = 1e-12);
}

#[test]
fn test_uv_range_filter() {
    let tel = telescope();
    let freq = 150e6;
    let uvws = uvws(&tel);
    let correlator = Correlator::new(
        &tel,
        CorrelatorSettings {
            uv_min_lambda: 200.0,
            ..Default::default()
        },
    );
    let sky = local_sky(&tel, vec![point(&tel, tel.phase_centre, 1.0)]);
    let j = identity_field::<Complex<f64>>(&tel, 1);
    let mut vis = vec![Complex::default(); 6];
    correlator.correlate(&mut vis, &sky, &j, &uvws, freq, 0.0).unwrap();

    for (v, &(p, q)) in vis.iter().zip(correlator.baselines()) {
        let u = (uvws[p].u - uvws[q].u) * freq / VEL_C;
        let vv = (uvws[p].v - uvws[q].v) * freq / VEL_C;
        if (u * u + vv * vv).sqrt() < 200.0 {
            assert_abs_diff_eq!(*v, Complex::default());
        } else {
            assert_abs_diff_eq!(*v, Complex::new(1.0, 0.0), epsilon = 1e-12);
        }
    }
    // At 150 MHz, the first baseline is 75 wavelengths long in projection.
    assert_abs_diff_eq!(vis[0], Complex::default());
    // The 500 m east-west baseline is 250 wavelengths long.
    assert_abs_diff_eq!(vis[1], Complex::new(1.0, 0.0), epsilon = 1e-12);
}

#[test]
fn test_bandwidth_smearing_reduces_amplitude() {
    let tel = telescope();
    let uvws = uvws(&tel);
    let sky = local_sky(&tel, vec![point(&tel, RADec::from_degrees(3.0, -32.0), 1.0)]);
    let j = identity_field::<Complex<f64>>(&tel, 1);

    let mut unsmeared = vec![Complex::default(); 6];
    Correlator::new(&tel, CorrelatorSettings::default())
        .correlate(&mut unsmeared, &sky, &j, &uvws, 150e6, 0.0)
        .unwrap();
    let mut smeared = vec![Complex::default(); 6];
    Correlator::new(
        &tel,
        CorrelatorSettings {
            channel_bandwidth_hz: 1e6,
            ..Default::default()
        },
    )
    .correlate(&mut smeared, &sky, &j, &uvws, 150e6, 0.0)
    .unwrap();

    for (s, u) in smeared.iter().zip(&unsmeared) {
        assert_abs_diff_eq!(u.norm(), 1.0, epsilon = 1e-12);
        assert!(s.norm() < u.norm());
        // Smearing doesn't change the phase.
        assert_abs_diff_eq!(s.arg(), u.arg(), epsilon = 1e-9);
    }
}

#[test]
fn test_time_smearing() {
    let tel = telescope();
    let uvws = uvws(&tel);
    let offset = point(&tel, RADec::from_degrees(3.0, -32.0), 1.0);
    let lmn = offset.lmn;
    let sky = local_sky(&tel, vec![point(&tel, tel.phase_centre, 1.0), offset]);
    let j = identity_field::<Complex<f64>>(&tel, 2);
    let settings = CorrelatorSettings {
        time_average_sec: 600.0,
        ..Default::default()
    };

    let mut unsmeared = vec![Complex::default(); 6];
    Correlator::new(&tel, CorrelatorSettings::default())
        .correlate(&mut unsmeared, &sky, &j, &uvws, 150e6, 0.0)
        .unwrap();
    let mut smeared = vec![Complex::default(); 6];
    Correlator::new(&tel, settings)
        .correlate(&mut smeared, &sky, &j, &uvws, 150e6, 0.0)
        .unwrap();
    assert_abs_diff_eq!(unsmeared[0], Complex::new(2.0, 0.0), epsilon = 1e-12);
    assert!(smeared[0].norm() < unsmeared[0].norm());

    // The first baseline is 300 m along x. With the phase centre on the
    // meridian, only u changes with time.
    let rate = -300.0 * PI * 150e6 / VEL_C * 600.0 * EARTH_ROTATION_RATE;
    let k = unsmeared[0] - Complex::new(1.0, 0.0);
    let expected = Complex::new(1.0, 0.0) + k * sinc(rate * lmn.l);
    assert_abs_diff_eq!(smeared[0], expected, epsilon = 1e-12);

    // A source at the phase centre isn't smeared.
    let sky = local_sky(&tel, vec![point(&tel, tel.phase_centre, 1.0)]);
    let j = identity_field::<Complex<f64>>(&tel, 1);
    let mut vis = vec![Complex::default(); 6];
    Correlator::new(&tel, settings)
        .correlate(&mut vis, &sky, &j, &uvws, 150e6, 0.7)
        .unwrap();
    for v in vis {
        assert_abs_diff_eq!(v, Complex::new(1.0, 0.0), epsilon = 1e-12);
    }
}

#[test]
fn test_gaussian_envelope() {
    let tel = telescope();
    let uvws = uvws(&tel);
    let shape = GaussianShape {
        maj: 2.0_f64.to_radians() / 60.0,
        min: 1.0_f64.to_radians() / 60.0,
        pa: 0.3,
    };
    let mut src = point(&tel, tel.phase_centre, 1.0);
    src.gaussian = Some(shape.uv_coefficients());
    let sky = local_sky(&tel, vec![src]);
    let j = identity_field::<Complex<f64>>(&tel, 1);
    let mut vis = vec![Complex::default(); 6];
    let correlator = Correlator::new(&tel, CorrelatorSettings::default());
    correlator.correlate(&mut vis, &sky, &j, &uvws, 150e6, 0.0).unwrap();

    let [a, b, c] = shape.uv_coefficients();
    for (v, &(p, q)) in vis.iter().zip(correlator.baselines()) {
        let u = (uvws[p].u - uvws[q].u) * 150e6 / VEL_C;
        let vv = (uvws[p].v - uvws[q].v) * 150e6 / VEL_C;
        let expected = (-(a * u * u + b * u * vv + c * vv * vv)).exp();
        assert!(expected < 1.0);
        assert_abs_diff_eq!(*v, Complex::new(expected, 0.0), epsilon = 1e-12);
    }
}

#[test]
fn test_bad_dimensions() {
    let tel = telescope();
    let correlator = Correlator::new(&tel, CorrelatorSettings::default());
    let sky = local_sky(&tel, vec![point(&tel, tel.phase_centre, 1.0)]);
    let j = identity_field::<Complex<f64>>(&tel, 1);

    let mut vis = vec![Complex::default(); 5];
    let result = correlator.correlate(&mut vis, &sky, &j, &uvws(&tel), 150e6, 0.0);
    assert_eq!(
        result,
        Err(JonesError::BufferLength {
            expected: 6,
            got: 5
        })
    );

    let j = identity_field::<Complex<f64>>(&tel, 2);
    let mut vis = vec![Complex::default(); 6];
    let result = correlator.correlate(&mut vis, &sky, &j, &uvws(&tel), 150e6, 0.0);
    assert!(matches!(result, Err(JonesError::DimensionMismatch { .. })));
}

#[test]
fn test_normalise_snapshot() {
    // Summing a constant correlation over every sub-sample and normalising
    // gives back the constant.
    let constant = Jones::from([
        Complex::new(1.0, 2.0),
        Complex::new(0.5, 0.0),
        Complex::new(0.5, 0.0),
        Complex::new(-1.0, 0.25),
    ]);
    let (num_vis_ave, num_fringe_ave) = (3, 4);
    let mut vis = vec![Jones::<f64>::default(); 2];
    for _ in 0..num_vis_ave * num_fringe_ave {
        for v in vis.iter_mut() {
            *v += constant;
        }
    }
    normalise_snapshot(&mut vis, num_vis_ave, num_fringe_ave);
    for v in vis {
        assert_abs_diff_eq!(v, constant, epsilon = 1e-14);
    }
}
