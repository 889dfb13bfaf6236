// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write};

use approx::assert_abs_diff_eq;
use hifitime::{Duration, Epoch};
use marlu::{LatLngHeight, RADec, UVW};
use ndarray::prelude::*;
use num_complex::Complex;
use tempfile::tempdir;

use super::{
    read::{read_binary_vis, VisReadError},
    write::{create_writers, vis_output_type, BinaryVisWriter, VisWriteError, VisWriter},
    VisOutputType,
};
use crate::{
    jones::Jones,
    vis::{VisElement, VisMetadata, Visibilities},
};

fn metadata() -> VisMetadata {
    let time_res = Duration::from_seconds(8.0);
    let start = Epoch::from_mjd_utc(59000.25);
    let baselines = vec![(0, 1), (0, 2), (1, 2)];
    let mut uvws = Array2::from_elem((2, 3), UVW::default());
    for (i, uvw) in uvws.iter_mut().enumerate() {
        uvw.u = i as f64;
        uvw.v = -(i as f64) * 2.0;
        uvw.w = 0.5;
    }
    VisMetadata {
        phase_centre: RADec::from_degrees(45.0, -26.7),
        array_position: LatLngHeight {
            longitude_rad: 2.0,
            latitude_rad: -0.47,
            height_metres: 377.0,
        },
        freqs_hz: vec![150e6, 151e6, 152e6, 153e6],
        channel_bandwidth_hz: 1e6,
        timestamps: vec![start + time_res * 0.5, start + time_res * 1.5],
        time_res,
        baselines,
        uvws,
    }
}

#[test]
fn test_matrix_double_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.vis");

    let mut vis = Visibilities::<Jones<f64>>::new(metadata());
    for (i, v) in vis.data.iter_mut().enumerate() {
        let i = i as f64;
        *v = Jones::from([
            Complex::new(i, -i),
            Complex::new(0.1 * i, 0.0),
            Complex::new(0.0, 0.2 * i),
            Complex::new(-i, 1.0 / (i + 1.0)),
        ]);
    }
    let expected = vis.clone();
    BinaryVisWriter::new(&path)
        .write(&Jones::<f64>::into_any(vis))
        .unwrap();

    let read = read_binary_vis(&path)
        .unwrap()
        .downcast::<Jones<f64>>()
        .unwrap();
    assert_eq!(read.data, expected.data);
    let (m, e) = (&read.metadata, &expected.metadata);
    assert_eq!(m.freqs_hz, e.freqs_hz);
    assert_eq!(m.baselines, e.baselines);
    assert_abs_diff_eq!(m.phase_centre.ra, e.phase_centre.ra);
    assert_abs_diff_eq!(m.phase_centre.dec, e.phase_centre.dec);
    assert_abs_diff_eq!(m.array_position.height_metres, 377.0);
    assert_abs_diff_eq!(m.time_res.to_seconds(), 8.0);
    for (t1, t2) in m.timestamps.iter().zip(&e.timestamps) {
        assert_abs_diff_eq!(t1.to_mjd_utc_days(), t2.to_mjd_utc_days(), epsilon = 1e-9);
    }
    for (uvw1, uvw2) in m.uvws.iter().zip(&e.uvws) {
        assert_eq!(uvw1.u, uvw2.u);
        assert_eq!(uvw1.v, uvw2.v);
        assert_eq!(uvw1.w, uvw2.w);
    }
}

#[test]
fn test_scalar_single_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scalar.vis");

    let mut vis = Visibilities::<Complex<f32>>::new(metadata());
    vis.data[(3, 1, 2)] = Complex::new(1.5, -0.25);
    let expected = vis.data.clone();
    let mut writers = create_writers(&[path.clone()]).unwrap();
    for w in writers.iter_mut() {
        w.write(&Complex::<f32>::into_any(vis.clone())).unwrap();
    }

    let read = read_binary_vis(&path).unwrap();
    assert_eq!(read.vis_type(), vis_type_single_scalar());
    let read = read.downcast::<Complex<f32>>().unwrap();
    assert_eq!(read.data, expected);

    // 8 (magic) + 4 (version) + 2 (type) + 12 (dims) + 6 * 8 (positions,
    // bandwidth) + 4 * 8 (freqs) + 8 (time res) + 2 * 8 (times) + 3 * 8
    // (baselines) + 6 * 24 (uvws) + 4 * 2 * 3 * 8 (samples).
    let size = std::fs::metadata(&path).unwrap().len();
    assert_eq!(size, 8 + 4 + 2 + 12 + 48 + 32 + 8 + 16 + 24 + 144 + 192);
}

fn vis_type_single_scalar() -> crate::jones::VisType {
    crate::jones::VisType::new(false, true)
}

#[test]
fn test_bad_magic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.vis");
    let mut f = File::create(&path).unwrap();
    f.write_all(b"NOTAVIS\0\x01\0\0\0").unwrap();
    drop(f);
    assert!(matches!(
        read_binary_vis(&path),
        Err(VisReadError::BadMagic(_))
    ));
}

#[test]
fn test_truncated_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("truncated.vis");
    let mut f = File::create(&path).unwrap();
    f.write_all(super::MAGIC).unwrap();
    drop(f);
    assert!(matches!(
        read_binary_vis(&path),
        Err(VisReadError::IO { .. })
    ));
}

#[test]
fn test_header_larger_than_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("huge.vis");
    let mut f = File::create(&path).unwrap();
    f.write_all(super::MAGIC).unwrap();
    f.write_all(&super::FORMAT_VERSION.to_le_bytes()).unwrap();
    f.write_all(&[1, 1]).unwrap();
    for _ in 0..3 {
        f.write_all(&u32::MAX.to_le_bytes()).unwrap();
    }
    f.write_all(&[0; 64]).unwrap();
    drop(f);

    let result = read_binary_vis(&path);
    assert!(
        matches!(
            result,
            Err(VisReadError::SizeMismatch {
                expected: None,
                actual: 90,
                ..
            })
        ),
        "{result:?}"
    );
}

#[test]
fn test_missing_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.vis");
    BinaryVisWriter::new(&path)
        .write(&Complex::<f64>::into_any(Visibilities::new(metadata())))
        .unwrap();
    let len = std::fs::metadata(&path).unwrap().len();
    let f = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    f.set_len(len - 16).unwrap();
    drop(f);

    let result = read_binary_vis(&path);
    assert!(
        matches!(
            result,
            Err(VisReadError::SizeMismatch {
                num_chans: 4,
                num_times: 2,
                num_baselines: 3,
                expected: Some(e),
                actual: a,
                ..
            }) if e == len && a == len - 16
        ),
        "{result:?}"
    );
}

#[test]
fn test_output_types() {
    assert_eq!(
        vis_output_type("foo.vis".as_ref()).unwrap(),
        VisOutputType::Binary
    );
    assert_eq!(
        vis_output_type("FOO.VIS".as_ref()).unwrap(),
        VisOutputType::Binary
    );
    assert!(matches!(
        vis_output_type("foo.ms".as_ref()),
        Err(VisWriteError::UnknownExtension { .. })
    ));
    assert!(create_writers(&["foo.uvfits".into()]).is_err());
}
