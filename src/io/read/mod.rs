// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read visibility files back in.

mod error;

pub use error::VisReadError;

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use byteorder::{ReadBytesExt, LE};
use hifitime::{Duration, Epoch};
use log::debug;
use marlu::{LatLngHeight, RADec, UVW};
use ndarray::prelude::*;
use num_complex::Complex;

use super::{FORMAT_VERSION, MAGIC};
use crate::{
    jones::{Jones, Precision, VisFloat},
    vis::{AnyVisibilities, VisElement, VisMetadata, Visibilities},
};

/// Read a visibility file written by [`super::write::BinaryVisWriter`].
pub fn read_binary_vis<P: AsRef<Path>>(path: P) -> Result<AnyVisibilities, VisReadError> {
    fn inner(path: &Path) -> Result<AnyVisibilities, VisReadError> {
        debug!("Reading visibilities from {}", path.display());
        let io_err = |err| VisReadError::IO {
            file: path.to_path_buf(),
            err,
        };
        let f = File::open(path).map_err(io_err)?;
        let file_len = f.metadata().map_err(io_err)?.len();
        let mut r = BufReader::new(f);

        let mut magic = [0; 8];
        r.read_exact(&mut magic).map_err(io_err)?;
        if &magic != MAGIC {
            return Err(VisReadError::BadMagic(path.to_path_buf()));
        }
        let version = r.read_u32::<LE>().map_err(io_err)?;
        if version != FORMAT_VERSION {
            return Err(VisReadError::UnsupportedVersion {
                file: path.to_path_buf(),
                version,
                supported: FORMAT_VERSION,
            });
        }
        let precision = r.read_u8().map_err(io_err)?;
        let mode = r.read_u8().map_err(io_err)?;
        let bad_header = |field, value| VisReadError::BadHeader {
            file: path.to_path_buf(),
            field,
            value,
        };
        let double = match precision {
            0 => false,
            1 => true,
            v => return Err(bad_header("precision", v)),
        };
        let matrix = match mode {
            0 => false,
            1 => true,
            v => return Err(bad_header("mode", v)),
        };

        let dims = Dims {
            num_chans: r.read_u32::<LE>().map_err(io_err)?,
            num_times: r.read_u32::<LE>().map_err(io_err)?,
            num_baselines: r.read_u32::<LE>().map_err(io_err)?,
        };
        // Nothing is allocated until the header is known to describe this
        // file.
        let expected_len = dims.file_len(double, matrix);
        if expected_len != Some(file_len) {
            return Err(VisReadError::SizeMismatch {
                file: path.to_path_buf(),
                num_chans: dims.num_chans,
                num_times: dims.num_times,
                num_baselines: dims.num_baselines,
                expected: expected_len,
                actual: file_len,
            });
        }

        let metadata = read_metadata(&mut r, dims).map_err(io_err)?;
        let vis = match (double, matrix) {
            (false, false) => read_samples::<_, Complex<f32>>(&mut r, metadata),
            (true, false) => read_samples::<_, Complex<f64>>(&mut r, metadata),
            (false, true) => read_samples::<_, Jones<f32>>(&mut r, metadata),
            (true, true) => read_samples::<_, Jones<f64>>(&mut r, metadata),
        }
        .map_err(io_err)?;
        Ok(vis)
    }
    inner(path.as_ref())
}

/// The dimensions of the visibilities in a file.
#[derive(Debug, Clone, Copy)]
struct Dims {
    num_chans: u32,
    num_times: u32,
    num_baselines: u32,
}

impl Dims {
    /// The length of a file with these dimensions \[bytes\], or `None` if it
    /// can't be represented.
    fn file_len(self, double: bool, matrix: bool) -> Option<u64> {
        let chans = u64::from(self.num_chans);
        let times = u64::from(self.num_times);
        let baselines = u64::from(self.num_baselines);
        let float_size: u64 = if double { 8 } else { 4 };
        let num_components: u64 = if matrix { 4 } else { 1 };

        // Magic, version, precision, mode and dimensions, then the phase
        // centre, array position, channel bandwidth and time resolution.
        let fixed: u64 = 8 + 4 + 1 + 1 + 3 * 4 + 7 * 8;
        let freqs = chans.checked_mul(8)?;
        let timestamps = times.checked_mul(8)?;
        let pairs = baselines.checked_mul(8)?;
        let uvws = times.checked_mul(baselines)?.checked_mul(24)?;
        let samples = chans
            .checked_mul(times)?
            .checked_mul(baselines)?
            .checked_mul(num_components * 2 * float_size)?;
        fixed
            .checked_add(freqs)?
            .checked_add(timestamps)?
            .checked_add(pairs)?
            .checked_add(uvws)?
            .checked_add(samples)
    }
}

fn read_metadata<R: Read>(r: &mut R, dims: Dims) -> std::io::Result<VisMetadata> {
    let num_chans = dims.num_chans as usize;
    let num_times = dims.num_times as usize;
    let num_baselines = dims.num_baselines as usize;
    let phase_centre = RADec::from_radians(r.read_f64::<LE>()?, r.read_f64::<LE>()?);
    let array_position = LatLngHeight {
        longitude_rad: r.read_f64::<LE>()?,
        latitude_rad: r.read_f64::<LE>()?,
        height_metres: r.read_f64::<LE>()?,
    };
    let channel_bandwidth_hz = r.read_f64::<LE>()?;
    let freqs_hz = (0..num_chans)
        .map(|_| r.read_f64::<LE>())
        .collect::<Result<Vec<_>, _>>()?;
    let time_res = Duration::from_seconds(r.read_f64::<LE>()?);
    let timestamps = (0..num_times)
        .map(|_| r.read_f64::<LE>().map(Epoch::from_mjd_utc))
        .collect::<Result<Vec<_>, _>>()?;
    let baselines = (0..num_baselines)
        .map(|_| Ok((r.read_u32::<LE>()? as usize, r.read_u32::<LE>()? as usize)))
        .collect::<std::io::Result<Vec<_>>>()?;
    let mut uvws = Array2::from_elem((num_times, num_baselines), UVW::default());
    for uvw in uvws.iter_mut() {
        uvw.u = r.read_f64::<LE>()?;
        uvw.v = r.read_f64::<LE>()?;
        uvw.w = r.read_f64::<LE>()?;
    }

    Ok(VisMetadata {
        phase_centre,
        array_position,
        freqs_hz,
        channel_bandwidth_hz,
        timestamps,
        time_res,
        baselines,
        uvws,
    })
}

fn read_samples<R: Read, E: VisElement>(
    r: &mut R,
    metadata: VisMetadata,
) -> std::io::Result<AnyVisibilities> {
    let mut vis = Visibilities::<E>::new(metadata);
    for v in vis.data.iter_mut() {
        for c in v.components_mut() {
            let (re, im) = match E::Float::PRECISION {
                Precision::Single => (r.read_f32::<LE>()? as f64, r.read_f32::<LE>()? as f64),
                Precision::Double => (r.read_f64::<LE>()?, r.read_f64::<LE>()?),
            };
            c.re = E::Float::from_double(re);
            c.im = E::Float::from_double(im);
        }
    }
    Ok(E::into_any(vis))
}
