// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to handle writing out visibilities.

mod error;

pub use error::VisWriteError;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use byteorder::{WriteBytesExt, LE};
use log::{debug, info};

use super::{VisOutputType, FORMAT_VERSION, MAGIC, VIS_OUTPUT_EXTENSIONS};
use crate::{
    jones::{JonesElement, JonesMode, Precision, VisFloat},
    vis::{AnyVisibilities, VisMetadata, Visibilities},
};

/// Something that visibilities can be written to.
pub trait VisWriter {
    fn write(&mut self, vis: &AnyVisibilities) -> Result<(), VisWriteError>;
}

/// Get the output type of a visibility file path from its extension.
pub fn vis_output_type(path: &Path) -> Result<VisOutputType, VisWriteError> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| VisOutputType::from_str(&e.to_lowercase()).ok())
        .ok_or_else(|| VisWriteError::UnknownExtension {
            file: path.to_path_buf(),
            supported: VIS_OUTPUT_EXTENSIONS.clone(),
        })
}

/// Create a writer for each of the output paths.
pub fn create_writers(outputs: &[PathBuf]) -> Result<Vec<Box<dyn VisWriter>>, VisWriteError> {
    outputs
        .iter()
        .map(|path| {
            let writer: Box<dyn VisWriter> = match vis_output_type(path)? {
                VisOutputType::Binary => Box::new(BinaryVisWriter::new(path)),
            };
            Ok(writer)
        })
        .collect()
}

/// Writes the little-endian binary format described in [`crate::io`].
pub struct BinaryVisWriter {
    path: PathBuf,
}

impl BinaryVisWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> BinaryVisWriter {
        BinaryVisWriter {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn write_inner(&self, vis: &AnyVisibilities) -> Result<(), WriteInnerError> {
        let mut w = BufWriter::new(File::create(&self.path)?);
        let vis_type = vis.vis_type();
        w.write_all(MAGIC)?;
        w.write_u32::<LE>(FORMAT_VERSION)?;
        w.write_u8(match vis_type.precision {
            Precision::Single => 0,
            Precision::Double => 1,
        })?;
        w.write_u8(match vis_type.mode {
            JonesMode::Scalar => 0,
            JonesMode::Matrix => 1,
        })?;
        write_metadata(&mut w, vis.metadata())?;

        match vis {
            AnyVisibilities::SingleScalar(v) => write_samples(&mut w, v)?,
            AnyVisibilities::DoubleScalar(v) => write_samples(&mut w, v)?,
            AnyVisibilities::SingleMatrix(v) => write_samples(&mut w, v)?,
            AnyVisibilities::DoubleMatrix(v) => write_samples(&mut w, v)?,
        }
        w.flush()?;
        Ok(())
    }
}

impl VisWriter for BinaryVisWriter {
    fn write(&mut self, vis: &AnyVisibilities) -> Result<(), VisWriteError> {
        debug!("Writing visibilities to {}", self.path.display());
        self.write_inner(vis).map_err(|e| match e {
            WriteInnerError::TooMany { what, count } => VisWriteError::TooMany { what, count },
            WriteInnerError::IO(err) => VisWriteError::IO {
                file: self.path.clone(),
                err,
            },
        })?;
        info!("Visibilities written to {}", self.path.display());
        Ok(())
    }
}

enum WriteInnerError {
    TooMany { what: &'static str, count: usize },
    IO(std::io::Error),
}

impl From<std::io::Error> for WriteInnerError {
    fn from(e: std::io::Error) -> Self {
        WriteInnerError::IO(e)
    }
}

fn to_u32(what: &'static str, count: usize) -> Result<u32, WriteInnerError> {
    u32::try_from(count).map_err(|_| WriteInnerError::TooMany { what, count })
}

fn write_metadata<W: Write>(w: &mut W, m: &VisMetadata) -> Result<(), WriteInnerError> {
    w.write_u32::<LE>(to_u32("channels", m.num_channels())?)?;
    w.write_u32::<LE>(to_u32("times", m.num_times())?)?;
    w.write_u32::<LE>(to_u32("baselines", m.num_baselines())?)?;
    w.write_f64::<LE>(m.phase_centre.ra)?;
    w.write_f64::<LE>(m.phase_centre.dec)?;
    w.write_f64::<LE>(m.array_position.longitude_rad)?;
    w.write_f64::<LE>(m.array_position.latitude_rad)?;
    w.write_f64::<LE>(m.array_position.height_metres)?;
    w.write_f64::<LE>(m.channel_bandwidth_hz)?;
    for &f in &m.freqs_hz {
        w.write_f64::<LE>(f)?;
    }
    w.write_f64::<LE>(m.time_res.to_seconds())?;
    for t in &m.timestamps {
        w.write_f64::<LE>(t.to_mjd_utc_days())?;
    }
    for &(p, q) in &m.baselines {
        w.write_u32::<LE>(to_u32("stations", p)?)?;
        w.write_u32::<LE>(to_u32("stations", q)?)?;
    }
    for uvw in &m.uvws {
        w.write_f64::<LE>(uvw.u)?;
        w.write_f64::<LE>(uvw.v)?;
        w.write_f64::<LE>(uvw.w)?;
    }
    Ok(())
}

fn write_samples<W: Write, E: JonesElement>(
    w: &mut W,
    vis: &Visibilities<E>,
) -> std::io::Result<()> {
    for v in vis.data.iter() {
        for c in v.components() {
            match E::Float::PRECISION {
                Precision::Single => {
                    w.write_f32::<LE>(c.re.to_double() as f32)?;
                    w.write_f32::<LE>(c.im.to_double() as f32)?;
                }
                Precision::Double => {
                    w.write_f64::<LE>(c.re.to_double())?;
                    w.write_f64::<LE>(c.im.to_double())?;
                }
            }
        }
    }
    Ok(())
}
