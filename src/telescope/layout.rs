// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading station layouts from text files.
//!
//! Each non-empty line that doesn't start with '#' holds the east, north and
//! (optionally) up offsets of a station from the array reference position, in
//! metres. Values may be separated by whitespace or commas.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::debug;
use marlu::ENH;

use super::{Station, TelescopeError};

pub fn read_layout_file<P: AsRef<Path>>(
    path: P,
    latitude_rad: f64,
) -> Result<Vec<Station>, TelescopeError> {
    let path = path.as_ref();
    debug!("Reading station layout from {}", path.display());
    let f = BufReader::new(File::open(path)?);

    let mut stations = vec![];
    for (i_line, line) in f.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let bad_line = || TelescopeError::BadLayoutLine {
            file: path.to_path_buf(),
            line: i_line + 1,
            content: line.clone(),
        };
        let values = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad_line())?;
        let enh = match values.as_slice() {
            [e, n] => ENH {
                e: *e,
                n: *n,
                h: 0.0,
            },
            [e, n, h] => ENH {
                e: *e,
                n: *n,
                h: *h,
            },
            _ => return Err(bad_line()),
        };

        stations.push(Station {
            name: format!("station_{:03}", stations.len()),
            xyz: enh.to_xyz(latitude_rad),
            elements: vec![],
            noise_rms_jy: 0.0,
        });
    }

    debug!("Found {} stations", stations.len());
    Ok(stations)
}
