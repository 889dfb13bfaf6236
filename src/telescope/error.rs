// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelescopeError {
    #[error("At least 2 stations are required to form a baseline, but {0} were given")]
    NotEnoughStations(usize),

    #[error("The array latitude ({0}°) is not within -90° to 90°")]
    BadLatitude(f64),

    #[error("Layout file {file} line {line}: couldn't parse '{content}' as east, north and (optionally) up offsets")]
    BadLayoutLine {
        file: PathBuf,
        line: usize,
        content: String,
    },

    #[error(transparent)]
    Beam(#[from] crate::beam::BeamError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
