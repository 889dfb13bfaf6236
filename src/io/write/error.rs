// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with writing out visibilities.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisWriteError {
    #[error("Cannot write visibilities to '{file}'; supported extensions are: {supported}")]
    UnknownExtension { file: PathBuf, supported: String },

    #[error("Cannot store {count} {what} in a visibility file")]
    TooMany { what: &'static str, count: usize },

    #[error("Error when writing to '{file}': {err}")]
    IO { file: PathBuf, err: std::io::Error },
}
