// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisReadError {
    #[error("'{0}' is not a visibility file (bad magic bytes)")]
    BadMagic(PathBuf),

    #[error("'{file}' has format version {version}, but only version {supported} is supported")]
    UnsupportedVersion {
        file: PathBuf,
        version: u32,
        supported: u32,
    },

    #[error("'{file}' has an invalid {field} value: {value}")]
    BadHeader {
        file: PathBuf,
        field: &'static str,
        value: u8,
    },

    #[error("'{file}' is {actual} bytes long, which doesn't match its header ({num_chans} channels, {num_times} times, {num_baselines} baselines)")]
    SizeMismatch {
        file: PathBuf,
        num_chans: u32,
        num_times: u32,
        num_baselines: u32,
        expected: Option<u64>,
        actual: u64,
    },

    #[error("Error when reading '{file}': {err}")]
    IO { file: PathBuf, err: std::io::Error },
}
