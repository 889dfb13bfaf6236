// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkyError {
    #[error("The maximum number of sources per chunk cannot be 0")]
    ZeroChunkSize,

    #[error("Sky-model file {0} doesn't exist")]
    FileDoesntExist(PathBuf),

    #[error("Sky-model file {file} has an unrecognised extension; supported extensions: {supported}")]
    UnknownExtension { file: PathBuf, supported: String },

    #[error("Source '{name}' has an invalid {field}: {value}")]
    InvalidValue {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("Couldn't parse yaml sky model: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Couldn't parse json sky model: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
