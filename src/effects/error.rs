// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{beam::BeamError, jones::JonesError};

#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Expected values for {expected} stations, but got {got}")]
    NumStations { expected: usize, got: usize },

    #[error(transparent)]
    Jones(#[from] JonesError),

    #[error(transparent)]
    Beam(#[from] BeamError),
}
