// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulateError {
    #[error("No output visibility files were specified")]
    NoOutput,

    #[error("The worker thread '{0}' panicked")]
    WorkerPanicked(String),

    #[error("Couldn't generate noise: {0}")]
    Noise(#[from] rand_distr::NormalError),

    #[error(transparent)]
    Device(#[from] crate::device::DeviceError),

    #[error(transparent)]
    Beam(#[from] crate::beam::BeamError),

    #[error(transparent)]
    Effect(#[from] crate::effects::EffectError),

    #[error(transparent)]
    Jones(#[from] crate::jones::JonesError),

    #[error(transparent)]
    VisWrite(#[from] crate::io::write::VisWriteError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
