// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Radio-interferometer visibility simulation.
//!
//! Visibilities are simulated by evaluating the radio interferometer
//! measurement equation directly: for each sky-model source, station beams
//! (E), parallactic-angle rotations (R) and interferometric phases (K) are
//! combined into a Jones matrix per station, and station pairs are
//! correlated against the source's coherency matrix.
//!
//! Start with [`settings::Settings`] to describe a simulation, or build a
//! [`simulate::Simulation`] directly.

pub mod beam;
pub mod cli;
pub mod constants;
pub mod correlate;
pub mod device;
pub mod effects;
pub mod io;
pub mod jones;
pub mod random;
pub mod settings;
pub mod simulate;
pub mod sky;
pub mod telescope;
pub mod time;
pub mod vis;

use crossbeam_utils::atomic::AtomicCell;

lazy_static::lazy_static! {
    /// Are progress bars being drawn? This should only ever be enabled by CLI
    /// code.
    pub(crate) static ref PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
}

// Re-exports.
pub use cli::{RimeSim, RimeSimError};
pub use jones::{Jones, VisType};
pub use settings::Settings;
pub use simulate::{SimulateError, Simulation};
pub use vis::{AnyVisibilities, Visibilities};
