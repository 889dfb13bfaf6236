// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing visibility files.
//!
//! The only format is a self-describing little-endian binary file:
//!
//! | Field                      | Type                                   |
//! |----------------------------|----------------------------------------|
//! | magic                      | 8 bytes, `RIMEVIS\0`                   |
//! | format version             | u32                                    |
//! | precision                  | u8 (0 = single, 1 = double)            |
//! | mode                       | u8 (0 = scalar, 1 = matrix)            |
//! | channels, times, baselines | 3 × u32                                |
//! | phase centre RA, Dec       | 2 × f64 \[radians\]                      |
//! | array lon, lat, height     | 3 × f64 \[radians, radians, metres\]     |
//! | channel bandwidth          | f64 \[Hz\]                               |
//! | channel frequencies        | channels × f64 \[Hz\]                    |
//! | time resolution            | f64 \[seconds\]                          |
//! | time centres               | times × f64 \[UTC MJD\]                  |
//! | baseline station pairs     | baselines × 2 × u32                    |
//! | baseline UVWs              | times × baselines × 3 × f64 \[metres\]   |
//! | samples                    | see below                              |
//!
//! Samples are ordered (channel, time, baseline). Each sample is 1 (scalar)
//! or 4 (matrix, XX XY YX YY) complex numbers, each written as real then
//! imaginary in the file's precision.

pub mod read;
#[cfg(test)]
mod tests;
pub mod write;

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

pub(crate) const MAGIC: &[u8; 8] = b"RIMEVIS\0";
pub(crate) const FORMAT_VERSION: u32 = 1;

/// All supported visibility file formats.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum VisOutputType {
    #[strum(serialize = "vis")]
    Binary,
}

lazy_static::lazy_static! {
    pub static ref VIS_OUTPUT_EXTENSIONS: String = VisOutputType::iter().join(", ");
}
