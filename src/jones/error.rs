// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JonesError {
    #[error("Jones field dimensions don't agree: {lhs_stations} stations x {lhs_sources} sources vs. {rhs_stations} stations x {rhs_sources} sources")]
    DimensionMismatch {
        lhs_stations: usize,
        lhs_sources: usize,
        rhs_stations: usize,
        rhs_sources: usize,
    },

    #[error("Tried to use {requested} sources in a Jones field with a capacity of {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Expected a buffer of {expected} elements, but it has {got}")]
    BufferLength { expected: usize, got: usize },

    #[error("Expected {expected} visibilities but got {got}")]
    TypeMismatch { expected: String, got: String },
}
