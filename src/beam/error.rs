// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam calculations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("The Gaussian beam FWHM must be positive, but got {0}°")]
    BadFwhm(f64),

    #[error("The Gaussian beam reference frequency must be positive, but got {0} Hz")]
    BadRefFreq(f64),

    #[error("Element error standard deviations cannot be negative, but got {0}")]
    BadErrorStd(f64),

    #[error("Tried to calculate beam responses for {directions} directions, but there is room for {results} results")]
    DimensionMismatch { directions: usize, results: usize },
}
