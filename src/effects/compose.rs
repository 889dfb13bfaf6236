// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Joining Jones terms together.
//!
//! In matrix mode the chain for each station and source is `J = K · R · E`;
//! `R · E` is formed once per Jones-averaging step and K is applied at every
//! fringe-averaging step. In scalar mode it is `J = K · E`. An ionospheric
//! term Z would be joined into E (`E ← Z · E`) before R; it is not
//! simulated.

use num_complex::Complex;

use crate::jones::{JonesElement, JonesError, JonesField};

/// `lhs ← lhs · rhs` for every station and source.
pub fn join_in_place<E: JonesElement>(
    lhs: &mut JonesField<E>,
    rhs: &JonesField<E>,
) -> Result<(), JonesError> {
    lhs.join_in_place(rhs)
}

/// `j ← k · x`. `k` is always a field of complex scalars, so it scales every
/// component of `x`.
pub fn compose<E: JonesElement>(
    j: &mut JonesField<E>,
    k: &JonesField<Complex<E::Float>>,
    x: &JonesField<E>,
) -> Result<(), JonesError> {
    j.assign_scaled(k, x)
}
