// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use num_complex::Complex;

use super::{JonesElement, JonesError};

/// A dense (station, source) array of Jones elements.
///
/// Each station's row has room for `capacity` sources, but only the first
/// `num_sources` of them are "active". The capacity only changes with
/// [`JonesField::ensure_capacity`], so the field can be reused for chunks of
/// any size without reallocating. Row accessors only ever expose the active
/// prefix; data beyond it may be stale.
#[derive(Debug, Clone)]
pub struct JonesField<E> {
    data: Vec<E>,
    num_stations: usize,
    capacity: usize,
    num_sources: usize,
}

impl<E: Copy + Default> JonesField<E> {
    pub fn new(num_stations: usize, capacity: usize) -> JonesField<E> {
        // A zero stride would make the row iterators misbehave.
        let capacity = capacity.max(1);
        JonesField {
            data: vec![E::default(); num_stations * capacity],
            num_stations,
            capacity,
            num_sources: 0,
        }
    }

    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raise the capacity of this field to at least `capacity` sources. The
    /// contents of the field are not preserved if a reallocation happens.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.capacity {
            self.capacity = capacity;
            self.data = vec![E::default(); self.num_stations * capacity];
            self.num_sources = 0;
        }
    }

    /// Set the number of active sources.
    pub fn set_num_sources(&mut self, num_sources: usize) -> Result<(), JonesError> {
        if num_sources > self.capacity {
            return Err(JonesError::CapacityExceeded {
                requested: num_sources,
                capacity: self.capacity,
            });
        }
        self.num_sources = num_sources;
        Ok(())
    }

    /// The active sources of a station.
    pub fn station(&self, i_station: usize) -> &[E] {
        let start = i_station * self.capacity;
        &self.data[start..start + self.num_sources]
    }

    pub fn station_mut(&mut self, i_station: usize) -> &mut [E] {
        let start = i_station * self.capacity;
        &mut self.data[start..start + self.num_sources]
    }

    /// Iterate over the active sources of each station.
    pub fn stations(&self) -> impl Iterator<Item = &[E]> {
        let n = self.num_sources;
        self.data.chunks_exact(self.capacity).map(move |row| &row[..n])
    }

    pub fn stations_mut(&mut self) -> impl Iterator<Item = &mut [E]> {
        let n = self.num_sources;
        self.data
            .chunks_exact_mut(self.capacity)
            .map(move |row| &mut row[..n])
    }

    /// Set every active element to `value`.
    pub fn fill(&mut self, value: E) {
        for row in self.stations_mut() {
            row.fill(value);
        }
    }

    /// Are the (station, source) dimensions of these fields the same?
    pub fn check_dims<E2: Copy + Default>(&self, other: &JonesField<E2>) -> Result<(), JonesError> {
        if self.num_stations != other.num_stations || self.num_sources != other.num_sources {
            return Err(JonesError::DimensionMismatch {
                lhs_stations: self.num_stations,
                lhs_sources: self.num_sources,
                rhs_stations: other.num_stations,
                rhs_sources: other.num_sources,
            });
        }
        Ok(())
    }
}

impl<E: JonesElement> JonesField<E> {
    /// `self ← self · rhs`, element by element.
    pub fn join_in_place(&mut self, rhs: &JonesField<E>) -> Result<(), JonesError> {
        self.check_dims(rhs)?;
        for (lhs_row, rhs_row) in self.stations_mut().zip(rhs.stations()) {
            for (l, r) in lhs_row.iter_mut().zip(rhs_row) {
                *l = l.join(*r);
            }
        }
        Ok(())
    }

    /// `self ← k · x`, where `k` is a field of complex scalars.
    pub fn assign_scaled(
        &mut self,
        k: &JonesField<Complex<E::Float>>,
        x: &JonesField<E>,
    ) -> Result<(), JonesError> {
        k.check_dims(x)?;
        if self.capacity < x.num_sources || self.num_stations != x.num_stations {
            return Err(JonesError::DimensionMismatch {
                lhs_stations: self.num_stations,
                lhs_sources: self.capacity,
                rhs_stations: x.num_stations,
                rhs_sources: x.num_sources,
            });
        }
        self.num_sources = x.num_sources;
        for ((out_row, k_row), x_row) in self.stations_mut().zip(k.stations()).zip(x.stations()) {
            for ((out, k), x) in out_row.iter_mut().zip(k_row).zip(x_row) {
                *out = x.scale_by(*k);
            }
        }
        Ok(())
    }
}
