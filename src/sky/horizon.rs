// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Clipping sources to those above the horizon.

use marlu::{HADec, LatLngHeight};

use super::{SkyChunk, Source};

/// A source that is above the horizon at some instant.
#[derive(Debug, Clone, Copy)]
pub struct VisibleSource {
    pub source: Source,

    /// \[radians\]
    pub hour_angle: f64,

    /// Direction cosines in the local horizon frame (east, north, up).
    pub horizon: [f64; 3],
}

/// Get the horizon-frame direction cosines (east, north, up) of an hour angle
/// and declination seen from `latitude_rad`.
pub fn hadec_to_horizon(hadec: HADec, latitude_rad: f64) -> [f64; 3] {
    let (s_ha, c_ha) = hadec.ha.sin_cos();
    let (s_dec, c_dec) = hadec.dec.sin_cos();
    let (s_lat, c_lat) = latitude_rad.sin_cos();
    [
        -c_dec * s_ha,
        c_lat * s_dec - s_lat * c_dec * c_ha,
        s_lat * s_dec + c_lat * c_dec * c_ha,
    ]
}

/// The sources of a chunk that are above the horizon. The buffer is allocated
/// once with the largest chunk size and reused.
#[derive(Debug, Clone)]
pub struct LocalSky {
    sources: Vec<VisibleSource>,
}

impl LocalSky {
    pub fn new(capacity: usize) -> LocalSky {
        LocalSky {
            sources: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.sources.capacity()
    }

    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.sources.capacity() {
            self.sources.reserve_exact(capacity - self.sources.len());
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[VisibleSource] {
        &self.sources
    }

    /// Copy the sources of `sky` that are above the horizon (elevation
    /// strictly greater than zero) at the array position into this buffer,
    /// preserving their order. The visibility of a source is decided once for
    /// the whole array, at its reference position. `gast` is the Greenwich
    /// apparent sidereal time \[radians\]. Returns the number of visible
    /// sources.
    pub fn horizon_clip(
        &mut self,
        sky: &SkyChunk,
        array_position: LatLngHeight,
        gast: f64,
    ) -> usize {
        self.sources.clear();
        let lst = gast + array_position.longitude_rad;
        for source in &sky.sources {
            let hadec = source.radec.to_hadec(lst);
            let horizon = hadec_to_horizon(hadec, array_position.latitude_rad);
            if horizon[2] > 0.0 {
                self.sources.push(VisibleSource {
                    source: *source,
                    hour_angle: hadec.ha,
                    horizon,
                });
            }
        }
        self.sources.len()
    }

    /// Recompute the hour angle and horizon-frame direction of every visible
    /// source at another sidereal time. The set of visible sources doesn't
    /// change, even if some of them have since set; those sources are blanked
    /// when the station beams are evaluated.
    pub fn update_positions(&mut self, array_position: LatLngHeight, gast: f64) {
        let lst = gast + array_position.longitude_rad;
        for visible in &mut self.sources {
            let hadec = visible.source.radec.to_hadec(lst);
            visible.hour_angle = hadec.ha;
            visible.horizon = hadec_to_horizon(hadec, array_position.latitude_rad);
        }
    }
}
