// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulated visibilities and their metadata.

mod noise;

pub use noise::add_noise;

use hifitime::{Duration, Epoch};
use marlu::{LatLngHeight, RADec, UVW};
use ndarray::prelude::*;
use num_complex::Complex;

use crate::jones::{Jones, JonesElement, VisType};

/// Everything needed to make sense of a set of visibilities.
#[derive(Debug, Clone)]
pub struct VisMetadata {
    pub phase_centre: RADec,

    pub array_position: LatLngHeight,

    /// The centre frequency of each channel \[Hz\].
    pub freqs_hz: Vec<f64>,

    pub channel_bandwidth_hz: f64,

    /// The centre of each time step.
    pub timestamps: Vec<Epoch>,

    pub time_res: Duration,

    /// The station indices of each baseline.
    pub baselines: Vec<(usize, usize)>,

    /// The (u, v, w) coordinates of each baseline at each time step
    /// \[metres\]. The dimensions are (time, baseline).
    pub uvws: Array2<UVW>,
}

impl VisMetadata {
    pub fn num_channels(&self) -> usize {
        self.freqs_hz.len()
    }

    pub fn num_times(&self) -> usize {
        self.timestamps.len()
    }

    pub fn num_baselines(&self) -> usize {
        self.baselines.len()
    }

    pub fn num_stations(&self) -> usize {
        self.baselines
            .iter()
            .map(|&(p, q)| p.max(q) + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Visibilities ordered (channel, time, baseline).
#[derive(Debug, Clone)]
pub struct Visibilities<E> {
    pub data: Array3<E>,
    pub metadata: VisMetadata,
}

impl<E: JonesElement> Visibilities<E> {
    /// Zero-initialised visibilities for the dimensions in `metadata`.
    pub fn new(metadata: VisMetadata) -> Visibilities<E> {
        let dim = (
            metadata.num_channels(),
            metadata.num_times(),
            metadata.num_baselines(),
        );
        Visibilities {
            data: Array3::from_elem(dim, E::default()),
            metadata,
        }
    }

    /// Add a (time, baseline) array into a channel.
    pub fn add_channel(&mut self, i_chan: usize, vis_tb: ArrayView2<E>) {
        self.data
            .slice_mut(s![i_chan, .., ..])
            .zip_mut_with(&vis_tb, |a, &b| *a += b);
    }
}

/// Implemented for the four element types that visibilities may have, so
/// that generic visibilities can be put into and taken out of
/// [`AnyVisibilities`].
pub trait VisElement: JonesElement {
    fn into_any(vis: Visibilities<Self>) -> AnyVisibilities;

    fn from_any(vis: AnyVisibilities) -> Option<Visibilities<Self>>;
}

/// Visibilities of any precision and mode.
#[derive(Debug, Clone)]
pub enum AnyVisibilities {
    SingleScalar(Visibilities<Complex<f32>>),
    DoubleScalar(Visibilities<Complex<f64>>),
    SingleMatrix(Visibilities<Jones<f32>>),
    DoubleMatrix(Visibilities<Jones<f64>>),
}

macro_rules! impl_vis_element {
    ($ty:ty, $variant:ident) => {
        impl VisElement for $ty {
            fn into_any(vis: Visibilities<Self>) -> AnyVisibilities {
                AnyVisibilities::$variant(vis)
            }

            fn from_any(vis: AnyVisibilities) -> Option<Visibilities<Self>> {
                match vis {
                    AnyVisibilities::$variant(vis) => Some(vis),
                    _ => None,
                }
            }
        }
    };
}

impl_vis_element!(Complex<f32>, SingleScalar);
impl_vis_element!(Complex<f64>, DoubleScalar);
impl_vis_element!(Jones<f32>, SingleMatrix);
impl_vis_element!(Jones<f64>, DoubleMatrix);

impl AnyVisibilities {
    pub fn vis_type(&self) -> VisType {
        match self {
            AnyVisibilities::SingleScalar(_) => VisType::new(false, true),
            AnyVisibilities::DoubleScalar(_) => VisType::new(true, true),
            AnyVisibilities::SingleMatrix(_) => VisType::new(false, false),
            AnyVisibilities::DoubleMatrix(_) => VisType::new(true, false),
        }
    }

    pub fn metadata(&self) -> &VisMetadata {
        match self {
            AnyVisibilities::SingleScalar(v) => &v.metadata,
            AnyVisibilities::DoubleScalar(v) => &v.metadata,
            AnyVisibilities::SingleMatrix(v) => &v.metadata,
            AnyVisibilities::DoubleMatrix(v) => &v.metadata,
        }
    }

    /// Get the visibilities as a specific type.
    pub fn downcast<E: VisElement>(self) -> Option<Visibilities<E>> {
        E::from_any(self)
    }
}
