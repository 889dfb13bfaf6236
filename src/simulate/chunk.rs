// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-device scratch space, and simulating one sky chunk at one frequency.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use crossbeam_utils::atomic::AtomicCell;
use indicatif::ProgressBar;
use log::trace;
use marlu::UVW;
use ndarray::prelude::*;
use num_complex::Complex;

use super::{timers::Timers, SimulateError, Simulation};
use crate::{
    beam::Beam,
    correlate::{normalise_snapshot, Correlator},
    device::DeviceHandle,
    effects::{
        beam_pointing, compose, evaluate_jones_e, evaluate_jones_k, evaluate_jones_r,
        join_in_place, skip_jones_e, station_uvw, StationWork,
    },
    jones::{JonesElement, JonesField, JonesMode},
    random::RandomState,
    sky::{LocalSky, SkyChunk},
    telescope::Telescope,
    time::mjd_to_gast_fast,
    vis::Visibilities,
};

/// Things shared by every device while a channel is simulated.
#[derive(Clone, Copy)]
pub(super) struct ChannelContext<'a> {
    pub(super) sim: &'a Simulation,
    pub(super) beam: &'a dyn Beam,
    pub(super) correlator: &'a Correlator,
    pub(super) i_chan: usize,
    pub(super) freq_hz: f64,
}

/// Everything a device needs to simulate chunks. This is allocated once
/// before the channel loop and reused for every chunk and channel.
pub(super) struct DeviceWorkspace<E: JonesElement> {
    device: DeviceHandle,

    /// This device's replica of the telescope.
    telescope: Arc<Telescope>,

    /// The frequency-scaled, flux-filtered copy of the current chunk.
    chunk: SkyChunk,

    local_sky: LocalSky,

    /// Only used in matrix mode.
    r: Option<JonesField<E>>,
    e: JonesField<E>,
    k: JonesField<Complex<E::Float>>,
    j: JonesField<E>,

    station_work: StationWork,
    station_uvws: Vec<UVW>,

    /// The running sum of a single snapshot, one element per baseline.
    snapshot: Vec<E>,

    /// The sum of all chunks done on this device for the current channel.
    /// The dimensions are (time, baseline).
    vis_acc: Array2<E>,

    /// The result of the current chunk.
    vis_temp: Array2<E>,

    pub(super) timers: Timers,
}

impl<E: JonesElement> DeviceWorkspace<E> {
    pub(super) fn new(
        device: DeviceHandle,
        telescope: Arc<Telescope>,
        max_chunk_size: usize,
        num_times: usize,
        num_baselines: usize,
    ) -> DeviceWorkspace<E> {
        let mut timers = Timers::default();
        timers.init_copy.resume();
        let num_stations = telescope.num_stations();
        let r = match E::MODE {
            JonesMode::Matrix => Some(JonesField::new(num_stations, max_chunk_size)),
            JonesMode::Scalar => None,
        };
        let station_work = StationWork::new(telescope.max_station_size(), max_chunk_size);
        let mut ws = DeviceWorkspace {
            device,
            chunk: SkyChunk::with_capacity(max_chunk_size),
            local_sky: LocalSky::new(max_chunk_size),
            r,
            e: JonesField::new(num_stations, max_chunk_size),
            k: JonesField::new(num_stations, max_chunk_size),
            j: JonesField::new(num_stations, max_chunk_size),
            station_work,
            station_uvws: vec![UVW::default(); num_stations],
            snapshot: vec![E::default(); num_baselines],
            vis_acc: Array2::from_elem((num_times, num_baselines), E::default()),
            vis_temp: Array2::from_elem((num_times, num_baselines), E::default()),
            telescope,
            timers,
        };
        ws.timers.init_copy.pause();
        ws
    }

    pub(super) fn device(&self) -> &DeviceHandle {
        &self.device
    }

    /// Simulate chunks pulled from `queue` until it's empty, or until another
    /// device reports an error.
    pub(super) fn process_queue(
        &mut self,
        ctx: &ChannelContext,
        queue: Receiver<usize>,
        error: &AtomicCell<bool>,
        progress: &ProgressBar,
    ) -> Result<(), SimulateError> {
        self.device.activate();
        for i_chunk in queue.iter() {
            if error.load() {
                break;
            }
            self.simulate_chunk(ctx, i_chunk)?;
            self.timers.init_copy.resume();
            self.vis_acc
                .zip_mut_with(&self.vis_temp, |acc, &temp| *acc += temp);
            self.timers.init_copy.pause();
            progress.inc(1);
        }
        self.device.synchronize();
        Ok(())
    }

    /// Add this device's channel sum into the global visibilities, and zero
    /// it for the next channel.
    pub(super) fn merge_into(&mut self, vis: &mut Visibilities<E>, i_chan: usize) {
        vis.add_channel(i_chan, self.vis_acc.view());
        self.vis_acc.fill(E::default());
    }

    /// Simulate every time step of one sky chunk at the channel frequency.
    /// The result is left in `vis_temp`.
    pub(super) fn simulate_chunk(
        &mut self,
        ctx: &ChannelContext,
        i_chunk: usize,
    ) -> Result<(), SimulateError> {
        let ChannelContext {
            sim,
            beam,
            correlator,
            i_chan,
            freq_hz,
        } = *ctx;
        let grid = &sim.time_grid;
        let telescope = Arc::clone(&self.telescope);
        let array_position = telescope.array_position;

        self.timers.init_copy.resume();
        self.vis_temp.fill(E::default());
        sim.chunks[i_chunk].scaled_copy_into(freq_hz, sim.flux_filter, &mut self.chunk);
        self.timers.init_copy.pause();
        if self.chunk.is_empty() {
            trace!(
                "Chunk {} has no sources left at {:.4} MHz",
                i_chunk + 1,
                freq_hz / 1e6
            );
            return Ok(());
        }

        // The same stream for every chunk and channel; element errors must
        // not depend on how the sky was split.
        let mut random = RandomState::new(telescope.max_station_size(), telescope.seed, 0, 0);

        for i_time in 0..grid.num_times {
            let gast = mjd_to_gast_fast(grid.dump_centre_mjd(i_time));
            self.timers.clip.resume();
            let num_visible = self
                .local_sky
                .horizon_clip(&self.chunk, array_position, gast);
            self.timers.clip.pause();
            trace!(
                "Snapshot {:4}/{}, chunk {:4}/{}, channel {}, device {} [{} sources]",
                i_time + 1,
                grid.num_times,
                i_chunk + 1,
                sim.chunks.len(),
                i_chan + 1,
                self.device.index(),
                num_visible
            );
            if num_visible == 0 {
                for _ in 0..grid.num_vis_ave {
                    skip_jones_e(beam, &telescope, &mut random, &mut self.station_work);
                }
                continue;
            }

            self.snapshot.fill(E::default());
            for i_vis_ave in 0..grid.num_vis_ave {
                let gast = mjd_to_gast_fast(grid.vis_ave_centre_mjd(i_time, i_vis_ave));
                self.local_sky.update_positions(array_position, gast);
                let pointing = beam_pointing(
                    telescope.phase_centre,
                    array_position,
                    gast + array_position.longitude_rad,
                );

                self.timers.e.resume();
                evaluate_jones_e(
                    &mut self.e,
                    beam,
                    &telescope,
                    &self.local_sky,
                    &pointing,
                    freq_hz,
                    &mut random,
                    &mut self.station_work,
                )?;
                self.timers.e.pause();

                if let Some(r) = self.r.as_mut() {
                    self.timers.r.resume();
                    evaluate_jones_r(r, &self.local_sky, array_position.latitude_rad)?;
                    self.timers.r.pause();

                    self.timers.join.resume();
                    join_in_place(r, &self.e)?;
                    self.timers.join.pause();
                }

                for i_fringe in 0..grid.num_fringe_ave {
                    let gast =
                        mjd_to_gast_fast(grid.fringe_ave_centre_mjd(i_time, i_vis_ave, i_fringe));
                    station_uvw(&telescope, gast, &mut self.station_uvws)?;

                    self.timers.k.resume();
                    evaluate_jones_k(&mut self.k, &self.local_sky, &self.station_uvws, freq_hz)?;
                    self.timers.k.pause();

                    self.timers.join.resume();
                    compose(&mut self.j, &self.k, self.r.as_ref().unwrap_or(&self.e))?;
                    self.timers.join.pause();

                    self.timers.correlate.resume();
                    correlator.correlate(
                        &mut self.snapshot,
                        &self.local_sky,
                        &self.j,
                        &self.station_uvws,
                        freq_hz,
                        gast,
                    )?;
                    self.timers.correlate.pause();
                }
            }

            self.timers.init_copy.resume();
            normalise_snapshot(&mut self.snapshot, grid.num_vis_ave, grid.num_fringe_ave);
            for (out, &v) in self
                .vis_temp
                .row_mut(i_time)
                .iter_mut()
                .zip(self.snapshot.iter())
            {
                *out = v;
            }
            self.timers.init_copy.pause();
        }

        Ok(())
    }
}
