// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulating the visibilities of a sky model.
//!
//! Channels are simulated one at a time. For each channel, every device runs
//! a worker thread that pulls sky-chunk indices off a shared queue, simulates
//! them, and sums the results into the device's own accumulation buffer.
//! Once the queue is drained and every worker has finished, the accumulation
//! buffers are added into the channel's visibilities in device order.

mod chunk;
mod error;
mod timers;

pub use error::SimulateError;

use std::{path::PathBuf, sync::Arc, thread, time::Instant};

use crossbeam_channel::unbounded;
use crossbeam_utils::atomic::AtomicCell;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use marlu::UVW;
use ndarray::prelude::*;
use num_complex::Complex;
use scopeguard::defer_on_unwind;

use crate::{
    correlate::{Correlator, CorrelatorSettings},
    device::{acquire_devices, DeviceHandle},
    effects::station_uvw,
    io::write::create_writers,
    jones::{Jones, JonesMode, Precision, VisType},
    sky::{FluxFilter, SkyChunk},
    telescope::Telescope,
    time::{mjd_to_gast_fast, TimeGrid},
    vis::{add_noise, AnyVisibilities, VisElement, VisMetadata, Visibilities},
    PROGRESS_BARS,
};
use chunk::{ChannelContext, DeviceWorkspace};
use timers::Timers;

/// Evenly-spaced channel frequencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyGrid {
    /// \[Hz\]
    pub start_hz: f64,

    /// \[Hz\]
    pub inc_hz: f64,

    pub num_channels: usize,
}

impl FrequencyGrid {
    pub fn freq(&self, i_chan: usize) -> f64 {
        self.start_hz + self.inc_hz * i_chan as f64
    }

    pub fn freqs(&self) -> Vec<f64> {
        (0..self.num_channels).map(|i| self.freq(i)).collect()
    }
}

/// Everything needed to simulate visibilities.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub telescope: Arc<Telescope>,

    /// The sky model, already split into chunks.
    pub chunks: Vec<SkyChunk>,

    /// Applied to each source after its flux density is scaled to a channel
    /// frequency.
    pub flux_filter: FluxFilter,

    pub vis_type: VisType,

    pub freqs: FrequencyGrid,

    pub time_grid: TimeGrid,

    pub correlator: CorrelatorSettings,

    /// How many devices to use. If this is `None`, all available devices are
    /// used.
    pub num_devices: Option<usize>,

    /// If this is set, noise is added to the visibilities with this seed.
    pub noise_seed: Option<u64>,

    pub outputs: Vec<PathBuf>,
}

impl Simulation {
    pub fn num_sources(&self) -> usize {
        self.chunks.iter().map(SkyChunk::len).sum()
    }

    /// Simulate the visibilities and write them to every output.
    pub fn run(&self) -> Result<(), SimulateError> {
        if self.outputs.is_empty() {
            return Err(SimulateError::NoOutput);
        }
        // Catch bad output paths before doing any work.
        let mut writers = create_writers(&self.outputs)?;

        let vis = self.simulate()?;
        for writer in writers.iter_mut() {
            writer.write(&vis)?;
        }
        Ok(())
    }

    /// Simulate the visibilities, adding noise if it's enabled.
    pub fn simulate(&self) -> Result<AnyVisibilities, SimulateError> {
        let devices = acquire_devices(self.num_devices)?;
        info!(
            "Simulating {} visibilities on {} device(s)",
            self.vis_type,
            devices.len()
        );
        let vis = match (self.vis_type.precision, self.vis_type.mode) {
            (Precision::Single, JonesMode::Scalar) => {
                Complex::<f32>::into_any(self.simulate_typed(&devices)?)
            }
            (Precision::Double, JonesMode::Scalar) => {
                Complex::<f64>::into_any(self.simulate_typed(&devices)?)
            }
            (Precision::Single, JonesMode::Matrix) => {
                Jones::<f32>::into_any(self.simulate_typed(&devices)?)
            }
            (Precision::Double, JonesMode::Matrix) => {
                Jones::<f64>::into_any(self.simulate_typed(&devices)?)
            }
        };
        Ok(vis)
    }

    /// The metadata of the simulated visibilities. Baseline (u, v, w)
    /// coordinates are given at the centre of each time step.
    pub fn metadata(&self) -> Result<VisMetadata, SimulateError> {
        let telescope = &self.telescope;
        let baselines: Vec<(usize, usize)> = telescope.baseline_pairs().collect();
        let mut station_uvws = vec![UVW::default(); telescope.num_stations()];
        let mut uvws = Array2::from_elem(
            (self.time_grid.num_times, baselines.len()),
            UVW::default(),
        );
        for (i_time, mut uvws) in uvws.outer_iter_mut().enumerate() {
            let gast = mjd_to_gast_fast(self.time_grid.dump_centre_mjd(i_time));
            station_uvw(telescope, gast, &mut station_uvws)?;
            for (uvw, &(p, q)) in uvws.iter_mut().zip(baselines.iter()) {
                let (uvw_p, uvw_q) = (station_uvws[p], station_uvws[q]);
                *uvw = UVW {
                    u: uvw_p.u - uvw_q.u,
                    v: uvw_p.v - uvw_q.v,
                    w: uvw_p.w - uvw_q.w,
                };
            }
        }

        Ok(VisMetadata {
            phase_centre: telescope.phase_centre,
            array_position: telescope.array_position,
            freqs_hz: self.freqs.freqs(),
            channel_bandwidth_hz: self.correlator.channel_bandwidth_hz,
            timestamps: self.time_grid.dump_centres(),
            time_res: self.time_grid.time_res,
            baselines,
            uvws,
        })
    }

    fn simulate_typed<E: VisElement>(
        &self,
        devices: &[DeviceHandle],
    ) -> Result<Visibilities<E>, SimulateError> {
        let start = Instant::now();
        let beam = self.telescope.beam.create_beam()?;
        let correlator = Correlator::new(&self.telescope, self.correlator);
        let mut vis = Visibilities::<E>::new(self.metadata()?);

        let max_chunk_size = self.chunks.iter().map(SkyChunk::len).max().unwrap_or(0);
        let mut workspaces: Vec<DeviceWorkspace<E>> = devices
            .iter()
            .map(|device| {
                DeviceWorkspace::new(
                    device.clone(),
                    Arc::clone(&self.telescope),
                    max_chunk_size,
                    self.time_grid.num_times,
                    correlator.num_baselines(),
                )
            })
            .collect();

        let progress = ProgressBar::with_draw_target(
            Some((self.freqs.num_channels * self.chunks.len()) as u64),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:3}/{len:3} chunks ({elapsed_precise}<{eta_precise})")
                .map(|s| s.progress_chars("=> "))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        )
        .with_position(0)
        .with_message("Simulating");

        for i_chan in 0..self.freqs.num_channels {
            let freq_hz = self.freqs.freq(i_chan);
            debug!(
                "Channel {}/{}: {:.6} MHz",
                i_chan + 1,
                self.freqs.num_channels,
                freq_hz / 1e6
            );
            let ctx = ChannelContext {
                sim: self,
                beam: &*beam,
                correlator: &correlator,
                i_chan,
                freq_hz,
            };
            simulate_channel(&ctx, &mut workspaces, &progress)?;

            // The end of the scope above is the barrier; only this thread
            // touches the global visibilities.
            for ws in workspaces.iter_mut() {
                ws.merge_into(&mut vis, i_chan);
            }
        }
        progress.abandon_with_message("Finished simulating");

        if let Some(seed) = self.noise_seed {
            if self.num_sources() > 0 && !self.telescope.normalise_beams_at_phase_centre {
                warn!("Station beams are not normalised at the phase centre, so the noise may be at the wrong level relative to the sky signal");
            }
            let station_rms_jy: Vec<f64> = self
                .telescope
                .stations
                .iter()
                .map(|s| s.noise_rms_jy)
                .collect();
            add_noise(&mut vis, &station_rms_jy, seed)?;
        }

        let timers: Vec<&Timers> = workspaces.iter().map(|ws| &ws.timers).collect();
        Timers::log_summary(&timers, start.elapsed());

        Ok(vis)
    }
}

/// Share out every chunk of the sky amongst the devices and simulate them at
/// one channel. Returns once every device has finished, with the first error
/// that any device hit.
fn simulate_channel<E: VisElement>(
    ctx: &ChannelContext,
    workspaces: &mut [DeviceWorkspace<E>],
    progress: &ProgressBar,
) -> Result<(), SimulateError> {
    let (tx, rx) = unbounded();
    for i_chunk in 0..ctx.sim.chunks.len() {
        // `rx` is alive, so this can't fail.
        tx.send(i_chunk).ok();
    }
    drop(tx);

    let error = AtomicCell::new(false);
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workspaces.len());
        let mut result = Ok(());
        for ws in workspaces.iter_mut() {
            let name = format!("device-{}", ws.device().index());
            let rx = rx.clone();
            let error = &error;
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(scope, move || {
                    defer_on_unwind! { error.store(true); }
                    let result = ws.process_queue(ctx, rx, error, progress);
                    if result.is_err() {
                        error.store(true);
                    }
                    result
                });
            match spawned {
                Ok(handle) => handles.push((name, handle)),
                Err(e) => {
                    error.store(true);
                    result = Err(SimulateError::from(e));
                    break;
                }
            }
        }

        for (name, handle) in handles {
            let thread_result = handle
                .join()
                .unwrap_or_else(|_| Err(SimulateError::WorkerPanicked(name)));
            if result.is_ok() {
                result = thread_result;
            }
        }
        result
    })
}
