// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Timing each stage of the simulation.

use std::time::{Duration, Instant};

use log::info;

/// A stopwatch that can be paused and resumed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Timer {
    elapsed: Duration,
    started: Option<Instant>,
}

impl Timer {
    pub(crate) fn resume(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub(crate) fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.elapsed + self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
}

/// One timer per stage of the chunk loop. Each device has its own.
#[derive(Debug, Clone, Default)]
pub(crate) struct Timers {
    pub(crate) init_copy: Timer,
    pub(crate) clip: Timer,
    pub(crate) r: Timer,
    pub(crate) e: Timer,
    pub(crate) k: Timer,
    pub(crate) join: Timer,
    pub(crate) correlate: Timer,
}

impl Timers {
    fn stages(&self) -> [(&'static str, Duration); 7] {
        [
            ("Initialisation & copy", self.init_copy.elapsed()),
            ("Horizon clip", self.clip.elapsed()),
            ("Jones R", self.r.elapsed()),
            ("Jones E", self.e.elapsed()),
            ("Jones K", self.k.elapsed()),
            ("Jones join", self.join.elapsed()),
            ("Jones correlate", self.correlate.elapsed()),
        ]
    }

    /// Log the time spent in each stage, summed over all devices, as a
    /// percentage of `total`.
    pub(crate) fn log_summary(timers: &[&Timers], total: Duration) {
        let total_secs = total.as_secs_f64();
        info!("Simulation completed in {:.3} s", total_secs);
        if total_secs <= 0.0 || timers.is_empty() {
            return;
        }
        // Devices run concurrently, so average over them.
        let num_devices = timers.len() as f64;
        let mut sums = [0.0; 7];
        let mut names = [""; 7];
        for t in timers {
            for (i, (name, elapsed)) in t.stages().into_iter().enumerate() {
                names[i] = name;
                sums[i] += elapsed.as_secs_f64();
            }
        }
        for (name, sum) in names.iter().zip(sums) {
            info!(
                "  {:<22} {:>6.1}%",
                format!("{name}:"),
                100.0 * sum / num_devices / total_secs
            );
        }
    }
}
