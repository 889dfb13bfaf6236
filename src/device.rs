// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compute devices.
//!
//! A device is a worker thread with its own scratch memory. Handles are
//! passed explicitly to whatever needs them; there is no "current device".

use std::num::NonZeroUsize;

use log::{debug, trace};
use thiserror::Error;

/// The number of devices that can be used on this machine.
pub fn available_devices() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    index: usize,
}

impl DeviceHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Make this device the target of subsequent work. Called by a worker
    /// before it starts on a chunk.
    pub fn activate(&self) {
        trace!("Activating device {}", self.index);
    }

    /// Wait for all outstanding work on this device to finish. Called by a
    /// worker before its results are read.
    pub fn synchronize(&self) {
        trace!("Synchronising device {}", self.index);
    }
}

/// Get handles for `requested` devices, or all available devices if nothing
/// is requested.
pub fn acquire_devices(requested: Option<usize>) -> Result<Vec<DeviceHandle>, DeviceError> {
    let available = available_devices();
    let num_devices = match requested {
        Some(0) => return Err(DeviceError::NoDevices),
        Some(n) if n > available => {
            return Err(DeviceError::InsufficientDevices {
                requested: n,
                available,
            })
        }
        Some(n) => n,
        None => available,
    };
    debug!("Using {num_devices} of {available} available devices");
    Ok((0..num_devices).map(|index| DeviceHandle { index }).collect())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("At least one device is needed to simulate visibilities")]
    NoDevices,

    #[error("{requested} devices were requested, but only {available} are available")]
    InsufficientDevices { requested: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_all_devices() {
        let devices = acquire_devices(None).unwrap();
        assert_eq!(devices.len(), available_devices());
        for (i, d) in devices.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_acquire_one_device() {
        let devices = acquire_devices(Some(1)).unwrap();
        assert_eq!(devices, vec![DeviceHandle { index: 0 }]);
    }

    #[test]
    fn test_too_many_devices() {
        let available = available_devices();
        assert_eq!(
            acquire_devices(Some(available + 1)),
            Err(DeviceError::InsufficientDevices {
                requested: available + 1,
                available
            })
        );
        assert_eq!(acquire_devices(Some(0)), Err(DeviceError::NoDevices));
    }
}
