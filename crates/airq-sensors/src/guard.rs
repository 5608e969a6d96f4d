//! Exclusive-access guard for one physical device.
//!
//! A [`DeviceHandle`] owns its driver behind a `tokio::sync::Mutex`, so the
//! only way to issue a bus command is through a [`DeviceGuard`]. Acquisition
//! waits at most the device's acquire timeout; release happens when the guard
//! is dropped, on every exit path.

use std::ops::{Deref, DerefMut};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use airq_core::{DeviceKind, InitStatus, Measurement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{trace, warn};

use crate::error::{Result, SensorError};

/// A measurement together with the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub measurement: Measurement,
    pub taken_at: DateTime<Utc>,
}

/// Non-bus state of a device: initialization status and last good reading.
///
/// Kept outside the driver mutex so it can be inspected while a long
/// measurement holds the guard.
#[derive(Debug, Default)]
pub struct DeviceState {
    status: RwLock<InitStatus>,
    last_reading: RwLock<Option<Reading>>,
}

impl DeviceState {
    pub fn status(&self) -> InitStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_status(&self, status: InitStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }

    pub fn last_reading(&self) -> Option<Reading> {
        *self.last_reading.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, measurement: Measurement) {
        *self
            .last_reading
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Reading {
            measurement,
            taken_at: Utc::now(),
        });
    }
}

/// One physical sensor: its driver behind the guard plus its state.
#[derive(Debug)]
pub struct DeviceHandle<D> {
    kind: DeviceKind,
    driver: Mutex<D>,
    acquire_timeout: Duration,
    state: DeviceState,
}

impl<D> DeviceHandle<D> {
    pub fn new(kind: DeviceKind, driver: D, acquire_timeout: Duration) -> Self {
        Self {
            kind,
            driver: Mutex::new(driver),
            acquire_timeout,
            state: DeviceState::default(),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Acquire the device guard, waiting at most the acquire timeout.
    ///
    /// Waiters are served in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::BusBusy`] when the guard is still held by
    /// another caller after the timeout.
    pub async fn lock(&self) -> Result<DeviceGuard<'_, D>> {
        match tokio::time::timeout(self.acquire_timeout, self.driver.lock()).await {
            Ok(inner) => {
                trace!(device = %self.kind, "guard acquired");
                Ok(DeviceGuard {
                    kind: self.kind,
                    inner,
                    acquired_at: Instant::now(),
                })
            }
            Err(_) => {
                let waited_ms = u64::try_from(self.acquire_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(device = %self.kind, waited_ms, "guard acquisition timed out");
                Err(SensorError::BusBusy {
                    device: self.kind,
                    waited_ms,
                })
            }
        }
    }
}

/// Scoped access to a device driver. Dropping it releases the device.
#[derive(Debug)]
pub struct DeviceGuard<'a, D> {
    kind: DeviceKind,
    inner: MutexGuard<'a, D>,
    acquired_at: Instant,
}

impl<D> Deref for DeviceGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.inner
    }
}

impl<D> DerefMut for DeviceGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

impl<D> Drop for DeviceGuard<'_, D> {
    fn drop(&mut self) {
        trace!(
            device = %self.kind,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "guard released"
        );
    }
}
