//! Device driver adapter traits.
//!
//! A driver adapter translates bus primitives into the typed commands the
//! acquisition layer needs. Each method is one command/response round trip
//! with its own latency and failure modes; none of them retries internally
//! and none of them sleeps for datasheet delays. Delays, readiness polling and
//! mutual exclusion are the caller's job.
//!
//! # Send futures
//!
//! Acquisition runs on Tokio worker threads and device operations are awaited
//! from spawned tasks, so every method returns a `Send` future. Implementors
//! can still write plain `async fn`.

use std::future::Future;

use airq_core::{DeviceKind, Parameter};

use crate::{DeviceInfo, Result};

/// Command set shared by every sensor on the bus.
///
/// # Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because its methods return
/// `impl Future`. Use the enum wrappers in [`devices`](crate::devices)
/// (`AnyCo2Sensor`, ...) where a single concrete type is needed.
///
/// # Examples
///
/// ```no_run
/// use airq_hardware::traits::SensorDriver;
/// use airq_hardware::Result;
///
/// async fn single_shot<D: SensorDriver>(driver: &mut D) -> Result<D::Sample> {
///     driver.start().await?;
///     while !driver.poll_ready().await? {}
///     driver.read_result().await
/// }
/// ```
pub trait SensorDriver: Send + Sync {
    /// Raw sample type returned by [`read_result`](Self::read_result).
    type Sample: Send;

    /// Which physical device this driver talks to.
    fn kind(&self) -> DeviceKind;

    /// Device-specific wake/reset command sequence.
    ///
    /// For the CO₂ sensor this is wake-up, stop periodic measurement and
    /// re-init; for the particulate sensor a soft reset; the weather sensor
    /// has nothing to do.
    fn wake(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Query the device identity (serial number, firmware version).
    ///
    /// Some devices do not acknowledge their wake command, so a successful
    /// identity read is the proof that the device is present.
    fn identify(&mut self) -> impl Future<Output = Result<DeviceInfo>> + Send;

    /// Start a measurement.
    ///
    /// For single-shot devices this triggers one conversion. For continuous
    /// devices it enters measurement mode and is a no-op when already
    /// measuring.
    fn start(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Read the data-ready flag.
    fn poll_ready(&mut self) -> impl Future<Output = Result<bool>> + Send;

    /// Fetch the most recent result.
    fn read_result(&mut self) -> impl Future<Output = Result<Self::Sample>> + Send;

    /// Write one calibration or configuration parameter.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Unsupported`](crate::HardwareError::Unsupported)
    /// when the parameter does not belong to this device.
    fn write_param(&mut self, parameter: Parameter) -> impl Future<Output = Result<()>> + Send;
}

/// Fan cleaning support (particulate sensor only).
pub trait FanCleaning: SensorDriver {
    /// Start a manual fan-cleaning cycle.
    ///
    /// Returns as soon as the command is acknowledged; the cleaning itself
    /// runs for about ten seconds on the device.
    fn start_fan_cleaning(&mut self) -> impl Future<Output = Result<()>> + Send;
}
