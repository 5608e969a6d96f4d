//! Error types for guarded device operations.
//!
//! Every variant names the device it concerns so the orchestrator can log a
//! failed read and move on to the next device.

use airq_core::{DeviceKind, InitStatus, ParameterKind};
use airq_hardware::HardwareError;

/// Result type alias for sensor operations.
pub type Result<T> = std::result::Result<T, SensorError>;

/// Errors raised by the sensor manager and the reconfiguration queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// The device guard could not be acquired within the bounded wait.
    #[error("{device} bus busy: guard not acquired within {waited_ms} ms")]
    BusBusy { device: DeviceKind, waited_ms: u64 },

    /// Data-ready was never asserted within the polling bound.
    #[error("{device} data not ready after {attempts} polls")]
    Timeout { device: DeviceKind, attempts: u32 },

    /// The driver adapter reported a bus-level failure.
    #[error("{device} transport error: {source}")]
    Transport {
        device: DeviceKind,
        #[source]
        source: HardwareError,
    },

    /// Operation attempted on a device that has not been initialized.
    #[error("{device} is not ready (status: {status})")]
    NotReady {
        device: DeviceKind,
        status: InitStatus,
    },

    /// The identity probe returned nothing usable.
    #[error("{device} identity check failed: {reason}")]
    IdentityMismatch { device: DeviceKind, reason: String },

    /// The device produced a sample outside its physical range.
    #[error("{device} returned an invalid sample: {reason}")]
    InvalidSample { device: DeviceKind, reason: String },

    /// The parameter does not exist on the targeted device.
    #[error("{parameter} is not supported by {device}")]
    UnsupportedParameter {
        device: DeviceKind,
        parameter: ParameterKind,
    },
}

impl SensorError {
    /// Adapter for `map_err` that tags a [`HardwareError`] with its device.
    ///
    /// ```
    /// use airq_core::DeviceKind;
    /// use airq_hardware::HardwareError;
    /// use airq_sensors::SensorError;
    ///
    /// let result: Result<(), HardwareError> = Err(HardwareError::nack("wake_up"));
    /// let err = result.map_err(SensorError::transport(DeviceKind::Co2)).unwrap_err();
    /// assert!(matches!(err, SensorError::Transport { device: DeviceKind::Co2, .. }));
    /// ```
    pub fn transport(device: DeviceKind) -> impl Fn(HardwareError) -> Self {
        move |source| Self::Transport { device, source }
    }

    /// Device the error concerns.
    pub fn device(&self) -> DeviceKind {
        match self {
            Self::BusBusy { device, .. }
            | Self::Timeout { device, .. }
            | Self::Transport { device, .. }
            | Self::NotReady { device, .. }
            | Self::IdentityMismatch { device, .. }
            | Self::InvalidSample { device, .. }
            | Self::UnsupportedParameter { device, .. } => *device,
        }
    }

    /// Whether repeating the same operation later can succeed.
    ///
    /// Parameter writes failing with a non-transient error are dropped from
    /// the reconfiguration queue instead of being retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UnsupportedParameter { .. } => false,
            Self::Transport { source, .. } => {
                !matches!(source, HardwareError::Unsupported { .. })
            }
            Self::BusBusy { .. }
            | Self::Timeout { .. }
            | Self::NotReady { .. }
            | Self::IdentityMismatch { .. }
            | Self::InvalidSample { .. } => true,
        }
    }
}
