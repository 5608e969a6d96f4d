//! Per-device timing profiles.

use std::time::Duration;

use airq_core::DeviceKind;
use airq_core::constants::*;
use serde::{Deserialize, Serialize};

use crate::polling::PollPolicy;

/// Timing knobs for one device.
///
/// Read-path fields (`acquire_timeout_ms`, `settle_ms`, `poll_interval_ms`,
/// `max_poll_attempts`, `inter_sample_ms`) apply to every read. The remaining
/// fields are only used by initialization or by the manual fan cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Bounded wait for the device guard.
    pub acquire_timeout_ms: u64,

    /// Sleep after a measurement start, before the first readiness query.
    pub settle_ms: u64,

    /// Sleep before each readiness query.
    pub poll_interval_ms: u64,

    /// Readiness queries before a read is reported as timed out.
    pub max_poll_attempts: u32,

    /// Delay before the first command after power-up.
    pub power_up_delay_ms: u64,

    /// Delay after the wake/reset sequence.
    pub reset_delay_ms: u64,

    /// Identity probes attempted during initialization.
    pub probe_attempts: u32,

    /// Interval between two identity probes.
    pub probe_interval_ms: u64,

    /// Time the device runs in measurement mode before it is reported ready.
    pub stabilize_ms: u64,

    /// Unguarded pause between two averaging samples.
    pub inter_sample_ms: u64,

    /// How long a manual fan cleaning keeps the device busy.
    pub fan_cleaning_ms: u64,
}

impl DeviceProfile {
    /// Datasheet defaults for `kind`.
    pub fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Weather => Self::weather(),
            DeviceKind::Co2 => Self::co2(),
            DeviceKind::Particulate => Self::particulate(),
        }
    }

    /// BME280 defaults.
    pub fn weather() -> Self {
        Self {
            acquire_timeout_ms: WEATHER_ACQUIRE_TIMEOUT_MS,
            settle_ms: WEATHER_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: WEATHER_MAX_POLL_ATTEMPTS,
            power_up_delay_ms: 0,
            reset_delay_ms: 0,
            probe_attempts: 1,
            probe_interval_ms: 0,
            stabilize_ms: 0,
            inter_sample_ms: 0,
            fan_cleaning_ms: 0,
        }
    }

    /// SCD4x defaults (single-shot mode).
    pub fn co2() -> Self {
        Self {
            acquire_timeout_ms: CO2_ACQUIRE_TIMEOUT_MS,
            settle_ms: CO2_MEASUREMENT_DURATION_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: CO2_MAX_POLL_ATTEMPTS,
            power_up_delay_ms: CO2_POWER_UP_DELAY_MS,
            reset_delay_ms: 0,
            probe_attempts: 1,
            probe_interval_ms: 0,
            stabilize_ms: 0,
            inter_sample_ms: 0,
            fan_cleaning_ms: 0,
        }
    }

    /// SPS30 defaults (continuous mode, averaged).
    pub fn particulate() -> Self {
        Self {
            acquire_timeout_ms: PM_ACQUIRE_TIMEOUT_MS,
            settle_ms: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: PM_MAX_POLL_ATTEMPTS,
            power_up_delay_ms: 0,
            reset_delay_ms: PM_RESET_DELAY_MS,
            probe_attempts: PM_PROBE_ATTEMPTS,
            probe_interval_ms: PM_PROBE_INTERVAL_MS,
            stabilize_ms: PM_STABILIZE_MS,
            inter_sample_ms: PM_MEASUREMENT_DURATION_MS,
            fan_cleaning_ms: PM_FAN_CLEANING_MS,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Data-ready polling policy for one acquisition.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            settle: Duration::from_millis(self.settle_ms),
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
        }
    }

    /// Identity probing policy used during initialization.
    pub fn probe_policy(&self) -> PollPolicy {
        PollPolicy {
            settle: Duration::ZERO,
            interval: Duration::from_millis(self.probe_interval_ms),
            max_attempts: self.probe_attempts.max(1),
        }
    }
}
