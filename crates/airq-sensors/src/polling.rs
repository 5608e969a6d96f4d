//! Bounded data-ready polling.
//!
//! Polling is bounded by an attempt count, not a timer: the worst case is
//! `settle + max_attempts * interval` and exceeding it is a
//! [`SensorError::Timeout`], never a hang.

use std::time::Duration;

use airq_hardware::{DeviceInfo, SensorDriver};
use tracing::{debug, trace};

use crate::error::{Result, SensorError};

/// Bounded retry policy: optional initial settle, then up to `max_attempts`
/// queries each preceded by `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub settle: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Longest time [`wait_until_ready`] can take before giving up.
    pub fn worst_case(&self) -> Duration {
        self.settle + self.interval * self.max_attempts
    }
}

/// Sleep out the settle time, then query data-ready until it is asserted.
///
/// Returns the number of queries issued. The caller must hold the device
/// guard for the whole call.
///
/// # Errors
///
/// - [`SensorError::Timeout`] when `max_attempts` queries all report "not ready"
/// - [`SensorError::Transport`] when a query itself fails (not retried)
pub async fn wait_until_ready<D: SensorDriver>(
    driver: &mut D,
    policy: &PollPolicy,
) -> Result<u32> {
    let device = driver.kind();

    if !policy.settle.is_zero() {
        tokio::time::sleep(policy.settle).await;
    }

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        let ready = driver
            .poll_ready()
            .await
            .map_err(SensorError::transport(device))?;
        if ready {
            trace!(device = %device, attempt, "data ready");
            return Ok(attempt);
        }
    }

    debug!(
        device = %device,
        attempts = policy.max_attempts,
        "data-ready never asserted"
    );
    Err(SensorError::Timeout {
        device,
        attempts: policy.max_attempts,
    })
}

/// Query the device identity until it answers, up to `max_attempts` times.
///
/// Some devices do not acknowledge their reset command, so a successful
/// identity read is the only proof they are back. The last transport error
/// is returned when every probe fails.
pub async fn probe_identity<D: SensorDriver>(
    driver: &mut D,
    policy: &PollPolicy,
) -> Result<DeviceInfo> {
    let device = driver.kind();
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            tokio::time::sleep(policy.interval).await;
        }

        match driver.identify().await {
            Ok(info) => return Ok(info),
            Err(err) => {
                trace!(device = %device, attempt, error = %err, "identity probe failed");
                last_error = Some(err);
            }
        }
    }

    Err(match last_error {
        Some(source) => SensorError::Transport { device, source },
        None => SensorError::IdentityMismatch {
            device,
            reason: "no identity probe attempted".to_string(),
        },
    })
}
