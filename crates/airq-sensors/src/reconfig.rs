//! Deferred hardware reconfiguration.
//!
//! Settings callbacks must return quickly, but a parameter write needs the
//! same device guard a multi-second read may be holding. The callback only
//! records the job with [`ReconfigQueue::enqueue`]; a drain running on a
//! context that may block applies it later.
//!
//! At most one job is pending per `(DeviceKind, ParameterKind)`: a newer
//! value replaces an unapplied older one, so only the latest value is ever
//! written. Each enqueue bumps a generation counter; a drain that finishes a
//! write only clears the entry if nothing newer arrived meanwhile.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use airq_core::{DeviceKind, Parameter, ParameterKind};
use serde::Serialize;
use tokio::sync::{Notify, watch};
use tracing::{debug, error, info, warn};

use crate::manager::SensorManager;

/// Default pause before a drain task retries jobs that failed.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(30);

type JobKey = (DeviceKind, ParameterKind);

#[derive(Debug, Clone, Copy)]
struct PendingEntry {
    parameter: Parameter,
    generation: u64,
    failed_attempts: u32,
}

/// Snapshot of one pending reconfiguration job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingJob {
    pub device: DeviceKind,
    pub parameter: Parameter,

    /// Drain attempts that already failed for this (device, parameter).
    pub failed_attempts: u32,
}

/// Outcome counts of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Jobs written to their device.
    pub applied: usize,

    /// Jobs that failed transiently and stay pending.
    pub deferred: usize,

    /// Jobs that failed permanently and were dropped.
    pub discarded: usize,
}

impl DrainReport {
    pub fn is_empty(&self) -> bool {
        self.applied == 0 && self.deferred == 0 && self.discarded == 0
    }
}

#[derive(Debug, Default)]
struct Pending {
    jobs: BTreeMap<JobKey, PendingEntry>,
    next_generation: u64,
}

/// Coalescing queue of pending parameter writes.
///
/// # Examples
///
/// ```
/// use airq_core::Parameter;
/// use airq_sensors::ReconfigQueue;
///
/// let queue = ReconfigQueue::new();
/// queue.enqueue(Parameter::Altitude(100));
/// queue.enqueue(Parameter::Altitude(250));
///
/// let pending = queue.pending();
/// assert_eq!(pending.len(), 1);
/// assert_eq!(pending[0].parameter, Parameter::Altitude(250));
/// ```
#[derive(Debug, Default)]
pub struct ReconfigQueue {
    pending: Mutex<Pending>,
    notify: Notify,
    drain_lock: tokio::sync::Mutex<()>,
}

impl ReconfigQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a parameter write. Never blocks on hardware.
    ///
    /// Returns `true` when an unapplied older value for the same parameter
    /// was replaced.
    pub fn enqueue(&self, parameter: Parameter) -> bool {
        let key = (parameter.device(), parameter.kind());
        let replaced = {
            let mut pending = self.lock();
            pending.next_generation += 1;
            let generation = pending.next_generation;
            pending
                .jobs
                .insert(
                    key,
                    PendingEntry {
                        parameter,
                        generation,
                        failed_attempts: 0,
                    },
                )
                .is_some()
        };

        debug!(device = %key.0, %parameter, replaced, "reconfiguration enqueued");
        self.notify.notify_one();
        replaced
    }

    /// Pending jobs in `(device, parameter)` order.
    pub fn pending(&self) -> Vec<PendingJob> {
        self.lock()
            .jobs
            .iter()
            .map(|(&(device, _), entry)| PendingJob {
                device,
                parameter: entry.parameter,
                failed_attempts: entry.failed_attempts,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().jobs.is_empty()
    }

    /// Attempt every pending write once.
    ///
    /// Drains are serialized. A write that succeeds clears its entry unless
    /// a newer value was enqueued during the write; that newer value stays
    /// pending for the next drain. Transient failures stay pending
    /// indefinitely; permanent ones are dropped.
    pub async fn drain(&self, sensors: &SensorManager) -> DrainReport {
        let _serial = self.drain_lock.lock().await;
        let snapshot: Vec<(JobKey, PendingEntry)> =
            self.lock().jobs.iter().map(|(k, v)| (*k, *v)).collect();

        let mut report = DrainReport::default();
        for ((device, kind), entry) in snapshot {
            let result = sensors.write_parameter(device, entry.parameter).await;

            let mut pending = self.lock();
            let current = pending
                .jobs
                .get(&(device, kind))
                .filter(|current| current.generation == entry.generation)
                .is_some();

            match result {
                Ok(()) => {
                    report.applied += 1;
                    if current {
                        pending.jobs.remove(&(device, kind));
                    }
                }
                Err(err) if err.is_transient() => {
                    report.deferred += 1;
                    if let Some(job) = pending.jobs.get_mut(&(device, kind)) {
                        if current {
                            job.failed_attempts += 1;
                        }
                        warn!(
                            device = %device,
                            parameter = %entry.parameter,
                            failed_attempts = job.failed_attempts,
                            error = %err,
                            "reconfiguration deferred"
                        );
                    }
                }
                Err(err) => {
                    report.discarded += 1;
                    if current {
                        pending.jobs.remove(&(device, kind));
                    }
                    error!(
                        device = %device,
                        parameter = %entry.parameter,
                        error = %err,
                        "reconfiguration discarded"
                    );
                }
            }
        }

        if !report.is_empty() {
            info!(
                applied = report.applied,
                deferred = report.deferred,
                discarded = report.discarded,
                "reconfiguration drain finished"
            );
        }
        report
    }

    /// Drain whenever a job is enqueued, and every `retry_interval` while
    /// jobs remain pending, until `shutdown` turns `true` or its sender is
    /// dropped.
    pub async fn run_drain_task(
        self: Arc<Self>,
        sensors: Arc<SensorManager>,
        retry_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("reconfiguration drain task started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let retry = !self.is_empty();
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = tokio::time::sleep(retry_interval), if retry => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            self.drain(&sensors).await;
        }
        info!("reconfiguration drain task stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_coalesces_per_parameter() {
        let queue = ReconfigQueue::new();
        assert!(!queue.enqueue(Parameter::TemperatureOffset(100)));
        assert!(!queue.enqueue(Parameter::Altitude(5)));
        assert!(queue.enqueue(Parameter::TemperatureOffset(200)));

        assert_eq!(
            queue.pending(),
            vec![
                PendingJob {
                    device: DeviceKind::Co2,
                    parameter: Parameter::TemperatureOffset(200),
                    failed_attempts: 0,
                },
                PendingJob {
                    device: DeviceKind::Co2,
                    parameter: Parameter::Altitude(5),
                    failed_attempts: 0,
                },
            ]
        );
    }

    #[test]
    fn test_jobs_for_different_devices_do_not_coalesce() {
        let queue = ReconfigQueue::new();
        queue.enqueue(Parameter::AutoSelfCalibration(false));
        queue.enqueue(Parameter::CleaningInterval(0));
        assert_eq!(queue.len(), 2);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_drain_report_is_empty() {
        assert!(DrainReport::default().is_empty());
        assert!(
            !DrainReport {
                deferred: 1,
                ..Default::default()
            }
            .is_empty()
        );
    }
}
