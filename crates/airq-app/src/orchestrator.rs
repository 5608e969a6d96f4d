//! Periodic read loop.
//!
//! Each cycle moves `Idle → Reading → Publishing → Idle`:
//!
//! 1. pending reconfiguration jobs and one-shot actions are serviced,
//! 2. failed devices are re-initialized (when enabled),
//! 3. the three devices are read in a fixed order, a failed read leaving its
//!    channels absent from the record,
//! 4. the record is published, a publish failure being logged only,
//! 5. pending work is serviced again.
//!
//! Between cycles the loop sleeps until `end of last cycle + LOOP_DELAY_S`.
//! A change of `LOOP_DELAY_S` wakes it so the deadline is recomputed with the
//! new delay instead of waiting out the old one.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use airq_core::{DeviceKind, InitStatus};
use airq_sensors::{ReconfigQueue, SensorManager};
use airq_settings::SettingsStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::actions::{Action, ActionRequests};
use crate::telemetry::{TelemetryPublisher, TelemetryRecord};

/// Phase of the read loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CycleState {
    #[default]
    Idle,
    Reading,
    Publishing,
}

impl CycleState {
    /// Check if transition to another state is valid.
    ///
    /// # Valid Transitions
    ///
    /// - `Idle` → `Reading`
    /// - `Reading` → `Publishing`
    /// - `Publishing` → `Idle`
    ///
    /// ```
    /// use airq_app::orchestrator::CycleState;
    ///
    /// assert!(CycleState::Idle.can_transition_to(CycleState::Reading));
    /// assert!(!CycleState::Idle.can_transition_to(CycleState::Publishing));
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Reading)
                | (Self::Reading, Self::Publishing)
                | (Self::Publishing, Self::Idle)
        )
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Reading => write!(f, "Reading"),
            Self::Publishing => write!(f, "Publishing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Retry `initialize` for devices that are not `Ready` at cycle start.
    pub reinit_failed_devices: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            reinit_failed_devices: true,
        }
    }
}

/// Drives read cycles and hands records to a [`TelemetryPublisher`].
#[derive(Debug)]
pub struct Orchestrator<P> {
    sensors: Arc<SensorManager>,
    queue: Arc<ReconfigQueue>,
    settings: Arc<SettingsStore>,
    actions: Arc<ActionRequests>,
    publisher: P,
    config: OrchestratorConfig,
    state: watch::Sender<CycleState>,
    warning: Mutex<Option<bool>>,
}

impl<P: TelemetryPublisher> Orchestrator<P> {
    pub fn new(
        sensors: Arc<SensorManager>,
        queue: Arc<ReconfigQueue>,
        settings: Arc<SettingsStore>,
        actions: Arc<ActionRequests>,
        publisher: P,
        config: OrchestratorConfig,
    ) -> Self {
        let (state, _) = watch::channel(CycleState::Idle);
        Self {
            sensors,
            queue,
            settings,
            actions,
            publisher,
            config,
            state,
            warning: Mutex::new(None),
        }
    }

    /// Follow the cycle state.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> CycleState {
        *self.state.borrow()
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    fn transition(&self, next: CycleState) {
        self.state.send_if_modified(|current| {
            debug_assert!(
                current.can_transition_to(next),
                "invalid cycle transition {current} -> {next}"
            );
            trace!(from = %current, to = %next, "cycle state");
            *current = next;
            true
        });
    }

    /// Apply queued reconfiguration and consume one-shot actions.
    async fn service_pending(&self) {
        if !self.queue.is_empty() {
            self.queue.drain(&self.sensors).await;
        }

        if self.actions.take(Action::CleanPmSensor) {
            match self.sensors.clean_fan().await {
                Ok(()) => info!(action = %Action::CleanPmSensor, "action completed"),
                Err(err) => warn!(
                    action = %Action::CleanPmSensor,
                    error = %err,
                    "action failed"
                ),
            }
        }
    }

    async fn reinit_failed(&self) {
        for kind in DeviceKind::ALL {
            let status = self.sensors.status(kind);
            if status == InitStatus::Ready {
                continue;
            }
            debug!(device = %kind, %status, "re-initializing device");
            if let Err(err) = self.sensors.initialize(kind).await {
                warn!(device = %kind, error = %err, "re-initialization failed");
            }
        }
    }

    fn evaluate_warning(&self, record: &mut TelemetryRecord) {
        let Some(co2_ppm) = record.co2_ppm else {
            return;
        };
        let threshold = self.settings.co2_warning_threshold_ppm();
        let raised = co2_ppm >= threshold;
        record.warning_indicator = Some(raised);

        let previous = self
            .warning
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(raised);
        match (previous, raised) {
            (None | Some(false), true) => warn!(co2_ppm, threshold, "CO2 warning raised"),
            (Some(true), false) => info!(co2_ppm, threshold, "CO2 warning cleared"),
            _ => {}
        }
    }

    /// Run one full cycle and return the record handed to the publisher.
    pub async fn run_cycle(&self) -> TelemetryRecord {
        let started = Instant::now();
        self.transition(CycleState::Reading);
        self.service_pending().await;

        if self.config.reinit_failed_devices {
            self.reinit_failed().await;
        }

        self.sensors
            .set_samples_per_measurement(self.settings.samples_per_measurement());

        let mut record = TelemetryRecord::new(Utc::now());
        for kind in DeviceKind::ALL {
            match self.sensors.read(kind).await {
                Ok(measurement) => record.insert(&measurement),
                Err(err) => warn!(device = %kind, error = %err, "read failed, channels omitted"),
            }
        }
        self.evaluate_warning(&mut record);

        self.transition(CycleState::Publishing);
        if let Err(err) = self.publisher.publish(&record).await {
            error!(error = %err, "telemetry publish failed");
        }

        self.transition(CycleState::Idle);
        self.service_pending().await;

        info!(
            weather = record.has_weather(),
            co2 = record.has_co2(),
            particulate = record.has_particulate(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "read cycle finished"
        );
        record
    }

    /// Run cycles until `shutdown` turns `true` or its sender is dropped.
    ///
    /// Shutdown is observed between cycles; a cycle in progress completes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(loop_delay_s = self.settings.loop_delay().as_secs(), "read loop started");
        'cycles: loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;
            let cycle_end = Instant::now();

            loop {
                let deadline = cycle_end + self.settings.loop_delay();
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => break,
                    _ = self.settings.rescheduled() => {
                        debug!(
                            loop_delay_s = self.settings.loop_delay().as_secs(),
                            "read loop rescheduled"
                        );
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break 'cycles;
                        }
                    }
                }
            }
        }
        info!("read loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_transitions() {
        use CycleState::*;
        assert!(Idle.can_transition_to(Reading));
        assert!(Reading.can_transition_to(Publishing));
        assert!(Publishing.can_transition_to(Idle));

        assert!(!Idle.can_transition_to(Idle));
        assert!(!Reading.can_transition_to(Idle));
        assert!(!Publishing.can_transition_to(Reading));
    }

    #[test]
    fn test_display() {
        assert_eq!(CycleState::Publishing.to_string(), "Publishing");
        assert_eq!(CycleState::default(), CycleState::Idle);
    }
}
