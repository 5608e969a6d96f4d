//! One read cycle against scripted sensors.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use airq_app::{
    Action, ChannelPublisher, CycleState, OrchestratorConfig, PublishError, TelemetryPublisher,
    TelemetryRecord,
};
use airq_core::{DeviceKind, InitStatus, Parameter};
use airq_hardware::HardwareError;
use airq_hardware::mock::MockOp;
use airq_settings::{SettingStatus, SettingValue};

use common::{co2_sample, node};

#[derive(Debug, Default)]
struct RejectingPublisher {
    calls: AtomicUsize,
}

impl TelemetryPublisher for RejectingPublisher {
    async fn publish(&self, _record: &TelemetryRecord) -> Result<(), PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Closed)
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_cycle_publishes_every_channel() {
    let (publisher, mut rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.initialize().await;
    node.co2.push_sample(co2_sample(612));

    let record = node.orchestrator.run_cycle().await;

    assert!(record.has_weather());
    assert!(record.has_particulate());
    assert_eq!(record.co2_ppm, Some(612));
    assert_eq!(record.warning_indicator, Some(false));
    assert_eq!(rx.recv().await.unwrap(), record);
    assert_eq!(node.orchestrator.state(), CycleState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_failed_particulate_read_keeps_other_channels() {
    let (publisher, mut rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.initialize().await;
    node.pm.fail_always(MockOp::ReadResult, HardwareError::crc("read_measured_values"));

    node.orchestrator.run_cycle().await;
    let record = rx.recv().await.unwrap();

    assert!(record.has_weather());
    assert!(record.has_co2());
    assert!(!record.has_particulate());

    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("tem").is_some());
    assert!(json.get("co2").is_some());
    assert!(json.get("mc_2p5").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_publish_failure_does_not_stop_cycles() {
    let node = node(RejectingPublisher::default(), OrchestratorConfig::default());
    node.initialize().await;

    let first = node.orchestrator.run_cycle().await;
    let second = node.orchestrator.run_cycle().await;

    assert!(first.has_co2());
    assert!(second.has_co2());
    assert_eq!(node.orchestrator.publisher().calls.load(Ordering::SeqCst), 2);
    assert_eq!(node.orchestrator.state(), CycleState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_failed_device_reinitialized_next_cycle() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.co2.set_identity(None);

    for (kind, result) in node.sensors.initialize_all().await {
        assert_eq!(result.is_ok(), kind != DeviceKind::Co2);
    }
    assert_eq!(node.sensors.status(DeviceKind::Co2), InitStatus::Failed);

    let record = node.orchestrator.run_cycle().await;
    assert!(!record.has_co2());
    assert!(record.has_weather());

    node.co2.set_identity(Some(
        airq_hardware::DeviceInfo::new("SCD41", "SCD4x").with_serial_number("0x8a3c6e1b07f4"),
    ));
    let record = node.orchestrator.run_cycle().await;
    assert_eq!(node.sensors.status(DeviceKind::Co2), InitStatus::Ready);
    assert!(record.has_co2());
}

#[tokio::test(start_paused = true)]
async fn test_reinit_disabled_leaves_device_failed() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(
        publisher,
        OrchestratorConfig {
            reinit_failed_devices: false,
        },
    );
    node.co2.set_identity(None);
    node.sensors.initialize_all().await;
    let probes = node.co2.count(MockOp::Identify);

    node.co2.set_identity(Some(
        airq_hardware::DeviceInfo::new("SCD41", "SCD4x").with_serial_number("0x8a3c6e1b07f4"),
    ));
    let record = node.orchestrator.run_cycle().await;

    assert!(!record.has_co2());
    assert_eq!(node.sensors.status(DeviceKind::Co2), InitStatus::Failed);
    assert_eq!(node.co2.count(MockOp::Identify), probes);
}

#[tokio::test(start_paused = true)]
async fn test_uninitialized_devices_come_up_on_first_cycle() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());

    let record = node.orchestrator.run_cycle().await;

    for kind in DeviceKind::ALL {
        assert_eq!(node.sensors.status(kind), InitStatus::Ready);
    }
    assert!(record.has_weather() && record.has_co2() && record.has_particulate());
}

#[tokio::test(start_paused = true)]
async fn test_clean_action_runs_once() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.initialize().await;

    node.actions.request("clean_pm_sensor");
    node.actions.request("clean_pm_sensor");
    node.orchestrator.run_cycle().await;
    node.orchestrator.run_cycle().await;

    assert_eq!(node.pm.count(MockOp::FanCleaning), 1);
    assert!(!node.actions.is_pending(Action::CleanPmSensor));
}

#[tokio::test(start_paused = true)]
async fn test_setting_change_reaches_hardware_during_cycle() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.initialize().await;

    assert_eq!(
        node.validator.apply("CO2_SENSOR_ALTITUDE", SettingValue::Int(350)),
        SettingStatus::Accepted
    );
    assert_eq!(node.queue.len(), 1);

    node.orchestrator.run_cycle().await;

    assert!(node.queue.is_empty());
    assert_eq!(node.co2.writes(), vec![Parameter::Altitude(350)]);
}

#[tokio::test(start_paused = true)]
async fn test_co2_warning_follows_threshold_setting() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.initialize().await;

    node.co2.push_sample(co2_sample(1_500));
    let record = node.orchestrator.run_cycle().await;
    assert_eq!(record.warning_indicator, Some(true));

    node.validator
        .apply("CO2_WARNING_THRESHOLD_PPM", SettingValue::Int(2_000));
    node.co2.push_sample(co2_sample(1_500));
    let record = node.orchestrator.run_cycle().await;
    assert_eq!(record.warning_indicator, Some(false));

    node.co2.fail_next(MockOp::ReadResult, HardwareError::nack("read_measurement"));
    let record = node.orchestrator.run_cycle().await;
    assert_eq!(record.warning_indicator, None);
}

#[tokio::test(start_paused = true)]
async fn test_cycle_state_sequence() {
    let (publisher, _rx) = ChannelPublisher::channel(4);
    let node = node(publisher, OrchestratorConfig::default());
    node.initialize().await;

    let mut states = node.orchestrator.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            seen.push(state);
            if state == CycleState::Idle {
                break;
            }
        }
        seen
    });

    node.orchestrator.run_cycle().await;
    let seen = observer.await.unwrap();

    assert_eq!(seen.first(), Some(&CycleState::Reading));
    assert_eq!(seen.last(), Some(&CycleState::Idle));
}
