//! Shared fixture for read loop tests.

#![allow(dead_code)]

use std::sync::Arc;

use airq_app::{ActionRequests, Orchestrator, OrchestratorConfig, TelemetryPublisher};
use airq_hardware::devices::{AnyCo2Sensor, AnyParticulateSensor, AnyWeatherSensor};
use airq_hardware::mock::{MockSensor, MockSensorHandle};
use airq_hardware::{RawCo2Sample, RawParticulateSample, RawWeatherSample};
use airq_sensors::{ReconfigQueue, SensorManager, SensorManagerConfig};
use airq_settings::{SettingValue, SettingsStore, SettingsValidator};

pub struct Node<P> {
    pub orchestrator: Arc<Orchestrator<P>>,
    pub sensors: Arc<SensorManager>,
    pub queue: Arc<ReconfigQueue>,
    pub validator: SettingsValidator,
    pub actions: Arc<ActionRequests>,
    pub weather: MockSensorHandle<RawWeatherSample>,
    pub co2: MockSensorHandle<RawCo2Sample>,
    pub pm: MockSensorHandle<RawParticulateSample>,
}

/// Mocks, manager, settings and read loop with a short averaging window.
///
/// Devices are left `Uninitialized`; call [`Node::initialize`] or let the
/// first cycle re-initialize them.
pub fn node<P: TelemetryPublisher>(publisher: P, config: OrchestratorConfig) -> Node<P> {
    let (weather, weather_handle) = MockSensor::weather();
    let (co2, co2_handle) = MockSensor::co2();
    let (pm, pm_handle) = MockSensor::particulate();

    let sensors = Arc::new(SensorManager::new(
        SensorManagerConfig::default(),
        AnyWeatherSensor::Mock(weather),
        AnyCo2Sensor::Mock(co2),
        AnyParticulateSensor::Mock(pm),
    ));
    let queue = Arc::new(ReconfigQueue::new());
    let settings = Arc::new(SettingsStore::new());
    let validator = SettingsValidator::new(settings.clone(), queue.clone());
    let actions = Arc::new(ActionRequests::new());

    let status = validator.apply("PM_SENSOR_SAMPLES_PER_MEASUREMENT", SettingValue::Int(2));
    assert!(status.is_accepted());

    let orchestrator = Arc::new(Orchestrator::new(
        sensors.clone(),
        queue.clone(),
        settings,
        actions.clone(),
        publisher,
        config,
    ));

    Node {
        orchestrator,
        sensors,
        queue,
        validator,
        actions,
        weather: weather_handle,
        co2: co2_handle,
        pm: pm_handle,
    }
}

impl<P> Node<P> {
    pub async fn initialize(&self) {
        for (kind, result) in self.sensors.initialize_all().await {
            assert!(result.is_ok(), "{kind} failed to initialize: {result:?}");
        }
    }
}

pub fn co2_sample(co2_ppm: u16) -> RawCo2Sample {
    RawCo2Sample {
        co2_ppm,
        temperature_milli_c: 21_000,
        humidity_milli_rh: 40_000,
    }
}
