//! Shared fixture for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use airq_core::DeviceKind;
use airq_hardware::devices::{AnyCo2Sensor, AnyParticulateSensor, AnyWeatherSensor};
use airq_hardware::mock::{MockSensor, MockSensorHandle};
use airq_hardware::{RawCo2Sample, RawParticulateSample, RawWeatherSample};
use airq_sensors::{SensorManager, SensorManagerConfig};

pub struct Bench {
    pub manager: Arc<SensorManager>,
    pub weather: MockSensorHandle<RawWeatherSample>,
    pub co2: MockSensorHandle<RawCo2Sample>,
    pub pm: MockSensorHandle<RawParticulateSample>,
}

/// Build a manager over fresh mocks and initialize every device.
pub async fn initialized(config: SensorManagerConfig) -> Bench {
    let (weather, weather_handle) = MockSensor::weather();
    let (co2, co2_handle) = MockSensor::co2();
    let (pm, pm_handle) = MockSensor::particulate();

    let manager = Arc::new(SensorManager::new(
        config,
        AnyWeatherSensor::Mock(weather),
        AnyCo2Sensor::Mock(co2),
        AnyParticulateSensor::Mock(pm),
    ));
    for (kind, result) in manager.initialize_all().await {
        assert!(result.is_ok(), "{kind} failed to initialize: {result:?}");
    }

    Bench {
        manager,
        weather: weather_handle,
        co2: co2_handle,
        pm: pm_handle,
    }
}

pub fn fast_config(samples: u32) -> SensorManagerConfig {
    SensorManagerConfig {
        samples_per_measurement: samples,
        ..Default::default()
    }
}

