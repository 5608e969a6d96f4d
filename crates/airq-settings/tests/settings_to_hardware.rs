//! Integration tests for the path from an accepted setting to a device write.

use std::sync::Arc;
use std::time::Duration;

use airq_core::{DeviceKind, Parameter};
use airq_hardware::devices::{AnyCo2Sensor, AnyParticulateSensor, AnyWeatherSensor};
use airq_hardware::mock::MockSensor;
use airq_sensors::{ReconfigQueue, SensorManager, SensorManagerConfig};
use airq_settings::{SettingStatus, SettingValue, SettingsStore, SettingsValidator};

#[tokio::test(start_paused = true)]
async fn test_accepted_settings_reach_devices_after_drain() {
    let (weather, _) = MockSensor::weather();
    let (co2, co2_handle) = MockSensor::co2();
    let (pm, pm_handle) = MockSensor::particulate();
    let manager = SensorManager::new(
        SensorManagerConfig::default(),
        AnyWeatherSensor::Mock(weather),
        AnyCo2Sensor::Mock(co2),
        AnyParticulateSensor::Mock(pm),
    );
    manager.initialize_all().await;

    let queue = Arc::new(ReconfigQueue::new());
    let validator = SettingsValidator::new(Arc::new(SettingsStore::new()), Arc::clone(&queue));

    assert_eq!(validator.seed_hardware(), 4);
    queue.drain(&manager).await;
    assert_eq!(co2_handle.writes().len(), 3);
    assert_eq!(pm_handle.writes(), vec![Parameter::CleaningInterval(604_800)]);

    // Two updates to the same key before the next drain: one write, last value.
    assert_eq!(
        validator.apply("CO2_SENSOR_TEMPERATURE_OFFSET", SettingValue::Int(1_500)),
        SettingStatus::Accepted
    );
    assert_eq!(
        validator.apply("CO2_SENSOR_TEMPERATURE_OFFSET", SettingValue::Int(2_500)),
        SettingStatus::Accepted
    );
    // Rejected values never reach the queue.
    assert_eq!(
        validator.apply("CO2_SENSOR_ASC_ENABLE", SettingValue::from("yes")),
        SettingStatus::FormatInvalid
    );

    let report = queue.drain(&manager).await;
    assert_eq!(report.applied, 1);
    assert_eq!(
        co2_handle.writes().last(),
        Some(&Parameter::TemperatureOffset(2_500))
    );
    assert_eq!(co2_handle.writes().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_apply_does_not_wait_for_busy_device() {
    let (weather, _) = MockSensor::weather();
    let (co2, _) = MockSensor::co2();
    let (pm, _) = MockSensor::particulate();
    let manager = Arc::new(SensorManager::new(
        SensorManagerConfig::default(),
        AnyWeatherSensor::Mock(weather),
        AnyCo2Sensor::Mock(co2),
        AnyParticulateSensor::Mock(pm),
    ));
    manager.initialize(DeviceKind::Co2).await.unwrap();

    let reader = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.read(DeviceKind::Co2).await })
    };
    tokio::task::yield_now().await;

    // The CO₂ guard is held for the whole 5 s measurement; accepting a new
    // altitude must not take any (virtual) time at all.
    let queue = Arc::new(ReconfigQueue::new());
    let validator = SettingsValidator::new(Arc::new(SettingsStore::new()), Arc::clone(&queue));
    let started = tokio::time::Instant::now();
    assert_eq!(
        validator.apply("CO2_SENSOR_ALTITUDE", SettingValue::Int(800)),
        SettingStatus::Accepted
    );
    assert!(started.elapsed() < Duration::from_millis(1));
    assert_eq!(queue.len(), 1);

    reader.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_malformed_values_are_reported_per_key() {
    let (weather, _) = MockSensor::weather();
    let (co2, co2_handle) = MockSensor::co2();
    let (pm, pm_handle) = MockSensor::particulate();
    let manager = SensorManager::new(
        SensorManagerConfig::default(),
        AnyWeatherSensor::Mock(weather),
        AnyCo2Sensor::Mock(co2),
        AnyParticulateSensor::Mock(pm),
    );
    manager.initialize_all().await;

    let queue = Arc::new(ReconfigQueue::new());
    let store = Arc::new(SettingsStore::new());
    let validator = SettingsValidator::new(Arc::clone(&store), Arc::clone(&queue));

    let statuses = validator
        .apply_json(
            r#"{
                "LOOP_DELAY_S": 120,
                "CO2_SENSOR_ALTITUDE": null,
                "UNKNOWN_KEY": {"a": 1},
                "PM_SENSOR_AUTO_CLEANING_INTERVAL": 18446744073709551615,
                "CO2_SENSOR_ASC_ENABLE": [true],
                "CO2_SENSOR_TEMPERATURE_OFFSET": 250
            }"#,
        )
        .unwrap();

    assert_eq!(
        statuses,
        vec![
            ("LOOP_DELAY_S".to_string(), SettingStatus::Accepted),
            ("CO2_SENSOR_ALTITUDE".to_string(), SettingStatus::FormatInvalid),
            ("UNKNOWN_KEY".to_string(), SettingStatus::KeyNotRecognized),
            ("PM_SENSOR_AUTO_CLEANING_INTERVAL".to_string(), SettingStatus::OutOfRange),
            ("CO2_SENSOR_ASC_ENABLE".to_string(), SettingStatus::FormatInvalid),
            ("CO2_SENSOR_TEMPERATURE_OFFSET".to_string(), SettingStatus::Accepted),
        ]
    );
    assert_eq!(store.loop_delay(), Duration::from_secs(120));

    // Only the accepted hardware setting reaches a device.
    queue.drain(&manager).await;
    assert_eq!(co2_handle.writes(), vec![Parameter::TemperatureOffset(250)]);
    assert!(pm_handle.writes().is_empty());
}
