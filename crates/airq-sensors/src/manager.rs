//! Sensor manager.
//!
//! The [`SensorManager`] owns one [`DeviceHandle`] per physical sensor and is
//! the only path to the bus. It is constructed once at startup and shared by
//! `Arc` between the read loop, the reconfiguration drain task and the
//! one-shot action path.
//!
//! # Guard scope
//!
//! ```text
//!   initialize(co2)   ├──────────── guard ─────────────┤
//!                     power-up  wake  identify  discard
//!
//!   read(co2)         ├──── guard ────┤
//!                     start settle poll… read
//!
//!   read(particulate) ├─ sample 1 ─┤ pause ├─ sample 2 ─┤ pause …
//!                                     ▲
//!                          other callers may take the guard here
//! ```
//!
//! The averaged particulate read releases the guard between samples, so a
//! parameter write or a fan cleaning can interleave without ever overlapping
//! a sample's own command sequence.
//!
//! # Examples
//!
//! ```
//! use airq_core::{DeviceKind, Measurement};
//! use airq_hardware::devices::{AnyCo2Sensor, AnyParticulateSensor, AnyWeatherSensor};
//! use airq_hardware::mock::MockSensor;
//! use airq_sensors::{SensorManager, SensorManagerConfig};
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> airq_sensors::Result<()> {
//!     let (weather, _) = MockSensor::weather();
//!     let (co2, _) = MockSensor::co2();
//!     let (pm, _) = MockSensor::particulate();
//!
//!     let manager = SensorManager::new(
//!         SensorManagerConfig::default(),
//!         AnyWeatherSensor::Mock(weather),
//!         AnyCo2Sensor::Mock(co2),
//!         AnyParticulateSensor::Mock(pm),
//!     );
//!
//!     manager.initialize(DeviceKind::Weather).await?;
//!     let reading = manager.read(DeviceKind::Weather).await?;
//!     assert!(matches!(reading, Measurement::Weather(_)));
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use airq_core::{
    Co2Measurement, DeviceKind, InitStatus, Measurement, Parameter, ParticulateMeasurement,
    WeatherMeasurement,
};
use airq_hardware::devices::{AnyCo2Sensor, AnyParticulateSensor, AnyWeatherSensor};
use airq_hardware::{DeviceInfo, FanCleaning, SensorDriver};
use tracing::{debug, error, info, warn};

use crate::averaging::ParticulateAccumulator;
use crate::convert;
use crate::error::{Result, SensorError};
use crate::guard::{DeviceHandle, DeviceState, Reading};
use crate::polling::{probe_identity, wait_until_ready};
use crate::profile::DeviceProfile;

/// Default number of particulate samples averaged per read.
pub const DEFAULT_SAMPLES_PER_MEASUREMENT: u32 = 30;

/// Configuration for the sensor manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorManagerConfig {
    pub weather: DeviceProfile,
    pub co2: DeviceProfile,
    pub particulate: DeviceProfile,

    /// Particulate samples averaged per read; adjustable at runtime.
    pub samples_per_measurement: u32,
}

impl SensorManagerConfig {
    pub fn profile(&self, kind: DeviceKind) -> &DeviceProfile {
        match kind {
            DeviceKind::Weather => &self.weather,
            DeviceKind::Co2 => &self.co2,
            DeviceKind::Particulate => &self.particulate,
        }
    }
}

impl Default for SensorManagerConfig {
    fn default() -> Self {
        Self {
            weather: DeviceProfile::weather(),
            co2: DeviceProfile::co2(),
            particulate: DeviceProfile::particulate(),
            samples_per_measurement: DEFAULT_SAMPLES_PER_MEASUREMENT,
        }
    }
}

/// Serialized access to the three sensors on the shared bus.
#[derive(Debug)]
pub struct SensorManager {
    config: SensorManagerConfig,
    weather: DeviceHandle<AnyWeatherSensor>,
    co2: DeviceHandle<AnyCo2Sensor>,
    particulate: DeviceHandle<AnyParticulateSensor>,
    samples_per_measurement: AtomicU32,
}

impl SensorManager {
    /// Create a manager. Every device starts `Uninitialized`.
    pub fn new(
        config: SensorManagerConfig,
        weather: AnyWeatherSensor,
        co2: AnyCo2Sensor,
        particulate: AnyParticulateSensor,
    ) -> Self {
        Self {
            weather: DeviceHandle::new(
                DeviceKind::Weather,
                weather,
                config.weather.acquire_timeout(),
            ),
            co2: DeviceHandle::new(DeviceKind::Co2, co2, config.co2.acquire_timeout()),
            particulate: DeviceHandle::new(
                DeviceKind::Particulate,
                particulate,
                config.particulate.acquire_timeout(),
            ),
            samples_per_measurement: AtomicU32::new(config.samples_per_measurement.max(1)),
            config,
        }
    }

    pub fn config(&self) -> &SensorManagerConfig {
        &self.config
    }

    fn state(&self, kind: DeviceKind) -> &DeviceState {
        match kind {
            DeviceKind::Weather => self.weather.state(),
            DeviceKind::Co2 => self.co2.state(),
            DeviceKind::Particulate => self.particulate.state(),
        }
    }

    /// Current initialization status of `kind`.
    pub fn status(&self, kind: DeviceKind) -> InitStatus {
        self.state(kind).status()
    }

    /// Last successful reading of `kind`, if any.
    pub fn last_reading(&self, kind: DeviceKind) -> Option<Reading> {
        self.state(kind).last_reading()
    }

    /// Number of particulate samples the next read will average.
    pub fn samples_per_measurement(&self) -> u32 {
        self.samples_per_measurement.load(Ordering::Relaxed)
    }

    /// Change the averaging window. Takes effect on the next particulate read.
    pub fn set_samples_per_measurement(&self, samples: u32) {
        self.samples_per_measurement
            .store(samples.max(1), Ordering::Relaxed);
    }

    fn ensure_ready(&self, kind: DeviceKind) -> Result<()> {
        match self.status(kind) {
            InitStatus::Ready => Ok(()),
            status => Err(SensorError::NotReady {
                device: kind,
                status,
            }),
        }
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Run the device-specific wake, identity and warm-up sequence.
    ///
    /// The device status becomes `Ready` on success and `Failed` otherwise.
    /// Calling it again on a `Failed` or `Ready` device re-runs the sequence.
    pub async fn initialize(&self, kind: DeviceKind) -> Result<DeviceInfo> {
        let result = match kind {
            DeviceKind::Weather => self.initialize_weather().await,
            DeviceKind::Co2 => self.initialize_co2().await,
            DeviceKind::Particulate => self.initialize_particulate().await,
        };

        match &result {
            Ok(info) => {
                self.state(kind).set_status(InitStatus::Ready);
                info!(
                    device = %kind,
                    name = %info.name,
                    serial = info.serial_number.as_deref().unwrap_or("-"),
                    firmware = info.firmware_version.as_deref().unwrap_or("-"),
                    "device initialized"
                );
            }
            Err(err) => {
                self.state(kind).set_status(InitStatus::Failed);
                error!(device = %kind, error = %err, "device initialization failed");
            }
        }
        result
    }

    /// Initialize every device in read order. Failures are recorded in the
    /// device status and do not stop the remaining devices.
    pub async fn initialize_all(&self) -> Vec<(DeviceKind, Result<DeviceInfo>)> {
        let mut results = Vec::with_capacity(DeviceKind::ALL.len());
        for kind in DeviceKind::ALL {
            results.push((kind, self.initialize(kind).await));
        }
        results
    }

    async fn initialize_weather(&self) -> Result<DeviceInfo> {
        let mut sensor = self.weather.lock().await?;
        let to_err = SensorError::transport(DeviceKind::Weather);

        sensor.wake().await.map_err(&to_err)?;
        sensor.identify().await.map_err(&to_err)
    }

    async fn initialize_co2(&self) -> Result<DeviceInfo> {
        let profile = &self.config.co2;
        let mut sensor = self.co2.lock().await?;
        let to_err = SensorError::transport(DeviceKind::Co2);

        sleep_ms(profile.power_up_delay_ms).await;
        sensor.wake().await.map_err(&to_err)?;
        sleep_ms(profile.reset_delay_ms).await;

        let info = probe_identity(&mut *sensor, &profile.probe_policy()).await?;
        require_serial(DeviceKind::Co2, &info)?;

        // The first single-shot result after re-init is unreliable.
        sensor.start().await.map_err(&to_err)?;
        wait_until_ready(&mut *sensor, &profile.poll_policy()).await?;
        let discarded = sensor.read_result().await.map_err(&to_err)?;
        debug!(
            device = %DeviceKind::Co2,
            co2_ppm = discarded.co2_ppm,
            "discarded first reading"
        );

        Ok(info)
    }

    async fn initialize_particulate(&self) -> Result<DeviceInfo> {
        let profile = &self.config.particulate;
        let mut sensor = self.particulate.lock().await?;
        let to_err = SensorError::transport(DeviceKind::Particulate);

        sleep_ms(profile.power_up_delay_ms).await;
        // The reset is not acknowledged reliably; the identity probe below
        // is what proves the device came back.
        if let Err(err) = sensor.wake().await {
            debug!(device = %DeviceKind::Particulate, error = %err, "reset not acknowledged");
        }
        sleep_ms(profile.reset_delay_ms).await;

        let info = probe_identity(&mut *sensor, &profile.probe_policy()).await?;
        require_serial(DeviceKind::Particulate, &info)?;

        sensor.start().await.map_err(&to_err)?;
        debug!(
            device = %DeviceKind::Particulate,
            stabilize_ms = profile.stabilize_ms,
            "measurement mode entered, stabilizing"
        );
        sleep_ms(profile.stabilize_ms).await;

        Ok(info)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Read one measurement from `kind`.
    ///
    /// On success the value also becomes the device's last reading.
    ///
    /// # Errors
    ///
    /// - [`SensorError::NotReady`] if the device is not initialized
    /// - [`SensorError::BusBusy`] if the guard cannot be acquired in time
    /// - [`SensorError::Timeout`] if data-ready never asserts
    /// - [`SensorError::Transport`] if a bus command fails
    pub async fn read(&self, kind: DeviceKind) -> Result<Measurement> {
        self.ensure_ready(kind)?;

        let measurement = match kind {
            DeviceKind::Weather => Measurement::Weather(self.read_weather().await?),
            DeviceKind::Co2 => Measurement::Co2(self.read_co2().await?),
            DeviceKind::Particulate => Measurement::Particulate(self.read_particulate().await?),
        };

        self.state(kind).record(measurement);
        debug!(device = %kind, ?measurement, "read complete");
        Ok(measurement)
    }

    async fn read_weather(&self) -> Result<WeatherMeasurement> {
        let mut sensor = self.weather.lock().await?;
        let raw = acquire_sample(&mut *sensor, &self.config.weather).await?;
        Ok(convert::weather(&raw))
    }

    async fn read_co2(&self) -> Result<Co2Measurement> {
        let raw = {
            let mut sensor = self.co2.lock().await?;
            acquire_sample(&mut *sensor, &self.config.co2).await?
        };
        convert::co2(&raw)
    }

    /// Average `samples_per_measurement` particulate samples.
    ///
    /// Each sample is its own guarded section; the pause between samples is
    /// spent without the guard. Any failing sample fails the whole read, so
    /// callers never observe a partial average.
    async fn read_particulate(&self) -> Result<ParticulateMeasurement> {
        let profile = &self.config.particulate;
        let samples = self.samples_per_measurement();
        let mut accumulator = ParticulateAccumulator::new();

        for index in 0..samples {
            if index > 0 {
                sleep_ms(profile.inter_sample_ms).await;
            }

            let raw = {
                let mut sensor = self.particulate.lock().await?;
                acquire_sample(&mut *sensor, profile).await?
            };
            accumulator.push(&convert::particulate(&raw));
        }

        accumulator.mean().ok_or(SensorError::InvalidSample {
            device: DeviceKind::Particulate,
            reason: "no samples averaged".to_string(),
        })
    }

    // ========================================================================
    // Writes and actions
    // ========================================================================

    /// Write one calibration or configuration parameter to `device`.
    ///
    /// # Errors
    ///
    /// - [`SensorError::UnsupportedParameter`] if the parameter belongs to another device
    /// - [`SensorError::NotReady`] if the device is not initialized
    /// - [`SensorError::BusBusy`] / [`SensorError::Transport`] as for reads
    pub async fn write_parameter(&self, device: DeviceKind, parameter: Parameter) -> Result<()> {
        if parameter.device() != device {
            return Err(SensorError::UnsupportedParameter {
                device,
                parameter: parameter.kind(),
            });
        }
        self.ensure_ready(device)?;

        let to_err = SensorError::transport(device);
        match device {
            DeviceKind::Weather => {
                let mut sensor = self.weather.lock().await?;
                sensor.write_param(parameter).await.map_err(to_err)?;
            }
            DeviceKind::Co2 => {
                let mut sensor = self.co2.lock().await?;
                sensor.write_param(parameter).await.map_err(to_err)?;
            }
            DeviceKind::Particulate => {
                let mut sensor = self.particulate.lock().await?;
                sensor.write_param(parameter).await.map_err(to_err)?;
            }
        }

        info!(device = %device, %parameter, "parameter written");
        Ok(())
    }

    /// Run a manual fan cleaning on the particulate sensor.
    ///
    /// The guard is held for the whole cleaning so no sample is taken while
    /// the fan runs at full speed.
    pub async fn clean_fan(&self) -> Result<()> {
        let device = DeviceKind::Particulate;
        self.ensure_ready(device)?;

        let profile = &self.config.particulate;
        let mut sensor = self.particulate.lock().await?;
        sensor
            .start_fan_cleaning()
            .await
            .map_err(SensorError::transport(device))?;
        info!(device = %device, duration_ms = profile.fan_cleaning_ms, "fan cleaning started");
        sleep_ms(profile.fan_cleaning_ms).await;
        debug!(device = %device, "fan cleaning finished");
        Ok(())
    }
}

/// One complete acquisition: start, bounded data-ready wait, fetch.
///
/// The caller holds the device guard.
async fn acquire_sample<D: SensorDriver>(
    driver: &mut D,
    profile: &DeviceProfile,
) -> Result<D::Sample> {
    let to_err = SensorError::transport(driver.kind());
    driver.start().await.map_err(&to_err)?;
    wait_until_ready(driver, &profile.poll_policy()).await?;
    driver.read_result().await.map_err(&to_err)
}

fn require_serial(device: DeviceKind, info: &DeviceInfo) -> Result<()> {
    match info.serial_number.as_deref() {
        Some(serial) if !serial.is_empty() => Ok(()),
        _ => {
            warn!(device = %device, name = %info.name, "identity probe returned no serial number");
            Err(SensorError::IdentityMismatch {
                device,
                reason: format!("{} reported no serial number", info.name),
            })
        }
    }
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
