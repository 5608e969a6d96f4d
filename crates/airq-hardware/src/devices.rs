//! Enum wrappers for sensor driver dispatch.
//!
//! [`SensorDriver`] uses `impl Future` returns and cannot be boxed, so the
//! acquisition layer holds one of these enums per device instead.
//!
//! # Examples
//!
//! ```
//! use airq_hardware::devices::AnyCo2Sensor;
//! use airq_hardware::mock::MockSensor;
//!
//! let (sensor, _handle) = MockSensor::co2();
//! let sensor = AnyCo2Sensor::Mock(sensor);
//! ```

use airq_core::{DeviceKind, Parameter};

use crate::mock::{MockCo2, MockParticulate, MockWeather};
use crate::traits::{FanCleaning, SensorDriver};
use crate::{DeviceInfo, RawCo2Sample, RawParticulateSample, RawWeatherSample, Result};

/// Enum wrapper for the temperature/pressure/humidity sensor.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyWeatherSensor {
    /// Mock sensor for development and testing.
    Mock(MockWeather),
}

/// Enum wrapper for the CO₂ sensor.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCo2Sensor {
    /// Mock sensor for development and testing.
    Mock(MockCo2),
}

/// Enum wrapper for the particulate-matter sensor.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyParticulateSensor {
    /// Mock sensor for development and testing.
    Mock(MockParticulate),
}

macro_rules! dispatch_sensor_driver {
    ($wrapper:ident, $sample:ty) => {
        impl SensorDriver for $wrapper {
            type Sample = $sample;

            fn kind(&self) -> DeviceKind {
                match self {
                    Self::Mock(device) => device.kind(),
                }
            }

            async fn wake(&mut self) -> Result<()> {
                match self {
                    Self::Mock(device) => device.wake().await,
                }
            }

            async fn identify(&mut self) -> Result<DeviceInfo> {
                match self {
                    Self::Mock(device) => device.identify().await,
                }
            }

            async fn start(&mut self) -> Result<()> {
                match self {
                    Self::Mock(device) => device.start().await,
                }
            }

            async fn poll_ready(&mut self) -> Result<bool> {
                match self {
                    Self::Mock(device) => device.poll_ready().await,
                }
            }

            async fn read_result(&mut self) -> Result<$sample> {
                match self {
                    Self::Mock(device) => device.read_result().await,
                }
            }

            async fn write_param(&mut self, parameter: Parameter) -> Result<()> {
                match self {
                    Self::Mock(device) => device.write_param(parameter).await,
                }
            }
        }
    };
}

dispatch_sensor_driver!(AnyWeatherSensor, RawWeatherSample);
dispatch_sensor_driver!(AnyCo2Sensor, RawCo2Sample);
dispatch_sensor_driver!(AnyParticulateSensor, RawParticulateSample);

impl FanCleaning for AnyParticulateSensor {
    async fn start_fan_cleaning(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.start_fan_cleaning().await,
        }
    }
}
