//! Raw values exchanged with device driver adapters.
//!
//! Samples here are in the units the devices report on the wire. Conversion
//! to engineering units happens in the acquisition layer.

use serde::{Deserialize, Serialize};

/// Generic device information returned by an identity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "SCD41").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Device serial number, when the device exposes one.
    pub serial_number: Option<String>,

    /// Firmware version string, when the device exposes one.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
            firmware_version: None,
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Compensated weather sample as produced by the BME280 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawWeatherSample {
    /// Temperature in hundredths of a degree Celsius.
    pub temperature_centi_c: i32,

    /// Pressure in pascal.
    pub pressure_pa: u32,

    /// Relative humidity in thousandths of a percent.
    pub humidity_milli_rh: u32,
}

/// Single-shot CO₂ sample as produced by the SCD4x driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawCo2Sample {
    pub co2_ppm: u16,
    pub temperature_milli_c: i32,
    pub humidity_milli_rh: i32,
}

/// Particulate sample as produced by the SPS30 driver in float output mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawParticulateSample {
    pub mc_1p0: f32,
    pub mc_2p5: f32,
    pub mc_4p0: f32,
    pub mc_10p0: f32,
    pub nc_0p5: f32,
    pub nc_1p0: f32,
    pub nc_2p5: f32,
    pub nc_4p0: f32,
    pub nc_10p0: f32,
    pub typical_particle_size: f32,
}
