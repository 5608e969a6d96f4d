use crate::{Result, constants::PM_CHANNEL_COUNT, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One physical sensor on the shared bus.
///
/// The declaration order is the fixed order in which a read cycle visits the
/// devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Temperature, pressure and humidity sensor.
    Weather,

    /// CO₂ concentration sensor.
    Co2,

    /// Particulate-matter sensor.
    Particulate,
}

impl DeviceKind {
    /// All devices, in read-cycle order.
    pub const ALL: [DeviceKind; 3] = [
        DeviceKind::Weather,
        DeviceKind::Co2,
        DeviceKind::Particulate,
    ];

    /// Short lowercase name used in logs and configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Weather => "weather",
            DeviceKind::Co2 => "co2",
            DeviceKind::Particulate => "particulate",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weather" => Ok(DeviceKind::Weather),
            "co2" => Ok(DeviceKind::Co2),
            "particulate" | "pm" => Ok(DeviceKind::Particulate),
            _ => Err(Error::UnknownDevice(s.to_string())),
        }
    }
}

/// Initialization status of a device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStatus {
    #[default]
    Uninitialized,
    Ready,
    Failed,
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InitStatus::Uninitialized => "Uninitialized",
            InitStatus::Ready => "Ready",
            InitStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Weather reading in engineering units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherMeasurement {
    /// Ambient temperature (°C).
    pub temperature_c: f64,

    /// Barometric pressure (kPa).
    pub pressure_kpa: f64,

    /// Relative humidity (%RH).
    pub humidity_rh: f64,
}

/// CO₂ reading in engineering units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Co2Measurement {
    /// CO₂ concentration (ppm).
    pub co2_ppm: u16,

    /// Temperature measured by the CO₂ sensor (°C).
    pub temperature_c: f64,

    /// Relative humidity measured by the CO₂ sensor (%RH).
    pub humidity_rh: f64,
}

/// Particulate-matter reading: four mass concentrations (µg/m³), five number
/// concentrations (#/cm³) and the typical particle size (µm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticulateMeasurement {
    pub mc_1p0: f64,
    pub mc_2p5: f64,
    pub mc_4p0: f64,
    pub mc_10p0: f64,
    pub nc_0p5: f64,
    pub nc_1p0: f64,
    pub nc_2p5: f64,
    pub nc_4p0: f64,
    pub nc_10p0: f64,
    pub typical_particle_size: f64,
}

impl ParticulateMeasurement {
    /// Channels in a fixed order, suitable for per-channel arithmetic.
    #[must_use]
    pub fn channels(&self) -> [f64; PM_CHANNEL_COUNT] {
        [
            self.mc_1p0,
            self.mc_2p5,
            self.mc_4p0,
            self.mc_10p0,
            self.nc_0p5,
            self.nc_1p0,
            self.nc_2p5,
            self.nc_4p0,
            self.nc_10p0,
            self.typical_particle_size,
        ]
    }

    /// Inverse of [`channels`](Self::channels).
    #[must_use]
    pub fn from_channels(c: [f64; PM_CHANNEL_COUNT]) -> Self {
        Self {
            mc_1p0: c[0],
            mc_2p5: c[1],
            mc_4p0: c[2],
            mc_10p0: c[3],
            nc_0p5: c[4],
            nc_1p0: c[5],
            nc_2p5: c[6],
            nc_4p0: c[7],
            nc_10p0: c[8],
            typical_particle_size: c[9],
        }
    }
}

/// Immutable value produced by one successful read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device", rename_all = "snake_case")]
pub enum Measurement {
    Weather(WeatherMeasurement),
    Co2(Co2Measurement),
    Particulate(ParticulateMeasurement),
}

impl Measurement {
    /// Device that produced this measurement.
    #[must_use]
    pub fn device(&self) -> DeviceKind {
        match self {
            Measurement::Weather(_) => DeviceKind::Weather,
            Measurement::Co2(_) => DeviceKind::Co2,
            Measurement::Particulate(_) => DeviceKind::Particulate,
        }
    }
}

/// Hardware parameter class, without a value.
///
/// At most one reconfiguration job is pending per `(DeviceKind, ParameterKind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    TemperatureOffset,
    Altitude,
    AutoSelfCalibration,
    CleaningInterval,
}

impl ParameterKind {
    /// Device this parameter lives on.
    #[must_use]
    pub fn device(&self) -> DeviceKind {
        match self {
            ParameterKind::TemperatureOffset
            | ParameterKind::Altitude
            | ParameterKind::AutoSelfCalibration => DeviceKind::Co2,
            ParameterKind::CleaningInterval => DeviceKind::Particulate,
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterKind::TemperatureOffset => "temperature_offset",
            ParameterKind::Altitude => "altitude",
            ParameterKind::AutoSelfCalibration => "auto_self_calibration",
            ParameterKind::CleaningInterval => "cleaning_interval",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ParameterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "temperature_offset" => Ok(ParameterKind::TemperatureOffset),
            "altitude" => Ok(ParameterKind::Altitude),
            "auto_self_calibration" => Ok(ParameterKind::AutoSelfCalibration),
            "cleaning_interval" => Ok(ParameterKind::CleaningInterval),
            _ => Err(Error::UnknownParameter(s.to_string())),
        }
    }
}

/// A calibration or configuration value to be written to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Parameter {
    /// CO₂ sensor temperature offset (m°C).
    TemperatureOffset(i32),

    /// CO₂ sensor altitude compensation (m above sea level).
    Altitude(i16),

    /// CO₂ sensor automatic self-calibration.
    AutoSelfCalibration(bool),

    /// Particulate sensor automatic fan-cleaning interval (s).
    CleaningInterval(u32),
}

impl Parameter {
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        match self {
            Parameter::TemperatureOffset(_) => ParameterKind::TemperatureOffset,
            Parameter::Altitude(_) => ParameterKind::Altitude,
            Parameter::AutoSelfCalibration(_) => ParameterKind::AutoSelfCalibration,
            Parameter::CleaningInterval(_) => ParameterKind::CleaningInterval,
        }
    }

    #[must_use]
    pub fn device(&self) -> DeviceKind {
        self.kind().device()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::TemperatureOffset(v) => write!(f, "temperature_offset={v} m°C"),
            Parameter::Altitude(v) => write!(f, "altitude={v} m"),
            Parameter::AutoSelfCalibration(v) => write!(f, "auto_self_calibration={v}"),
            Parameter::CleaningInterval(v) => write!(f, "cleaning_interval={v} s"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_read_order_is_fixed() {
        assert_eq!(
            DeviceKind::ALL,
            [DeviceKind::Weather, DeviceKind::Co2, DeviceKind::Particulate]
        );
        assert!(DeviceKind::Weather < DeviceKind::Co2);
    }

    #[rstest]
    #[case("weather", DeviceKind::Weather)]
    #[case("CO2", DeviceKind::Co2)]
    #[case("pm", DeviceKind::Particulate)]
    #[case(" particulate ", DeviceKind::Particulate)]
    fn test_device_kind_from_str(#[case] input: &str, #[case] expected: DeviceKind) {
        assert_eq!(input.parse::<DeviceKind>().unwrap(), expected);
    }

    #[test]
    fn test_device_kind_from_str_unknown() {
        let err = "display".parse::<DeviceKind>().unwrap_err();
        assert_eq!(err, Error::UnknownDevice("display".to_string()));
    }

    #[rstest]
    #[case(Parameter::TemperatureOffset(-1500), DeviceKind::Co2)]
    #[case(Parameter::Altitude(300), DeviceKind::Co2)]
    #[case(Parameter::AutoSelfCalibration(false), DeviceKind::Co2)]
    #[case(Parameter::CleaningInterval(604_800), DeviceKind::Particulate)]
    fn test_parameter_device(#[case] parameter: Parameter, #[case] device: DeviceKind) {
        assert_eq!(parameter.device(), device);
        assert_eq!(parameter.kind().device(), device);
    }

    #[test]
    fn test_parameter_kind_round_trip_through_display() {
        for kind in [
            ParameterKind::TemperatureOffset,
            ParameterKind::Altitude,
            ParameterKind::AutoSelfCalibration,
            ParameterKind::CleaningInterval,
        ] {
            assert_eq!(kind.to_string().parse::<ParameterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_particulate_channels() {
        let m = ParticulateMeasurement::from_channels([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0,
        ]);
        assert_eq!(m.mc_2p5, 2.0);
        assert_eq!(m.nc_0p5, 5.0);
        assert_eq!(m.typical_particle_size, 10.0);
        assert_eq!(m.channels()[9], 10.0);
    }

    #[test]
    fn test_measurement_device() {
        let m = Measurement::Co2(Co2Measurement {
            co2_ppm: 612,
            temperature_c: 21.5,
            humidity_rh: 40.0,
        });
        assert_eq!(m.device(), DeviceKind::Co2);
    }

    #[test]
    fn test_parameter_serialization() {
        let json = serde_json::to_string(&Parameter::Altitude(-20)).unwrap();
        assert_eq!(json, r#"{"kind":"altitude","value":-20}"#);
    }

    #[test]
    fn test_init_status_default() {
        assert_eq!(InitStatus::default(), InitStatus::Uninitialized);
        assert_eq!(InitStatus::Failed.to_string(), "Failed");
    }
}
