//! The setting table: every recognized key with its type, closed interval,
//! compiled-in default and effect on change.

use std::fmt;
use std::str::FromStr;

use airq_core::{DeviceKind, Parameter, ParameterKind};
use serde::{Deserialize, Serialize};

use crate::value::SettingValue;

/// Declared wire type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    Int,
    Bool,
}

/// What an accepted change triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Enqueue a hardware write of this parameter.
    Hardware(ParameterKind),

    /// Wake the read loop so its schedule is recomputed now.
    Reschedule,

    /// Picked up by the next read cycle; nothing to do immediately.
    NextCycle,
}

/// Static description of one setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingSpec {
    pub value_type: SettingType,

    /// Closed interval for `Int` settings.
    pub range: Option<(i64, i64)>,

    pub default: SettingValue,
    pub effect: Effect,
}

/// Recognized setting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingKey {
    LoopDelayS,
    Co2SensorTemperatureOffset,
    Co2SensorAltitude,
    Co2SensorAscEnable,
    PmSensorAutoCleaningInterval,
    PmSensorSamplesPerMeasurement,
    Co2WarningThresholdPpm,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::LoopDelayS,
        SettingKey::Co2SensorTemperatureOffset,
        SettingKey::Co2SensorAltitude,
        SettingKey::Co2SensorAscEnable,
        SettingKey::PmSensorAutoCleaningInterval,
        SettingKey::PmSensorSamplesPerMeasurement,
        SettingKey::Co2WarningThresholdPpm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::LoopDelayS => "LOOP_DELAY_S",
            SettingKey::Co2SensorTemperatureOffset => "CO2_SENSOR_TEMPERATURE_OFFSET",
            SettingKey::Co2SensorAltitude => "CO2_SENSOR_ALTITUDE",
            SettingKey::Co2SensorAscEnable => "CO2_SENSOR_ASC_ENABLE",
            SettingKey::PmSensorAutoCleaningInterval => "PM_SENSOR_AUTO_CLEANING_INTERVAL",
            SettingKey::PmSensorSamplesPerMeasurement => "PM_SENSOR_SAMPLES_PER_MEASUREMENT",
            SettingKey::Co2WarningThresholdPpm => "CO2_WARNING_THRESHOLD_PPM",
        }
    }

    /// Type, range, default and effect of this key.
    pub fn spec(&self) -> SettingSpec {
        let int = |min: i64, max: i64, default: i64, effect: Effect| SettingSpec {
            value_type: SettingType::Int,
            range: Some((min, max)),
            default: SettingValue::Int(default),
            effect,
        };

        match self {
            SettingKey::LoopDelayS => int(1, 43_200, 60, Effect::Reschedule),
            SettingKey::Co2SensorTemperatureOffset => int(
                i32::MIN.into(),
                i32::MAX.into(),
                0,
                Effect::Hardware(ParameterKind::TemperatureOffset),
            ),
            SettingKey::Co2SensorAltitude => int(
                i16::MIN.into(),
                i16::MAX.into(),
                0,
                Effect::Hardware(ParameterKind::Altitude),
            ),
            SettingKey::Co2SensorAscEnable => SettingSpec {
                value_type: SettingType::Bool,
                range: None,
                default: SettingValue::Bool(true),
                effect: Effect::Hardware(ParameterKind::AutoSelfCalibration),
            },
            SettingKey::PmSensorAutoCleaningInterval => int(
                0,
                u32::MAX.into(),
                604_800,
                Effect::Hardware(ParameterKind::CleaningInterval),
            ),
            SettingKey::PmSensorSamplesPerMeasurement => int(1, 300, 30, Effect::NextCycle),
            SettingKey::Co2WarningThresholdPpm => int(0, 40_000, 1_000, Effect::NextCycle),
        }
    }

    /// Device parameter backing this key, if any.
    pub fn parameter_kind(&self) -> Option<ParameterKind> {
        match self.spec().effect {
            Effect::Hardware(kind) => Some(kind),
            _ => None,
        }
    }

    /// Device written when this key changes, if any.
    pub fn device(&self) -> Option<DeviceKind> {
        self.parameter_kind().map(|kind| kind.device())
    }

    /// Build the hardware parameter for an already validated value.
    pub fn to_parameter(&self, value: &SettingValue) -> Option<Parameter> {
        match (self.parameter_kind()?, value) {
            (ParameterKind::TemperatureOffset, SettingValue::Int(v)) => {
                i32::try_from(*v).ok().map(Parameter::TemperatureOffset)
            }
            (ParameterKind::Altitude, SettingValue::Int(v)) => {
                i16::try_from(*v).ok().map(Parameter::Altitude)
            }
            (ParameterKind::AutoSelfCalibration, SettingValue::Bool(v)) => {
                Some(Parameter::AutoSelfCalibration(*v))
            }
            (ParameterKind::CleaningInterval, SettingValue::Int(v)) => {
                u32::try_from(*v).ok().map(Parameter::CleaningInterval)
            }
            _ => None,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = airq_core::Error;

    /// Keys are matched exactly; the remote service sends them upper-case.
    fn from_str(s: &str) -> airq_core::Result<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| airq_core::Error::UnknownSetting(s.to_string()))
    }
}
