//! Application configuration – reads an optional TOML file.
//!
//! Every field has a default, so a missing file (or an empty one) runs the
//! node with datasheet timings. Setting values (loop delay, calibration)
//! are not configured here: they are compiled-in defaults updated by the
//! remote settings service. The only exception is the initial loop delay,
//! which can be overridden for bench work.
//!
//! ```toml
//! log_filter = "info,airq_sensors=debug"
//! reinit_failed_devices = true
//! loop_delay_s = 120
//!
//! [telemetry]
//! stream_path = "sensor"
//!
//! [sensors.particulate]
//! stabilize_ms = 10000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use airq_core::DeviceKind;
use airq_sensors::{DEFAULT_SAMPLES_PER_MEASUREMENT, DeviceProfile, SensorManagerConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_PATH_ENV: &str = "AIRQ_CONFIG";

/// Environment variable overriding the initial loop delay (seconds).
pub const LOOP_DELAY_ENV: &str = "AIRQ_LOOP_DELAY_S";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Retry initialization of failed devices at the start of each cycle.
    pub reinit_failed_devices: bool,

    /// Initial `LOOP_DELAY_S`, validated like a remote update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_delay_s: Option<i64>,

    pub telemetry: TelemetryConfig,
    pub sensors: SensorsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            reinit_failed_devices: true,
            loop_delay_s: None,
            telemetry: TelemetryConfig::default(),
            sensors: SensorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Stream the records are published to.
    pub stream_path: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            stream_path: "sensor".to_string(),
        }
    }
}

/// Per-device timing overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub weather: ProfileOverride,
    pub co2: ProfileOverride,
    pub particulate: ProfileOverride,
}

/// Fields left out keep the device's datasheet default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquire_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_up_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stabilize_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inter_sample_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_cleaning_ms: Option<u64>,
}

impl ProfileOverride {
    /// `base` with every set field replaced.
    pub fn apply_to(&self, base: DeviceProfile) -> DeviceProfile {
        DeviceProfile {
            acquire_timeout_ms: self.acquire_timeout_ms.unwrap_or(base.acquire_timeout_ms),
            settle_ms: self.settle_ms.unwrap_or(base.settle_ms),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(base.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts.unwrap_or(base.max_poll_attempts),
            power_up_delay_ms: self.power_up_delay_ms.unwrap_or(base.power_up_delay_ms),
            reset_delay_ms: self.reset_delay_ms.unwrap_or(base.reset_delay_ms),
            probe_attempts: self.probe_attempts.unwrap_or(base.probe_attempts),
            probe_interval_ms: self.probe_interval_ms.unwrap_or(base.probe_interval_ms),
            stabilize_ms: self.stabilize_ms.unwrap_or(base.stabilize_ms),
            inter_sample_ms: self.inter_sample_ms.unwrap_or(base.inter_sample_ms),
            fan_cleaning_ms: self.fan_cleaning_ms.unwrap_or(base.fan_cleaning_ms),
        }
    }
}

impl SensorsConfig {
    /// Resolved profile for `kind`.
    pub fn profile(&self, kind: DeviceKind) -> DeviceProfile {
        let overrides = match kind {
            DeviceKind::Weather => &self.weather,
            DeviceKind::Co2 => &self.co2,
            DeviceKind::Particulate => &self.particulate,
        };
        overrides.apply_to(DeviceProfile::for_kind(kind))
    }
}

impl AppConfig {
    /// Sensor manager configuration with all overrides applied.
    pub fn sensor_manager_config(&self) -> SensorManagerConfig {
        SensorManagerConfig {
            weather: self.sensors.profile(DeviceKind::Weather),
            co2: self.sensors.profile(DeviceKind::Co2),
            particulate: self.sensors.profile(DeviceKind::Particulate),
            samples_per_measurement: DEFAULT_SAMPLES_PER_MEASUREMENT,
        }
    }
}

/// Config path from the first CLI argument, else `AIRQ_CONFIG`.
pub fn config_path(arg: Option<String>) -> Option<PathBuf> {
    arg.or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Load the config from `path`; a missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config at `path` (if any) and apply environment overrides.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut cfg = match path {
        Some(path) => load_from(path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `AIRQ_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `AIRQ_LOOP_DELAY_S` | `loop_delay_s` |
pub fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var(LOOP_DELAY_ENV)
        && let Ok(secs) = v.trim().parse::<i64>()
    {
        cfg.loop_delay_s = Some(secs);
    }
}
