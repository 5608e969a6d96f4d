//! Remote settings for the air-quality node.
//!
//! [`SettingsValidator`] type- and range-checks named values arriving from
//! the remote settings service, keeps the authoritative copy in a
//! [`SettingsStore`] and, when a value actually changes, either enqueues the
//! matching hardware write on the
//! [`ReconfigQueue`](airq_sensors::ReconfigQueue) or wakes the read loop.
//!
//! | Key | Type | Interval | Default |
//! |---|---|---|---|
//! | `LOOP_DELAY_S` | int | 1..=43200 | 60 |
//! | `CO2_SENSOR_TEMPERATURE_OFFSET` | int | i32 | 0 |
//! | `CO2_SENSOR_ALTITUDE` | int | i16 | 0 |
//! | `CO2_SENSOR_ASC_ENABLE` | bool | | true |
//! | `PM_SENSOR_AUTO_CLEANING_INTERVAL` | int | u32 | 604800 |
//! | `PM_SENSOR_SAMPLES_PER_MEASUREMENT` | int | 1..=300 | 30 |
//! | `CO2_WARNING_THRESHOLD_PPM` | int | 0..=40000 | 1000 |

pub mod key;
pub mod store;
pub mod validator;
pub mod value;

pub use key::{Effect, SettingKey, SettingSpec, SettingType};
pub use store::SettingsStore;
pub use validator::{SettingStatus, SettingsValidator, validate};
pub use value::SettingValue;
