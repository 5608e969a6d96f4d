//! Device driver adapters for the air-quality sensor node.
//!
//! This crate defines the command set the acquisition layer speaks to each
//! sensor on the shared I²C bus, together with scriptable mock devices used
//! by tests and by the simulated `airq` binary.
//!
//! # Design Philosophy
//!
//! - **One round trip per call**: every [`SensorDriver`] method is a single
//!   command/response exchange. Datasheet delays, readiness polling, retries
//!   and mutual exclusion live above this layer.
//! - **Async-first**: methods return `Send` futures so they can be awaited
//!   from any Tokio worker.
//! - **Enum dispatch**: the traits are not object-safe, so
//!   [`devices`] provides `Any*` wrappers with a concrete type per device.
//!
//! # Example
//!
//! ```
//! use airq_hardware::devices::AnyWeatherSensor;
//! use airq_hardware::mock::MockSensor;
//! use airq_hardware::traits::SensorDriver;
//!
//! #[tokio::main]
//! async fn main() -> airq_hardware::Result<()> {
//!     let (sensor, _handle) = MockSensor::weather();
//!     let mut sensor = AnyWeatherSensor::Mock(sensor);
//!
//!     sensor.start().await?;
//!     while !sensor.poll_ready().await? {}
//!     let sample = sensor.read_result().await?;
//!     assert_eq!(sample.pressure_pa, 101_325);
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`] with a [`HardwareError`] describing
//! why the bus exchange failed. Adapters never retry.

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{FanCleaning, SensorDriver};
pub use types::{DeviceInfo, RawCo2Sample, RawParticulateSample, RawWeatherSample};
