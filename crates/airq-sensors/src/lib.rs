//! Sensor acquisition and synchronization for the air-quality node.
//!
//! This crate is the only path from the application to the bus:
//!
//! - [`SensorManager`] owns one exclusive-access guard per physical device
//!   and implements initialization, bounded data-ready polling, unit
//!   conversion and multi-sample averaging.
//! - [`ReconfigQueue`] decouples "a setting changed" from "the hardware
//!   write happened": enqueueing never blocks, draining waits for the
//!   device guard.
//!
//! # Invariant
//!
//! At most one hardware operation is in flight per device. Every bus
//! command is issued through a [`guard::DeviceGuard`], which is only handed
//! out by [`guard::DeviceHandle::lock`] and released when dropped.
//!
//! # Error Handling
//!
//! Operations return [`Result<T>`] with a [`SensorError`] naming the device
//! concerned. None of them is fatal: callers log and move on, and a device
//! that stays `Failed` simply produces no data.

pub mod averaging;
pub mod convert;
pub mod error;
pub mod guard;
pub mod manager;
pub mod polling;
pub mod profile;
pub mod reconfig;

// Re-export commonly used types for convenience
pub use error::{Result, SensorError};
pub use guard::Reading;
pub use manager::{DEFAULT_SAMPLES_PER_MEASUREMENT, SensorManager, SensorManagerConfig};
pub use polling::PollPolicy;
pub use profile::DeviceProfile;
pub use reconfig::{DEFAULT_RETRY_INTERVAL, DrainReport, PendingJob, ReconfigQueue};
