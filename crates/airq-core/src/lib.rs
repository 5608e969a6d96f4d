//! Shared vocabulary for the air-quality acquisition subsystem.
//!
//! Every other `airq-*` crate speaks in terms of the types defined here:
//! which physical device an operation targets ([`DeviceKind`]), what a
//! successful read produced ([`Measurement`]), and which calibration value a
//! reconfiguration writes ([`Parameter`]).

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
