//! Error types for bus-level device operations.
//!
//! A `HardwareError` describes why a single command/response round trip
//! failed. The acquisition layer never retries on these; it propagates them
//! as terminal for the operation in progress.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors raised by a device driver adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// The device did not acknowledge its address or a command.
    #[error("Device did not acknowledge: {command}")]
    Nack { command: String },

    /// A response word failed its checksum.
    #[error("CRC mismatch in response to {command}")]
    Crc { command: String },

    /// Device is not present on the bus.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },
}

impl HardwareError {
    /// Create a new NACK error.
    pub fn nack(command: impl Into<String>) -> Self {
        Self::Nack {
            command: command.into(),
        }
    }

    /// Create a new CRC error.
    pub fn crc(command: impl Into<String>) -> Self {
        Self::Crc {
            command: command.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}
