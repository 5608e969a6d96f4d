//! Error types for the application layer.

use std::path::PathBuf;

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised by a telemetry publisher.
///
/// A publish failure is logged by the read loop and never stops it.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to encode telemetry record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Telemetry sink closed")]
    Closed,
}
