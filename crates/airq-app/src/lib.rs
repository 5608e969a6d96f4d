//! Air-quality node application layer.
//!
//! Wires the sensor manager, settings and reconfiguration queue to the
//! periodic read loop and to the external boundaries:
//!
//! - [`orchestrator`]: the `Idle → Reading → Publishing` cycle
//! - [`telemetry`]: per-cycle record and publisher trait
//! - [`actions`]: one-shot remote actions (fan cleaning)
//! - [`control`]: JSON line handler for settings and actions
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: tracing subscriber setup

pub mod actions;
pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod telemetry;

pub use actions::{Action, ActionRequests, RpcStatus};
pub use config::AppConfig;
pub use error::{ConfigError, PublishError};
pub use orchestrator::{CycleState, Orchestrator, OrchestratorConfig};
pub use telemetry::{ChannelPublisher, LogPublisher, TelemetryPublisher, TelemetryRecord};
