//! One-shot hardware actions requested by the remote service.
//!
//! A request only raises a flag and returns; the read loop consumes the
//! flag on its next pass. Repeated requests before that coalesce into one
//! execution.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Status returned to the caller of a remote procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcStatus {
    Ok,
    Unknown,
}

/// Actions that can be requested remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Run a manual fan cleaning on the particulate sensor.
    CleanPmSensor,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CleanPmSensor => "clean_pm_sensor",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RpcStatus;

    fn from_str(s: &str) -> Result<Self, RpcStatus> {
        match s {
            "clean_pm_sensor" => Ok(Action::CleanPmSensor),
            _ => Err(RpcStatus::Unknown),
        }
    }
}

/// Pending action flags.
#[derive(Debug, Default)]
pub struct ActionRequests {
    clean_pm_sensor: AtomicBool,
}

impl ActionRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, action: Action) -> &AtomicBool {
        match action {
            Action::CleanPmSensor => &self.clean_pm_sensor,
        }
    }

    /// Handle a remote request by name. Never blocks.
    pub fn request(&self, name: &str) -> RpcStatus {
        match name.parse::<Action>() {
            Ok(action) => {
                self.raise(action);
                RpcStatus::Ok
            }
            Err(status) => {
                warn!(method = name, "unknown action requested");
                status
            }
        }
    }

    /// Raise the flag for `action`.
    pub fn raise(&self, action: Action) {
        let already = self.flag(action).swap(true, Ordering::AcqRel);
        info!(%action, coalesced = already, "action requested");
    }

    /// Consume the flag for `action`; `true` if it was raised.
    pub fn take(&self, action: Action) -> bool {
        self.flag(action).swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self, action: Action) -> bool {
        self.flag(action).load(Ordering::Acquire)
    }
}
