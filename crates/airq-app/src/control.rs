//! Line-oriented control channel.
//!
//! Stands in for the cloud client's settings and RPC callbacks: every line
//! is one JSON object, either a setting (`{"key": "LOOP_DELAY_S", "value":
//! 120}`) or an action request (`{"action": "clean_pm_sensor"}`). Handling a
//! line never touches hardware.

use airq_settings::{SettingStatus, SettingValue, SettingsValidator};
use serde::{Deserialize, Serialize};

use crate::actions::{ActionRequests, RpcStatus};

/// One control request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ControlRequest {
    Setting { key: String, value: SettingValue },
    Action { action: String },
}

/// Reply to one control line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    Setting { key: String, status: SettingStatus },
    Action { action: String, status: RpcStatus },
    Invalid { error: String },
}

/// Handle one line; `None` for a blank line.
pub fn handle_line(
    line: &str,
    validator: &SettingsValidator,
    actions: &ActionRequests,
) -> Option<ControlReply> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let reply = match serde_json::from_str::<ControlRequest>(line) {
        Ok(ControlRequest::Setting { key, value }) => {
            let status = validator.apply(&key, value);
            ControlReply::Setting { key, status }
        }
        Ok(ControlRequest::Action { action }) => {
            let status = actions.request(&action);
            ControlReply::Action { action, status }
        }
        Err(err) => ControlReply::Invalid {
            error: err.to_string(),
        },
    };
    Some(reply)
}
