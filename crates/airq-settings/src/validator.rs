//! Settings validation.
//!
//! Each incoming `(key, value)` pair goes `Unvalidated -> Accepted` or
//! `Unvalidated -> Rejected` with one of three reasons. Rejection never
//! touches the stored value. Acceptance of an unchanged value is a no-op;
//! acceptance of a changed value updates the store and triggers the key's
//! effect. Nothing here waits on hardware.

use std::sync::Arc;

use airq_sensors::ReconfigQueue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::key::{Effect, SettingKey, SettingType};
use crate::store::SettingsStore;
use crate::value::SettingValue;

/// Outcome reported to the remote settings service for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingStatus {
    Accepted,
    FormatInvalid,
    OutOfRange,
    KeyNotRecognized,
}

impl SettingStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SettingStatus::Accepted)
    }
}

/// Check `value` against the declared type and interval of `key`.
pub fn validate(key: SettingKey, value: &SettingValue) -> SettingStatus {
    let spec = key.spec();
    match (spec.value_type, value) {
        (SettingType::Bool, SettingValue::Bool(_)) => SettingStatus::Accepted,
        (SettingType::Int, SettingValue::Int(v)) => match spec.range {
            Some((min, max)) if !(min..=max).contains(v) => SettingStatus::OutOfRange,
            _ => SettingStatus::Accepted,
        },
        // Every integer interval lies within i64.
        (SettingType::Int, SettingValue::Oversized(_)) => SettingStatus::OutOfRange,
        _ => SettingStatus::FormatInvalid,
    }
}

/// Validates remote settings and turns accepted changes into effects.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use airq_sensors::ReconfigQueue;
/// use airq_settings::{SettingStatus, SettingValue, SettingsStore, SettingsValidator};
///
/// let validator = SettingsValidator::new(
///     Arc::new(SettingsStore::new()),
///     Arc::new(ReconfigQueue::new()),
/// );
///
/// assert_eq!(validator.apply("LOOP_DELAY_S", SettingValue::Int(120)), SettingStatus::Accepted);
/// assert_eq!(validator.apply("LOOP_DELAY_S", SettingValue::Int(0)), SettingStatus::OutOfRange);
/// assert_eq!(
///     validator.apply("CO2_SENSOR_ASC_ENABLE", SettingValue::from("yes")),
///     SettingStatus::FormatInvalid
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SettingsValidator {
    store: Arc<SettingsStore>,
    queue: Arc<ReconfigQueue>,
}

impl SettingsValidator {
    pub fn new(store: Arc<SettingsStore>, queue: Arc<ReconfigQueue>) -> Self {
        Self { store, queue }
    }

    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    /// Validate and apply one setting.
    pub fn apply(&self, key: &str, value: SettingValue) -> SettingStatus {
        let Ok(setting) = key.parse::<SettingKey>() else {
            warn!(key, "setting key not recognized");
            return SettingStatus::KeyNotRecognized;
        };

        let status = validate(setting, &value);
        if !status.is_accepted() {
            warn!(
                key = %setting,
                %value,
                value_type = value.type_name(),
                ?status,
                "setting rejected"
            );
            return status;
        }

        let effect = setting.spec().effect;
        let changed = self.store.replace_with(setting, value, |new| {
            if let Effect::Hardware(_) = effect {
                match setting.to_parameter(new) {
                    Some(parameter) => {
                        self.queue.enqueue(parameter);
                    }
                    None => warn!(key = %setting, value = %new, "no hardware parameter for value"),
                }
            }
        });

        if !changed {
            debug!(key = %setting, "setting unchanged");
            return SettingStatus::Accepted;
        }

        info!(key = %setting, value = %self.store.get(setting), "setting updated");
        if effect == Effect::Reschedule {
            self.store.request_reschedule();
        }
        SettingStatus::Accepted
    }

    /// Apply every pair of a settings document; one status per key, in input
    /// order. Keys are independent: a rejected key does not affect the others.
    pub fn apply_batch<I, K>(&self, settings: I) -> Vec<(String, SettingStatus)>
    where
        I: IntoIterator<Item = (K, SettingValue)>,
        K: Into<String>,
    {
        settings
            .into_iter()
            .map(|(key, value)| {
                let key = key.into();
                let status = self.apply(&key, value);
                (key, status)
            })
            .collect()
    }

    /// Apply a JSON object of `"KEY": value` pairs, in document order.
    ///
    /// Any value shape is accepted at this level; a value the key cannot
    /// take is reported as that key's status.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `document` is not a JSON object; no
    /// setting is applied in that case.
    pub fn apply_json(&self, document: &str) -> serde_json::Result<Vec<(String, SettingStatus)>> {
        let settings: Map<String, Value> = serde_json::from_str(document)?;
        Ok(self.apply_batch(
            settings
                .into_iter()
                .map(|(key, value)| (key, SettingValue::from(value))),
        ))
    }

    /// Enqueue every hardware-backed setting with its current value.
    ///
    /// Run once at boot so the devices receive the authoritative values even
    /// though nothing has changed yet. Returns the number of jobs enqueued.
    pub fn seed_hardware(&self) -> usize {
        let mut seeded = 0;
        for key in SettingKey::ALL {
            if let Some(parameter) = key.to_parameter(&self.store.get(key)) {
                self.queue.enqueue(parameter);
                seeded += 1;
            }
        }
        info!(jobs = seeded, "hardware settings seeded");
        seeded
    }
}
