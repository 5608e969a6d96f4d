//! Authoritative in-memory setting values.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Notify;

use crate::key::SettingKey;
use crate::value::SettingValue;

/// Current value of every setting plus the read loop's reschedule signal.
///
/// Constructed once at startup with the compiled-in defaults and shared by
/// `Arc`. Only [`SettingsValidator`](crate::SettingsValidator) mutates it.
#[derive(Debug)]
pub struct SettingsStore {
    values: RwLock<BTreeMap<SettingKey, SettingValue>>,
    reschedule: Notify,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Store holding every compiled-in default.
    pub fn new() -> Self {
        let values = SettingKey::ALL
            .into_iter()
            .map(|key| (key, key.spec().default))
            .collect();
        Self {
            values: RwLock::new(values),
            reschedule: Notify::new(),
        }
    }

    /// Current value of `key`.
    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.spec().default)
    }

    /// Copy of every current value.
    pub fn snapshot(&self) -> BTreeMap<SettingKey, SettingValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store `value` if it differs from the current one.
    ///
    /// `on_change` runs before the write lock is released, so effects of
    /// concurrent updates to the same key are produced in the order the
    /// values were stored. It must not block.
    pub(crate) fn replace_with(
        &self,
        key: SettingKey,
        value: SettingValue,
        on_change: impl FnOnce(&SettingValue),
    ) -> bool {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if values.get(&key) == Some(&value) {
            return false;
        }
        on_change(&value);
        values.insert(key, value);
        true
    }

    fn get_int(&self, key: SettingKey) -> i64 {
        self.get(key)
            .as_int()
            .or_else(|| key.spec().default.as_int())
            .unwrap_or_default()
    }

    /// Interval between two read cycles.
    pub fn loop_delay(&self) -> Duration {
        let secs = u64::try_from(self.get_int(SettingKey::LoopDelayS)).unwrap_or(1);
        Duration::from_secs(secs.max(1))
    }

    /// Particulate samples averaged per read.
    pub fn samples_per_measurement(&self) -> u32 {
        u32::try_from(self.get_int(SettingKey::PmSensorSamplesPerMeasurement))
            .unwrap_or(1)
            .max(1)
    }

    /// CO₂ level at or above which the warning indicator is set.
    pub fn co2_warning_threshold_ppm(&self) -> u16 {
        u16::try_from(self.get_int(SettingKey::Co2WarningThresholdPpm)).unwrap_or(u16::MAX)
    }

    /// Ask the read loop to recompute its next deadline.
    ///
    /// A request made while nobody waits is kept until the next wait.
    pub fn request_reschedule(&self) {
        self.reschedule.notify_one();
    }

    /// Resolve on the next reschedule request.
    pub async fn rescheduled(&self) {
        self.reschedule.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = SettingsStore::new();
        assert_eq!(store.loop_delay(), Duration::from_secs(60));
        assert_eq!(store.samples_per_measurement(), 30);
        assert_eq!(store.co2_warning_threshold_ppm(), 1_000);
        assert_eq!(store.get(SettingKey::Co2SensorAscEnable), SettingValue::Bool(true));
        assert_eq!(store.snapshot().len(), SettingKey::ALL.len());
    }

    #[test]
    fn test_replace_with_only_on_change() {
        let store = SettingsStore::new();
        let mut calls = 0;

        assert!(!store.replace_with(SettingKey::LoopDelayS, SettingValue::Int(60), |_| calls += 1));
        assert!(store.replace_with(SettingKey::LoopDelayS, SettingValue::Int(90), |_| calls += 1));

        assert_eq!(calls, 1);
        assert_eq!(store.loop_delay(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_request_is_kept_until_waited() {
        let store = SettingsStore::new();
        store.request_reschedule();
        tokio::time::timeout(Duration::from_millis(1), store.rescheduled())
            .await
            .unwrap();
    }
}
