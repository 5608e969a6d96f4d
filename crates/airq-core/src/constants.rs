//! Timing constants for the three sensors on the shared bus.
//!
//! Values come from the respective datasheets and are the defaults of the
//! per-device profiles; every one of them can be overridden in the
//! configuration file.
//!
//! # Worst-case read latency
//!
//! Data-ready polling is bounded by an attempt count rather than a timer.
//! Every query is preceded by one poll interval, so the worst case for one
//! acquisition is `settle + max_attempts * poll_interval`:
//!
//! | Device | Settle | Poll | Attempts | Worst case |
//! |---|---|---|---|---|
//! | Weather | 0 ms | 100 ms | 10 | 1 s |
//! | CO₂ | 5000 ms | 100 ms | 50 | 10 s |
//! | Particulate (per sample) | 0 ms | 100 ms | 100 | 10 s |

// ============================================================================
// Shared polling
// ============================================================================

/// Interval between two data-ready queries.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// ============================================================================
// Weather sensor (BME280)
// ============================================================================

/// Maximum wait for the weather sensor guard.
pub const WEATHER_ACQUIRE_TIMEOUT_MS: u64 = 2_000;

/// A forced measurement finishes within a few milliseconds.
pub const WEATHER_SETTLE_MS: u64 = 0;

/// Data-ready queries before a weather read times out.
pub const WEATHER_MAX_POLL_ATTEMPTS: u32 = 10;

// ============================================================================
// CO₂ sensor (SCD4x)
// ============================================================================

/// Maximum wait for the CO₂ sensor guard.
pub const CO2_ACQUIRE_TIMEOUT_MS: u64 = 6_000;

/// After VDD reaches 2.25 V the sensor needs 1000 ms to enter idle state.
pub const CO2_POWER_UP_DELAY_MS: u64 = 1_000;

/// Duration of one single-shot measurement.
pub const CO2_MEASUREMENT_DURATION_MS: u64 = 5_000;

/// Data-ready queries after the single-shot duration has elapsed.
pub const CO2_MAX_POLL_ATTEMPTS: u32 = 50;

/// Upper bound of the CO₂ measurement range.
pub const CO2_MAX_PPM: u16 = 40_000;

// ============================================================================
// Particulate-matter sensor (SPS30)
// ============================================================================

/// Maximum wait for the particulate sensor guard.
///
/// Long because initialisation holds the guard through a 30 s stabilisation.
pub const PM_ACQUIRE_TIMEOUT_MS: u64 = 60_000;

/// Delay after a soft reset before the sensor answers again.
pub const PM_RESET_DELAY_MS: u64 = 100;

/// Identity probes attempted after reset.
pub const PM_PROBE_ATTEMPTS: u32 = 10;

/// Interval between two identity probes.
pub const PM_PROBE_INTERVAL_MS: u64 = 1_000;

/// Time for readings to stabilise after measurement mode is entered.
pub const PM_STABILIZE_MS: u64 = 30_000;

/// A new sample is produced every second in measurement mode.
pub const PM_MEASUREMENT_DURATION_MS: u64 = 1_000;

/// Data-ready queries per averaging sample.
pub const PM_MAX_POLL_ATTEMPTS: u32 = 100;

/// Duration of a manual fan-cleaning cycle.
pub const PM_FAN_CLEANING_MS: u64 = 10_000;

/// Number of channels reported by the particulate sensor.
pub const PM_CHANNEL_COUNT: usize = 10;
