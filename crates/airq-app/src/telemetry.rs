//! Telemetry record and publisher boundary.
//!
//! One [`TelemetryRecord`] is produced per read cycle. Channels of a device
//! whose read failed are absent from the record and from its JSON encoding;
//! nothing is fabricated.

use std::future::Future;

use airq_core::Measurement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::PublishError;

/// Aggregate of one read cycle.
///
/// ```
/// use airq_app::telemetry::TelemetryRecord;
/// use airq_core::{Co2Measurement, Measurement};
///
/// let mut record = TelemetryRecord::new(chrono::Utc::now());
/// record.insert(&Measurement::Co2(Co2Measurement {
///     co2_ppm: 612,
///     temperature_c: 21.0,
///     humidity_rh: 40.0,
/// }));
///
/// let json = serde_json::to_value(&record).unwrap();
/// assert_eq!(json["co2"], 612);
/// assert!(json.get("tem").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "tem", default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(rename = "pre", default, skip_serializing_if = "Option::is_none")]
    pub pressure_kpa: Option<f64>,
    #[serde(rename = "hum", default, skip_serializing_if = "Option::is_none")]
    pub humidity_rh: Option<f64>,

    #[serde(rename = "co2", default, skip_serializing_if = "Option::is_none")]
    pub co2_ppm: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mc_1p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mc_2p5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mc_4p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mc_10p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nc_0p5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nc_1p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nc_2p5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nc_4p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nc_10p0: Option<f64>,
    #[serde(rename = "tps", default, skip_serializing_if = "Option::is_none")]
    pub typical_particle_size: Option<f64>,

    /// CO₂ at or above the warning threshold; absent without a CO₂ reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_indicator: Option<bool>,
}

impl TelemetryRecord {
    /// Empty record stamped with `timestamp`.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature_c: None,
            pressure_kpa: None,
            humidity_rh: None,
            co2_ppm: None,
            mc_1p0: None,
            mc_2p5: None,
            mc_4p0: None,
            mc_10p0: None,
            nc_0p5: None,
            nc_1p0: None,
            nc_2p5: None,
            nc_4p0: None,
            nc_10p0: None,
            typical_particle_size: None,
            warning_indicator: None,
        }
    }

    /// Fill in the channels of one device.
    pub fn insert(&mut self, measurement: &Measurement) {
        match measurement {
            Measurement::Weather(w) => {
                self.temperature_c = Some(w.temperature_c);
                self.pressure_kpa = Some(w.pressure_kpa);
                self.humidity_rh = Some(w.humidity_rh);
            }
            Measurement::Co2(c) => {
                self.co2_ppm = Some(c.co2_ppm);
            }
            Measurement::Particulate(p) => {
                self.mc_1p0 = Some(p.mc_1p0);
                self.mc_2p5 = Some(p.mc_2p5);
                self.mc_4p0 = Some(p.mc_4p0);
                self.mc_10p0 = Some(p.mc_10p0);
                self.nc_0p5 = Some(p.nc_0p5);
                self.nc_1p0 = Some(p.nc_1p0);
                self.nc_2p5 = Some(p.nc_2p5);
                self.nc_4p0 = Some(p.nc_4p0);
                self.nc_10p0 = Some(p.nc_10p0);
                self.typical_particle_size = Some(p.typical_particle_size);
            }
        }
    }

    pub fn has_weather(&self) -> bool {
        self.temperature_c.is_some()
    }

    pub fn has_co2(&self) -> bool {
        self.co2_ppm.is_some()
    }

    pub fn has_particulate(&self) -> bool {
        self.mc_2p5.is_some()
    }

    /// No device contributed to this record.
    pub fn is_empty(&self) -> bool {
        !self.has_weather() && !self.has_co2() && !self.has_particulate()
    }
}

/// Receiver of per-cycle telemetry records (the cloud client in production).
pub trait TelemetryPublisher: Send + Sync {
    fn publish(
        &self,
        record: &TelemetryRecord,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Publishes records as JSON through `tracing`.
#[derive(Debug, Clone)]
pub struct LogPublisher {
    stream_path: String,
}

impl LogPublisher {
    pub fn new(stream_path: impl Into<String>) -> Self {
        Self {
            stream_path: stream_path.into(),
        }
    }
}

impl TelemetryPublisher for LogPublisher {
    async fn publish(&self, record: &TelemetryRecord) -> Result<(), PublishError> {
        let payload = serde_json::to_string(record)?;
        info!(stream = %self.stream_path, %payload, "telemetry published");
        Ok(())
    }
}

/// Forwards records to an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<TelemetryRecord>,
}

impl ChannelPublisher {
    pub fn new(tx: mpsc::Sender<TelemetryRecord>) -> Self {
        Self { tx }
    }

    /// Publisher plus the receiving end, with room for `capacity` records.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TelemetryRecord>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl TelemetryPublisher for ChannelPublisher {
    async fn publish(&self, record: &TelemetryRecord) -> Result<(), PublishError> {
        self.tx
            .send(record.clone())
            .await
            .map_err(|_| PublishError::Closed)
    }
}
