//! Scriptable mock sensor.
//!
//! A single generic [`MockSensor`] stands in for all three devices. Tests
//! (and the simulated binary) drive it through a [`MockSensorHandle`]: queue
//! samples, delay data-ready, inject failures, and inspect which commands
//! reached the "bus" in which order.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use airq_core::{DeviceKind, Parameter};

use crate::{
    HardwareError, Result,
    traits::{FanCleaning, SensorDriver},
    types::{DeviceInfo, RawCo2Sample, RawParticulateSample, RawWeatherSample},
};

/// Bus command observed by a mock sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Wake,
    Identify,
    Start,
    PollReady,
    ReadResult,
    WriteParam,
    FanCleaning,
}

/// Mock weather sensor.
pub type MockWeather = MockSensor<RawWeatherSample>;

/// Mock CO₂ sensor.
pub type MockCo2 = MockSensor<RawCo2Sample>;

/// Mock particulate-matter sensor.
pub type MockParticulate = MockSensor<RawParticulateSample>;

struct MockState<S> {
    default_sample: S,
    samples: VecDeque<S>,
    identity: Option<DeviceInfo>,
    ready_after: u32,
    never_ready: bool,
    polls_since_start: u32,
    latency: Duration,
    next_failures: HashMap<MockOp, VecDeque<HardwareError>>,
    persistent_failures: HashMap<MockOp, HardwareError>,
    writes: Vec<Parameter>,
    events: Vec<MockOp>,
    in_flight: u32,
    peak_in_flight: u32,
}

impl<S> MockState<S> {
    fn new(default_sample: S, identity: DeviceInfo) -> Self {
        Self {
            default_sample,
            samples: VecDeque::new(),
            identity: Some(identity),
            ready_after: 0,
            never_ready: false,
            polls_since_start: 0,
            latency: Duration::ZERO,
            next_failures: HashMap::new(),
            persistent_failures: HashMap::new(),
            writes: Vec::new(),
            events: Vec::new(),
            in_flight: 0,
            peak_in_flight: 0,
        }
    }

    fn enter(&mut self, op: MockOp) {
        self.events.push(op);
        self.in_flight += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.in_flight);
    }

    fn exit(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn take_failure(&mut self, op: MockOp) -> Option<HardwareError> {
        if let Some(err) = self.next_failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Some(err);
        }
        self.persistent_failures.get(&op).cloned()
    }
}

/// Mock sensor for testing and development.
///
/// # Examples
///
/// ```
/// use airq_hardware::mock::MockSensor;
/// use airq_hardware::traits::SensorDriver;
/// use airq_hardware::types::RawCo2Sample;
///
/// #[tokio::main]
/// async fn main() -> airq_hardware::Result<()> {
///     let (mut sensor, handle) = MockSensor::co2();
///     handle.push_sample(RawCo2Sample {
///         co2_ppm: 800,
///         temperature_milli_c: 21_000,
///         humidity_milli_rh: 40_000,
///     });
///
///     sensor.start().await?;
///     assert!(sensor.poll_ready().await?);
///     assert_eq!(sensor.read_result().await?.co2_ppm, 800);
///     Ok(())
/// }
/// ```
pub struct MockSensor<S> {
    kind: DeviceKind,
    state: Arc<Mutex<MockState<S>>>,
}

impl<S> fmt::Debug for MockSensor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSensor").field("kind", &self.kind).finish()
    }
}

impl<S: Clone> MockSensor<S> {
    /// Create a mock of the given device that returns `default_sample`
    /// whenever no scripted sample is queued.
    pub fn with_sample(
        kind: DeviceKind,
        default_sample: S,
        identity: DeviceInfo,
    ) -> (Self, MockSensorHandle<S>) {
        let state = Arc::new(Mutex::new(MockState::new(default_sample, identity)));
        let sensor = Self {
            kind,
            state: Arc::clone(&state),
        };
        (sensor, MockSensorHandle { kind, state })
    }

    fn lock(&self) -> MutexGuard<'_, MockState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the command, wait out the configured latency, then either fail
    /// with an injected error or apply `f`.
    async fn run<T>(
        &self,
        op: MockOp,
        f: impl FnOnce(&mut MockState<S>) -> Result<T>,
    ) -> Result<T> {
        let latency = {
            let mut state = self.lock();
            state.enter(op);
            state.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        state.exit();
        match state.take_failure(op) {
            Some(err) => Err(err),
            None => f(&mut state),
        }
    }
}

impl MockSensor<RawWeatherSample> {
    /// Mock BME280 reporting 22.50 °C, 101.325 kPa and 45 %RH.
    pub fn weather() -> (Self, MockSensorHandle<RawWeatherSample>) {
        Self::with_sample(
            DeviceKind::Weather,
            RawWeatherSample {
                temperature_centi_c: 2_250,
                pressure_pa: 101_325,
                humidity_milli_rh: 45_000,
            },
            DeviceInfo::new("BME280", "BME280").with_serial_number("chip-id 0x60"),
        )
    }
}

impl MockSensor<RawCo2Sample> {
    /// Mock SCD41 reporting 450 ppm, 22.1 °C and 41 %RH.
    pub fn co2() -> (Self, MockSensorHandle<RawCo2Sample>) {
        Self::with_sample(
            DeviceKind::Co2,
            RawCo2Sample {
                co2_ppm: 450,
                temperature_milli_c: 22_100,
                humidity_milli_rh: 41_000,
            },
            DeviceInfo::new("SCD41", "SCD4x").with_serial_number("0x8a3c6e1b07f4"),
        )
    }
}

impl MockSensor<RawParticulateSample> {
    /// Mock SPS30 reporting a clean-room-ish particle profile.
    pub fn particulate() -> (Self, MockSensorHandle<RawParticulateSample>) {
        Self::with_sample(
            DeviceKind::Particulate,
            RawParticulateSample {
                mc_1p0: 2.5,
                mc_2p5: 3.0,
                mc_4p0: 3.25,
                mc_10p0: 3.5,
                nc_0p5: 17.0,
                nc_1p0: 20.0,
                nc_2p5: 20.5,
                nc_4p0: 20.5,
                nc_10p0: 20.75,
                typical_particle_size: 0.5,
            },
            DeviceInfo::new("SPS30", "SPS30")
                .with_serial_number("E1A3B5C7D9F00A1B")
                .with_firmware_version("2.2"),
        )
    }
}

impl<S> SensorDriver for MockSensor<S>
where
    S: Clone + Send + Sync + 'static,
{
    type Sample = S;

    fn kind(&self) -> DeviceKind {
        self.kind
    }

    async fn wake(&mut self) -> Result<()> {
        self.run(MockOp::Wake, |_| Ok(())).await
    }

    async fn identify(&mut self) -> Result<DeviceInfo> {
        self.run(MockOp::Identify, |state| {
            state
                .identity
                .clone()
                .ok_or_else(|| HardwareError::nack("identify"))
        })
        .await
    }

    async fn start(&mut self) -> Result<()> {
        self.run(MockOp::Start, |state| {
            state.polls_since_start = 0;
            Ok(())
        })
        .await
    }

    async fn poll_ready(&mut self) -> Result<bool> {
        self.run(MockOp::PollReady, |state| {
            state.polls_since_start += 1;
            Ok(!state.never_ready && state.polls_since_start > state.ready_after)
        })
        .await
    }

    async fn read_result(&mut self) -> Result<S> {
        self.run(MockOp::ReadResult, |state| {
            Ok(state
                .samples
                .pop_front()
                .unwrap_or_else(|| state.default_sample.clone()))
        })
        .await
    }

    async fn write_param(&mut self, parameter: Parameter) -> Result<()> {
        let kind = self.kind;
        self.run(MockOp::WriteParam, move |state| {
            if parameter.device() != kind {
                return Err(HardwareError::unsupported(format!(
                    "write_param({}) on {kind}",
                    parameter.kind()
                )));
            }
            state.writes.push(parameter);
            Ok(())
        })
        .await
    }
}

impl FanCleaning for MockSensor<RawParticulateSample> {
    async fn start_fan_cleaning(&mut self) -> Result<()> {
        self.run(MockOp::FanCleaning, |_| Ok(())).await
    }
}

/// Handle for controlling a mock sensor.
///
/// Cloning the handle shares the same underlying mock.
pub struct MockSensorHandle<S> {
    kind: DeviceKind,
    state: Arc<Mutex<MockState<S>>>,
}

impl<S> Clone for MockSensorHandle<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            state: Arc::clone(&self.state),
        }
    }
}

impl<S> fmt::Debug for MockSensorHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSensorHandle")
            .field("kind", &self.kind)
            .finish()
    }
}

impl<S: Clone> MockSensorHandle<S> {
    fn lock(&self) -> MutexGuard<'_, MockState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Device this handle controls.
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Queue a sample for the next `read_result`.
    pub fn push_sample(&self, sample: S) {
        self.lock().samples.push_back(sample);
    }

    /// Replace the sample returned when the queue is empty.
    pub fn set_default_sample(&self, sample: S) {
        self.lock().default_sample = sample;
    }

    /// Number of scripted samples not yet consumed.
    pub fn queued_samples(&self) -> usize {
        self.lock().samples.len()
    }

    /// Report "not ready" for the first `polls` queries after each start.
    pub fn set_ready_after(&self, polls: u32) {
        self.lock().ready_after = polls;
    }

    /// Never assert data-ready.
    pub fn set_never_ready(&self, never_ready: bool) {
        self.lock().never_ready = never_ready;
    }

    /// Make every command take `latency` of (virtual) time.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Replace the identity returned by `identify`; `None` makes it NACK.
    pub fn set_identity(&self, identity: Option<DeviceInfo>) {
        self.lock().identity = identity;
    }

    /// Fail the next occurrence of `op` with `error`.
    pub fn fail_next(&self, op: MockOp, error: HardwareError) {
        self.lock()
            .next_failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Fail every occurrence of `op` with `error` until cleared.
    pub fn fail_always(&self, op: MockOp, error: HardwareError) {
        self.lock().persistent_failures.insert(op, error);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.next_failures.clear();
        state.persistent_failures.clear();
    }

    /// Parameters successfully written, in order.
    pub fn writes(&self) -> Vec<Parameter> {
        self.lock().writes.clone()
    }

    /// Every command observed, in order.
    pub fn events(&self) -> Vec<MockOp> {
        self.lock().events.clone()
    }

    /// How many times `op` was issued.
    pub fn count(&self, op: MockOp) -> usize {
        self.lock().events.iter().filter(|e| **e == op).count()
    }

    /// Highest number of commands observed in flight at the same time.
    pub fn peak_in_flight(&self) -> u32 {
        self.lock().peak_in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_read_cycle() {
        let (mut sensor, handle) = MockSensor::weather();
        handle.set_ready_after(2);

        sensor.start().await.unwrap();
        assert!(!sensor.poll_ready().await.unwrap());
        assert!(!sensor.poll_ready().await.unwrap());
        assert!(sensor.poll_ready().await.unwrap());

        let sample = sensor.read_result().await.unwrap();
        assert_eq!(sample.temperature_centi_c, 2_250);
        assert_eq!(handle.count(MockOp::PollReady), 3);
    }

    #[tokio::test]
    async fn test_mock_start_resets_readiness() {
        let (mut sensor, handle) = MockSensor::co2();
        handle.set_ready_after(1);

        sensor.start().await.unwrap();
        assert!(!sensor.poll_ready().await.unwrap());
        assert!(sensor.poll_ready().await.unwrap());

        sensor.start().await.unwrap();
        assert!(!sensor.poll_ready().await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_scripted_samples_then_default() {
        let (mut sensor, handle) = MockSensor::co2();
        handle.push_sample(RawCo2Sample {
            co2_ppm: 1_200,
            temperature_milli_c: 0,
            humidity_milli_rh: 0,
        });

        assert_eq!(sensor.read_result().await.unwrap().co2_ppm, 1_200);
        assert_eq!(sensor.read_result().await.unwrap().co2_ppm, 450);
        assert_eq!(handle.queued_samples(), 0);
    }

    #[tokio::test]
    async fn test_mock_fail_next_is_one_shot() {
        let (mut sensor, handle) = MockSensor::particulate();
        handle.fail_next(MockOp::Start, HardwareError::nack("start_measurement"));

        assert_eq!(
            sensor.start().await.unwrap_err(),
            HardwareError::nack("start_measurement")
        );
        assert!(sensor.start().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_fail_always_until_cleared() {
        let (mut sensor, handle) = MockSensor::co2();
        handle.fail_always(MockOp::PollReady, HardwareError::crc("get_data_ready"));

        assert!(sensor.poll_ready().await.is_err());
        assert!(sensor.poll_ready().await.is_err());

        handle.clear_failures();
        assert!(sensor.poll_ready().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_write_param_rejects_foreign_parameter() {
        let (mut sensor, handle) = MockSensor::particulate();

        let err = sensor
            .write_param(Parameter::Altitude(100))
            .await
            .unwrap_err();
        assert!(matches!(err, HardwareError::Unsupported { .. }));

        sensor
            .write_param(Parameter::CleaningInterval(3_600))
            .await
            .unwrap();
        assert_eq!(handle.writes(), vec![Parameter::CleaningInterval(3_600)]);
    }

    #[tokio::test]
    async fn test_mock_identity_nack() {
        let (mut sensor, handle) = MockSensor::particulate();
        assert_eq!(sensor.identify().await.unwrap().name, "SPS30");

        handle.set_identity(None);
        assert!(matches!(
            sensor.identify().await,
            Err(HardwareError::Nack { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_tracks_concurrent_commands() {
        let (sensor_a, handle) = MockSensor::weather();
        handle.set_latency(Duration::from_millis(50));

        // Two drivers sharing one mock state, no guard in between.
        let mut a = sensor_a;
        let mut b = MockSensor {
            kind: DeviceKind::Weather,
            state: Arc::clone(&handle.state),
        };

        let (ra, rb) = tokio::join!(a.start(), b.start());
        ra.unwrap();
        rb.unwrap();
        assert_eq!(handle.peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_mock_fan_cleaning_is_recorded() {
        let (mut sensor, handle) = MockSensor::particulate();
        sensor.start_fan_cleaning().await.unwrap();
        assert_eq!(handle.count(MockOp::FanCleaning), 1);
    }
}
