//! Integration tests for the reconfiguration queue against a live manager.

mod common;

use std::sync::Arc;
use std::time::Duration;

use airq_core::{DeviceKind, Parameter};
use airq_hardware::HardwareError;
use airq_hardware::mock::MockOp;
use airq_sensors::{DrainReport, PendingJob, ReconfigQueue, SensorManagerConfig};
use common::initialized;
use tokio::sync::watch;

#[tokio::test(start_paused = true)]
async fn test_coalesced_jobs_apply_latest_value_once() {
    let bench = initialized(SensorManagerConfig::default()).await;
    let queue = ReconfigQueue::new();

    queue.enqueue(Parameter::TemperatureOffset(1_000));
    queue.enqueue(Parameter::TemperatureOffset(-500));

    let report = queue.drain(&bench.manager).await;

    assert_eq!(
        report,
        DrainReport {
            applied: 1,
            deferred: 0,
            discarded: 0,
        }
    );
    assert_eq!(bench.co2.writes(), vec![Parameter::TemperatureOffset(-500)]);
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_stays_pending() {
    let bench = initialized(SensorManagerConfig::default()).await;
    let queue = ReconfigQueue::new();
    bench
        .co2
        .fail_next(MockOp::WriteParam, HardwareError::nack("set_sensor_altitude"));
    bench
        .co2
        .fail_next(MockOp::WriteParam, HardwareError::nack("set_sensor_altitude"));

    queue.enqueue(Parameter::Altitude(350));

    for expected_attempts in 1..=2 {
        let report = queue.drain(&bench.manager).await;
        assert_eq!(report.deferred, 1);
        assert_eq!(
            queue.pending(),
            vec![PendingJob {
                device: DeviceKind::Co2,
                parameter: Parameter::Altitude(350),
                failed_attempts: expected_attempts,
            }]
        );
    }

    let report = queue.drain(&bench.manager).await;
    assert_eq!(report.applied, 1);
    assert!(queue.is_empty());
    assert_eq!(bench.co2.writes(), vec![Parameter::Altitude(350)]);
}

#[tokio::test(start_paused = true)]
async fn test_permanent_failure_is_discarded() {
    let bench = initialized(SensorManagerConfig::default()).await;
    let queue = ReconfigQueue::new();
    bench.pm.fail_next(
        MockOp::WriteParam,
        HardwareError::unsupported("write_auto_cleaning_interval"),
    );

    queue.enqueue(Parameter::CleaningInterval(86_400));
    let report = queue.drain(&bench.manager).await;

    assert_eq!(report.discarded, 1);
    assert!(queue.is_empty());
    assert!(bench.pm.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_newer_value_during_write_is_kept() {
    let bench = initialized(SensorManagerConfig::default()).await;
    let queue = Arc::new(ReconfigQueue::new());
    bench.co2.set_latency(Duration::from_millis(500));

    queue.enqueue(Parameter::Altitude(100));
    let drain = {
        let queue = Arc::clone(&queue);
        let manager = Arc::clone(&bench.manager);
        tokio::spawn(async move { queue.drain(&manager).await })
    };
    tokio::task::yield_now().await;

    // The first write is in flight; this value must survive it.
    queue.enqueue(Parameter::Altitude(200));
    assert_eq!(drain.await.unwrap().applied, 1);
    assert_eq!(
        queue.pending()[0].parameter,
        Parameter::Altitude(200),
        "newer value dropped"
    );

    queue.drain(&bench.manager).await;
    assert_eq!(
        bench.co2.writes(),
        vec![Parameter::Altitude(100), Parameter::Altitude(200)]
    );
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drain_task_applies_and_retries() {
    let bench = initialized(SensorManagerConfig::default()).await;
    let queue = Arc::new(ReconfigQueue::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(Arc::clone(&queue).run_drain_task(
        Arc::clone(&bench.manager),
        Duration::from_secs(30),
        shutdown_rx,
    ));

    bench
        .co2
        .fail_next(MockOp::WriteParam, HardwareError::crc("set_automatic_self_calibration"));
    queue.enqueue(Parameter::AutoSelfCalibration(false));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(queue.len(), 1, "failed write should stay pending");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(queue.is_empty());
    assert_eq!(bench.co2.writes(), vec![Parameter::AutoSelfCalibration(false)]);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}
