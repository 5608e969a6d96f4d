//! `airq` – air-quality node against simulated sensors.
//!
//! Initializes the three devices, seeds their hardware settings, then runs
//! the reconfiguration drain task and the read loop. Settings and action
//! requests are read as JSON lines from stdin and answered on stdout:
//!
//! ```text
//! {"key": "LOOP_DELAY_S", "value": 120}
//! {"key":"LOOP_DELAY_S","status":"ACCEPTED"}
//! {"action": "clean_pm_sensor"}
//! {"action":"clean_pm_sensor","status":"ok"}
//! ```
//!
//! Ctrl-C stops both tasks after the cycle in progress.

use std::sync::Arc;

use airq_app::control::handle_line;
use airq_app::{ActionRequests, LogPublisher, Orchestrator, OrchestratorConfig, config, logging};
use airq_hardware::devices::{AnyCo2Sensor, AnyParticulateSensor, AnyWeatherSensor};
use airq_hardware::mock::MockSensor;
use airq_sensors::{DEFAULT_RETRY_INTERVAL, ReconfigQueue, SensorManager};
use airq_settings::{SettingValue, SettingsStore, SettingsValidator};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config::config_path(std::env::args().nth(1));
    let cfg = config::load(path.as_deref())?;
    logging::init(&cfg.log_filter);
    match &path {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("no configuration file, using defaults"),
    }

    let (weather, _) = MockSensor::weather();
    let (co2, _) = MockSensor::co2();
    let (particulate, _) = MockSensor::particulate();
    let sensors = Arc::new(SensorManager::new(
        cfg.sensor_manager_config(),
        AnyWeatherSensor::Mock(weather),
        AnyCo2Sensor::Mock(co2),
        AnyParticulateSensor::Mock(particulate),
    ));

    let queue = Arc::new(ReconfigQueue::new());
    let settings = Arc::new(SettingsStore::new());
    let validator = SettingsValidator::new(settings.clone(), queue.clone());
    let actions = Arc::new(ActionRequests::new());

    if let Some(secs) = cfg.loop_delay_s {
        let status = validator.apply("LOOP_DELAY_S", SettingValue::Int(secs));
        if !status.is_accepted() {
            warn!(loop_delay_s = secs, ?status, "configured loop delay ignored");
        }
    }

    for (kind, result) in sensors.initialize_all().await {
        if let Err(err) = result {
            warn!(device = %kind, error = %err, "device unavailable at startup");
        }
    }
    validator.seed_hardware();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let drain = tokio::spawn(queue.clone().run_drain_task(
        sensors.clone(),
        DEFAULT_RETRY_INTERVAL,
        shutdown_rx.clone(),
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        sensors,
        queue,
        settings,
        actions.clone(),
        LogPublisher::new(cfg.telemetry.stream_path.clone()),
        OrchestratorConfig {
            reinit_failed_devices: cfg.reinit_failed_devices,
        },
    ));
    let read_loop = {
        let orchestrator = orchestrator.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { orchestrator.run(shutdown).await })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Some(reply) = handle_line(&line, &validator, &actions) {
                        println!("{}", serde_json::to_string(&reply)?);
                    }
                }
                None => {
                    // stdin closed; keep running until Ctrl-C
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    info!("shutdown requested");
    shutdown_tx.send_replace(true);
    drain.await?;
    read_loop.await?;
    info!("airq stopped");
    Ok(())
}
