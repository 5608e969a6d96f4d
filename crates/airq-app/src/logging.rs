//! Tracing subscriber initialisation.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format (`json` or anything else).
pub const LOG_FORMAT_ENV: &str = "AIRQ_LOG_FORMAT";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. `AIRQ_LOG_FORMAT=json` switches to
/// JSON lines; otherwise the compact text format is used.
pub fn init(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if std::env::var(LOG_FORMAT_ENV).as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }
}
