// 📜 Logging - tracing subscriber setup shared by the CLI and the server

use crate::config::LoggingConfig;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// RUST_LOG takes precedence; otherwise the configured filter is used.
/// Calling this twice is harmless: the second install is ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
