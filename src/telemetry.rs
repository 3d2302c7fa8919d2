//! Tracing subscriber initialization.
//!
//! The library only emits `tracing` events; binaries call
//! [`init_telemetry`] once to route them to stderr.

use crate::error::{Error, Result};

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "beacon_queue=debug").
    pub log_level: String,
    /// Single-line compact output instead of the full fmt layout.
    pub compact: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            compact: true,
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed or a global subscriber
/// was already set.
pub fn init_telemetry(config: TelemetryConfig) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| Error::Config(format!("invalid log level {:?}: {e}", config.log_level)))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.compact {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))
}
