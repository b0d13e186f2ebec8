//! Tracing setup for the command-line tool.
//!
//! Logs go to stderr so stdout only carries reports and the final document.
//! `RUST_LOG` overrides the default level (DEBUG in debug builds, INFO
//! otherwise).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Console log level used when `RUST_LOG` is unset
    pub console_level: Level,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };
        Self { console_level }
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init(config: TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.console_level.as_str().to_lowercase()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(env_filter);

    tracing_subscriber::registry().with(console_layer).init();
    tracing::debug!("telemetry initialized");
}
