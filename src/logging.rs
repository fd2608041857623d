//! Tracing subscriber setup

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, ObservabilityConfig};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. Safe to call more than
/// once; only the first call has an effect.
pub fn init(config: &ObservabilityConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.level));

        let registry = tracing_subscriber::registry().with(filter);
        let result = match config.format {
            LogFormat::Pretty => registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_target(true).with_level(true))
                .try_init(),
        };

        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
