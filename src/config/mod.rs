pub mod app;
pub mod plugin;

use thiserror::Error;

pub use app::{AppConfig, AppMetadata, LogFormat, ObservabilityConfig, ServerConfig};
pub use plugin::{PluginOptions, PoolConfig};

/// Configuration loading or validation failure
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value was loaded but is not acceptable
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Configuration sections check their own invariants after loading
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Load the application configuration from files and environment variables
pub fn load() -> Result<AppConfig, ConfigError> {
    app::load_config()
}
