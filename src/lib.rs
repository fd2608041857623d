pub mod config;
pub mod controllers;
pub mod database;
pub mod logging;
pub mod plugin;
pub mod router;

// Testing utilities (always available for integration tests)
pub mod testing;

// Re-export commonly used types for convenience
pub use database::{Connection, DatabasePool, Driver};
pub use plugin::{PluginHost, PoolRegistry, RegistrationError, register};
