//! Unit tests for configuration loading
//!
//! - Loading the shipped config/default.toml
//! - Environment-specific overrides
//! - Environment variable precedence
//! - Validation of loaded values

use std::env;
use std::fs;
use std::path::Path;

use lighter_pool::config::app::load_config_from;
use lighter_pool::config::{ConfigError, LogFormat};
use serial_test::serial;
use tempfile::TempDir;

mod utils {
    /// Clean up environment variables with LIGHTER_POOL prefix
    pub fn clean_env_vars() {
        let keys: Vec<String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("LIGHTER_POOL"))
            .map(|(k, _)| k)
            .collect();

        for key in keys {
            unsafe { std::env::remove_var(&key) };
        }
    }
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
#[serial]
fn test_load_shipped_default_config() {
    utils::clean_env_vars();

    let config = load_config_from(Path::new("config"), "test");

    assert!(config.is_ok(), "Failed to load default configuration: {:?}", config.err());
    let config = config.unwrap();

    assert_eq!(config.app.name, "lighter-pool");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.observability.format, LogFormat::Pretty);

    assert_eq!(config.databases.len(), 2);
    assert_eq!(config.databases[0].registry_name(), None);
    assert_eq!(
        config.databases[0].pool.as_ref().unwrap().pool_alias.as_deref(),
        Some("primary")
    );
    assert_eq!(config.databases[1].registry_name(), Some("reports"));
    assert_eq!(config.databases[1].pool.as_ref().unwrap().pool_max, 2);
}

#[test]
#[serial]
fn test_empty_directory_uses_defaults() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();

    let config = load_config_from(dir.path(), "development").unwrap();

    assert_eq!(config.app.environment, "development");
    assert_eq!(config.app.shutdown_timeout, 30);
    assert_eq!(config.observability.level, "info");
    assert!(config.databases.is_empty());
}

#[test]
#[serial]
fn test_environment_file_overrides_default() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "default.toml", "[server]\nport = 8080\nhost = \"0.0.0.0\"\n");
    write(dir.path(), "production.toml", "[server]\nport = 9000\n");

    let config = load_config_from(dir.path(), "production").unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
#[serial]
fn test_local_file_overrides_environment_file() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "staging.toml", "[observability]\nlevel = \"warn\"\n");
    write(dir.path(), "local.toml", "[observability]\nlevel = \"trace\"\nformat = \"json\"\n");

    let config = load_config_from(dir.path(), "staging").unwrap();

    assert_eq!(config.observability.level, "trace");
    assert_eq!(config.observability.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_environment_variable_has_highest_precedence() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "default.toml", "[server]\nport = 8080\n");
    write(dir.path(), "local.toml", "[server]\nport = 8081\n");

    unsafe { env::set_var("LIGHTER_POOL__SERVER__PORT", "9090") };
    let config = load_config_from(dir.path(), "development");
    utils::clean_env_vars();

    assert_eq!(config.unwrap().server.port, 9090);
}

#[test]
#[serial]
fn test_databases_from_file() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "default.toml",
        r#"
[[databases]]
pool_alias = "shared"

[[databases]]
name = "testdb"
[databases.pool]
user = "travis"
password = "travis"
connect_string = "postgres://localhost/xe"
pool_min = 1
pool_max = 8
"#,
    );

    let config = load_config_from(dir.path(), "development").unwrap();

    assert_eq!(config.databases.len(), 2);
    assert_eq!(config.databases[0].pool_alias.as_deref(), Some("shared"));
    assert!(config.databases[0].pool.is_none());

    let pool = config.databases[1].pool.as_ref().unwrap();
    assert_eq!(pool.user.as_deref(), Some("travis"));
    assert_eq!(pool.pool_min, 1);
    assert_eq!(pool.pool_max, 8);
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "default.toml", "[app]\nshutdown_timeout = 0\n");

    let err = load_config_from(dir.path(), "development").unwrap_err();

    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("app.shutdown_timeout"));
}

#[test]
#[serial]
fn test_malformed_values_fail_to_load() {
    utils::clean_env_vars();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "default.toml", "[server]\nport = \"not a port\"\n");

    let err = load_config_from(dir.path(), "development").unwrap_err();

    assert!(matches!(err, ConfigError::Load(_)));
}
