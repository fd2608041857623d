//! Pool registration
//!
//! [`register`] validates [`PluginOptions`], obtains a pool from the
//! [`Driver`] and publishes it on a [`PluginHost`] as a [`PoolRegistry`]
//! stored under [`DECORATION`]. Every pool it creates gets an `onClose` hook
//! that closes it when the host shuts down.
//!
//! # Example
//!
//! ```rust,no_run
//! use lighter_pool::config::{PluginOptions, PoolConfig};
//! use lighter_pool::database::Driver;
//! use lighter_pool::plugin::{self, PluginHost, PoolRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Driver::new();
//! let mut host = PluginHost::new();
//!
//! plugin::register(&mut host, &driver, PluginOptions::pool(PoolConfig::new("sqlite::memory:"))).await?;
//!
//! let registry = host.decoration::<PoolRegistry>(plugin::DECORATION).unwrap();
//! let conn = registry.get_connection().await?;
//! conn.execute("SELECT 1 AS FOO", []).await?;
//!
//! host.close().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod host;
mod registry;

pub use error::{ErrorKind, RegistrationError};
pub use host::{Hook, HostError, PluginHost};
pub use registry::PoolRegistry;

use crate::config::{PluginOptions, PoolConfig};
use crate::database::{DatabasePool, Driver};

/// Host key the [`PoolRegistry`] is stored under
pub const DECORATION: &str = "database";

/// Where the pool for a registration comes from
enum PoolSource {
    Alias(String),
    Create(PoolConfig),
}

/// Register one pool on `host`
///
/// Uniqueness of the name (or of the anonymous registration) is checked
/// before the driver is asked for a pool, so a rejected registration leaves
/// neither an unclosed pool nor a changed registry behind.
#[tracing::instrument(skip(host, driver, options), fields(
    name = ?options.registry_name(),
    pool_alias = ?options.pool_alias
))]
pub async fn register(
    host: &mut PluginHost,
    driver: &Driver,
    options: PluginOptions,
) -> Result<(), RegistrationError> {
    let name = options.registry_name().map(str::to_string);

    let source = match (options.pool_alias, options.pool) {
        (Some(alias), _) => PoolSource::Alias(alias),
        (None, Some(config)) => PoolSource::Create(config),
        (None, None) => return Err(RegistrationError::MissingPool),
    };

    check_slot(host, name.as_deref())?;

    let (pool, created) = match source {
        PoolSource::Alias(alias) => {
            let pool = driver
                .get_pool(&alias)
                .map_err(|source| RegistrationError::PoolAlias { alias, source })?;
            (pool, false)
        }
        PoolSource::Create(config) => {
            let pool = driver
                .create_pool(&config)
                .await
                .map_err(RegistrationError::PoolCreation)?;
            (pool, true)
        }
    };

    attach(host, driver, name.as_deref(), pool.clone())?;

    if created {
        host.add_hook(Hook::OnClose, move || {
            Box::pin(async move { pool.close().await.map_err(anyhow::Error::from) })
        });
    }

    tracing::info!(created, "Pool registered");

    Ok(())
}

fn check_slot(host: &PluginHost, name: Option<&str>) -> Result<(), RegistrationError> {
    match host.decoration::<PoolRegistry>(DECORATION) {
        Some(registry) => match name {
            Some(name) if registry.contains(name) => {
                Err(RegistrationError::DuplicateName(name.to_string()))
            }
            Some(_) => Ok(()),
            None => Err(RegistrationError::AlreadyRegistered),
        },
        // something else owns the key
        None if host.has_decorator(DECORATION) => {
            Err(HostError::AlreadyDecorated(DECORATION.to_string()).into())
        }
        None => Ok(()),
    }
}

fn attach(
    host: &mut PluginHost,
    driver: &Driver,
    name: Option<&str>,
    pool: DatabasePool,
) -> Result<(), RegistrationError> {
    if let Some(registry) = host.decoration_mut::<PoolRegistry>(DECORATION) {
        // check_slot guarantees a fresh name here
        let name = name.ok_or(RegistrationError::AlreadyRegistered)?;
        if !registry.insert(name, pool) {
            return Err(RegistrationError::DuplicateName(name.to_string()));
        }
        return Ok(());
    }

    host.decorate(DECORATION, PoolRegistry::new(driver.clone(), pool, name))?;

    Ok(())
}
