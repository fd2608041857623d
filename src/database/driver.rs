use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sea_orm::{ConnectOptions, Database, DbErr};
use thiserror::Error;

use super::pool::DatabasePool;
use crate::config::PoolConfig;

/// Alias a pool is published under when created without one
pub const DEFAULT_ALIAS: &str = "default";

/// Pool creation or lookup failure
#[derive(Error, Debug)]
pub enum DriverError {
    /// The pool options were rejected before connecting
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// Another live pool already holds the alias
    #[error("pool alias \"{0}\" is already in use")]
    AliasInUse(String),

    /// No live pool holds the alias
    #[error("pool alias \"{0}\" not found in the connection pool cache")]
    AliasNotFound(String),

    /// The database refused the connection
    #[error("{0}")]
    Database(#[from] DbErr),
}

/// Database driver handle
///
/// Creates pools and keeps a cache of them by alias so that later
/// registrations can reuse a pool without repeating its options. Clones
/// share the cache.
#[derive(Clone, Default)]
pub struct Driver {
    pools: Arc<DashMap<String, DatabasePool>>,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from `config` and publish it in the alias cache
    ///
    /// The pool is cached under `config.pool_alias` when set, otherwise under
    /// [`DEFAULT_ALIAS`] if no live pool holds that alias yet.
    #[tracing::instrument(skip(self, config), fields(
        alias = ?config.pool_alias,
        pool_min = config.pool_min,
        pool_max = config.pool_max
    ))]
    pub async fn create_pool(&self, config: &PoolConfig) -> Result<DatabasePool, DriverError> {
        check(config)?;

        if let Some(alias) = &config.pool_alias {
            if self.live(alias).is_some() {
                return Err(DriverError::AliasInUse(alias.clone()));
            }
        }

        let mut options = ConnectOptions::new(connection_url(config));
        options
            .min_connections(config.pool_min)
            .max_connections(config.pool_max)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .sqlx_logging(config.log_queries);

        let connection = Database::connect(options).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect pool");
            DriverError::Database(e)
        })?;

        let alias = match &config.pool_alias {
            Some(alias) => Some(alias.clone()),
            None if self.live(DEFAULT_ALIAS).is_none() => Some(DEFAULT_ALIAS.to_string()),
            None => None,
        };

        let pool = DatabasePool::new(connection, alias.clone());

        if let Some(alias) = alias {
            let published = match self.pools.entry(alias.clone()) {
                Entry::Occupied(mut entry) if entry.get().is_closed() => {
                    entry.insert(pool.clone());
                    true
                }
                Entry::Occupied(_) => false,
                Entry::Vacant(entry) => {
                    entry.insert(pool.clone());
                    true
                }
            };

            if !published {
                // another pool took the alias while this one was connecting
                pool.close().await.ok();
                return Err(DriverError::AliasInUse(alias));
            }
        }

        tracing::info!(alias = ?pool.alias(), backend = ?pool.backend(), "Database pool created");

        Ok(pool)
    }

    /// Look up a live pool by alias
    #[tracing::instrument(skip(self))]
    pub fn get_pool(&self, alias: &str) -> Result<DatabasePool, DriverError> {
        self.live(alias)
            .ok_or_else(|| DriverError::AliasNotFound(alias.to_string()))
    }

    /// Aliases of every live pool, sorted
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .pools
            .iter()
            .filter(|entry| !entry.value().is_closed())
            .map(|entry| entry.key().clone())
            .collect();
        aliases.sort();
        aliases
    }

    /// Cached pool for `alias`; a closed pool is evicted and reported as missing
    fn live(&self, alias: &str) -> Option<DatabasePool> {
        let pool = self.pools.get(alias).map(|entry| entry.value().clone())?;

        if pool.is_closed() {
            self.pools.remove_if(alias, |_, cached| cached.is_closed());
            return None;
        }

        Some(pool)
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("aliases", &self.aliases())
            .finish()
    }
}

fn check(config: &PoolConfig) -> Result<(), DriverError> {
    if config.connect_string.trim().is_empty() {
        return Err(DriverError::InvalidConfig("connect_string cannot be empty".to_string()));
    }
    if config.pool_max == 0 {
        return Err(DriverError::InvalidConfig("pool_max must be > 0".to_string()));
    }
    if config.pool_min > config.pool_max {
        return Err(DriverError::InvalidConfig(format!(
            "pool_min ({}) cannot exceed pool_max ({})",
            config.pool_min, config.pool_max
        )));
    }
    if config.password.is_some() && config.user.is_none() {
        return Err(DriverError::InvalidConfig("password given without user".to_string()));
    }
    if config.pool_alias.as_deref().is_some_and(str::is_empty) {
        return Err(DriverError::InvalidConfig("pool_alias cannot be empty".to_string()));
    }
    Ok(())
}

/// Splice `user`/`password` into `scheme://host/...` unless the URL already
/// carries credentials
fn connection_url(config: &PoolConfig) -> String {
    let Some(user) = &config.user else {
        return config.connect_string.clone();
    };
    let Some((scheme, rest)) = config.connect_string.split_once("://") else {
        return config.connect_string.clone();
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.contains('@') {
        return config.connect_string.clone();
    }

    let credentials = match &config.password {
        Some(password) => format!(
            "{}:{}",
            urlencoding::encode(user),
            urlencoding::encode(password)
        ),
        None => urlencoding::encode(user).into_owned(),
    };

    format!("{}://{}@{}", scheme, credentials, rest)
}
