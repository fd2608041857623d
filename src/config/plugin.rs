use std::fmt;

use serde::{Deserialize, Serialize};

/// Options for one pool registration
///
/// `pool` is required unless `pool_alias` names a pool the driver already
/// holds. When both are given the alias wins and `pool` is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Driver pool options used to create a new pool
    #[serde(default)]
    pub pool: Option<PoolConfig>,
    /// Registry name; absent or empty means the default pool
    #[serde(default)]
    pub name: Option<String>,
    /// Reuse a pool already published in the driver's alias cache
    #[serde(default)]
    pub pool_alias: Option<String>,
}

impl PluginOptions {
    /// Options creating a default pool from `pool`
    pub fn pool(pool: PoolConfig) -> Self {
        Self {
            pool: Some(pool),
            ..Self::default()
        }
    }

    /// Options referring to an existing driver alias
    pub fn alias(alias: impl Into<String>) -> Self {
        Self {
            pool_alias: Some(alias.into()),
            ..Self::default()
        }
    }

    /// Registers the pool under `name`
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `name` with the empty string folded into "no name"
    pub fn registry_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Driver pool options
#[derive(Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Username spliced into the connection URL
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Connection URL, e.g. `postgres://localhost/app` or `sqlite::memory:`
    pub connect_string: String,
    /// Connections kept open while idle
    #[serde(default)]
    pub pool_min: u32,
    /// Upper bound on open connections
    #[serde(default = "default_pool_max")]
    pub pool_max: u32,
    /// Publish the created pool in the driver's alias cache under this name
    #[serde(default)]
    pub pool_alias: Option<String>,
    /// Seconds to wait for a new connection or a free pool slot
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Seconds before an idle connection above `pool_min` is dropped
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    /// Let the driver log every statement
    #[serde(default)]
    pub log_queries: bool,
}

fn default_pool_max() -> u32 {
    4
}

fn default_connect_timeout() -> u64 {
    60
}

fn default_idle_timeout() -> u64 {
    60
}

impl PoolConfig {
    pub fn new(connect_string: impl Into<String>) -> Self {
        Self {
            user: None,
            password: None,
            connect_string: connect_string.into(),
            pool_min: 0,
            pool_max: default_pool_max(),
            pool_alias: None,
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            log_queries: false,
        }
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.pool_alias = Some(alias.into());
        self
    }

    pub fn size(mut self, pool_min: u32, pool_max: u32) -> Self {
        self.pool_min = pool_min;
        self.pool_max = pool_max;
        self
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connect_string", &self.connect_string)
            .field("pool_min", &self.pool_min)
            .field("pool_max", &self.pool_max)
            .field("pool_alias", &self.pool_alias)
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("log_queries", &self.log_queries)
            .finish()
    }
}
