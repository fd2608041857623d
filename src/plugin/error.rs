use thiserror::Error;

use super::host::HostError;
use crate::database::DriverError;

/// Broad class of a registration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or conflicting plugin options
    Config,
    /// The driver could not create the pool
    PoolCreation,
}

/// Registration failure
///
/// Messages are prefixed with `lighter-pool` so they stand out among other
/// startup failures.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Neither `pool` nor `pool_alias` was given
    ///
    /// Names the options "database pool options" rather than after a
    /// specific driver, since any sea-orm backend is accepted.
    #[error("lighter-pool: must supply options.pool database pool options")]
    MissingPool,

    /// The driver has no live pool under the alias
    #[error("lighter-pool: could not get pool alias \"{alias}\": {source}")]
    PoolAlias {
        alias: String,
        #[source]
        source: DriverError,
    },

    /// A pool with the same name is already registered
    #[error("lighter-pool: connection name \"{0}\" has already been registered")]
    DuplicateName(String),

    /// A second anonymous registration on the same host
    #[error("lighter-pool has already been registered")]
    AlreadyRegistered,

    /// The host rejected the decoration
    #[error("lighter-pool: {0}")]
    Host(#[from] HostError),

    /// The driver rejected the pool options or could not connect
    #[error("lighter-pool: failed to create pool: {0}")]
    PoolCreation(#[source] DriverError),
}

impl RegistrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistrationError::PoolCreation(_) => ErrorKind::PoolCreation,
            _ => ErrorKind::Config,
        }
    }
}
