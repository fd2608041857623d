//! Database pool handle
//!
//! A `DatabasePool` wraps the sea-orm connection pool created by the
//! [`Driver`](super::Driver). Clones share the same underlying pool and the
//! same closed flag, so closing any clone closes them all.
//!
//! # Example
//!
//! ```rust,no_run
//! use lighter_pool::config::PoolConfig;
//! use lighter_pool::database::Driver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Driver::new();
//! let pool = driver.create_pool(&PoolConfig::new("sqlite::memory:")).await?;
//!
//! let conn = pool.get_connection().await?;
//! let result = conn.execute("SELECT 1 AS FOO", []).await?;
//! assert_eq!(result.len(), 1);
//! conn.close().await?;
//!
//! pool.close().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, TransactionTrait, Value};
use thiserror::Error;

use super::connection::{Connection, ResultSet};

/// Database operation error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool was closed and hands out no more connections
    #[error("Database pool is closed")]
    PoolClosed,

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    QueryFailed(#[from] DbErr),

    /// The driver refused to close the pool
    #[error("Failed to close database pool: {0}")]
    CloseFailed(String),
}

/// Shared handle on one driver connection pool
#[derive(Clone)]
pub struct DatabasePool {
    /// Underlying sea-orm pool
    connection: Arc<DatabaseConnection>,
    /// Alias under which the driver published this pool, if any
    alias: Option<String>,
    closed: Arc<AtomicBool>,
}

impl DatabasePool {
    /// Wrap an established sea-orm connection pool
    pub fn new(connection: DatabaseConnection, alias: Option<String>) -> Self {
        Self {
            connection: Arc::new(connection),
            alias,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a reference to the underlying database connection
    ///
    /// # Warning
    ///
    /// Bypasses the closed check. Statements issued after [`close`](Self::close)
    /// are rejected by the driver instead.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.connection.get_database_backend()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Check a connection out of the pool
    ///
    /// Waits up to the pool's connect timeout when every slot is taken. The
    /// slot is held until the returned [`Connection`] is committed, closed or
    /// dropped.
    #[tracing::instrument(skip(self), fields(alias = ?self.alias))]
    pub async fn get_connection(&self) -> Result<Connection, DatabaseError> {
        if self.is_closed() {
            return Err(DatabaseError::PoolClosed);
        }

        let session = self.connection.begin().await?;

        Ok(Connection::new(session))
    }

    /// Run one statement on a fresh connection and commit it
    pub async fn query<I>(&self, sql: &str, values: I) -> Result<ResultSet, DatabaseError>
    where
        I: IntoIterator<Item = Value>,
    {
        let conn = self.get_connection().await?;
        let result = conn.execute(sql, values).await?;
        conn.commit().await?;

        Ok(result)
    }

    /// Close the pool
    ///
    /// Only the first call reaches the driver; later calls return `Ok(())`.
    #[tracing::instrument(skip(self), fields(alias = ?self.alias))]
    pub async fn close(&self) -> Result<(), DatabaseError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Database pool already closed");
            return Ok(());
        }

        let connection = DatabaseConnection::clone(&self.connection);
        match connection.close().await {
            Ok(()) => {
                tracing::info!("Database pool closed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to close database pool");
                Err(DatabaseError::CloseFailed(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("alias", &self.alias)
            .field("backend", &self.backend())
            .field("closed", &self.is_closed())
            .finish()
    }
}
