//! Driver adapter over sea-orm
//!
//! `Driver` creates pools and caches them by alias, `DatabasePool` is the
//! shared pool handle and `Connection` runs statements on it.

mod connection;
mod driver;
mod pool;

pub use connection::{Connection, ResultSet, Row};
pub use driver::{DEFAULT_ALIAS, Driver, DriverError};
pub use pool::{DatabaseError, DatabasePool};
