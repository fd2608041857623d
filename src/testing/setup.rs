use crate::config::{PluginOptions, PoolConfig};
use crate::database::Driver;
use crate::plugin::{self, DECORATION, PluginHost, PoolRegistry};

/// Pool options for a fresh in-memory SQLite database
pub fn memory_pool() -> PoolConfig {
    PoolConfig::new("sqlite::memory:")
}

/// Options registering an in-memory pool, optionally under `name`
pub fn options(name: Option<&str>) -> PluginOptions {
    let options = PluginOptions::pool(memory_pool());

    match name {
        Some(name) => options.named(name),
        None => options,
    }
}

/// A host with every entry of `registrations` registered in order
///
/// # Panics
/// Panics if any registration fails. Tests that expect a failure should call
/// [`plugin::register`] themselves.
pub async fn host(registrations: Vec<PluginOptions>) -> (PluginHost, Driver) {
    let driver = Driver::new();
    let mut host = PluginHost::new();

    for options in registrations {
        plugin::register(&mut host, &driver, options)
            .await
            .expect("Failed to register pool");
    }

    (host, driver)
}

/// The registry decorating `host`
///
/// # Panics
/// Panics if nothing has been registered yet.
pub fn registry(host: &PluginHost) -> &PoolRegistry {
    host.decoration::<PoolRegistry>(DECORATION)
        .expect("No pool registered on host")
}
