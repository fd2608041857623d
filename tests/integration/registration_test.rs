//! Integration tests for pool registration
//!
//! Covers the registration contract end to end against in-memory SQLite:
//! - default and named pools answering queries
//! - duplicate name and duplicate anonymous registration
//! - missing pool options, unknown aliases, rejected pool options
//! - shutdown hooks closing exactly the pools that were created

use lighter_pool::config::{PluginOptions, PoolConfig};
use lighter_pool::database::{DatabaseError, Driver};
use lighter_pool::plugin::{self, DECORATION, ErrorKind, Hook, PluginHost, RegistrationError};
use lighter_pool::testing::setup;

async fn select_foo(registry_pool: &lighter_pool::DatabasePool) -> i64 {
    let conn = registry_pool.get_connection().await.unwrap();
    let result = conn.execute("SELECT 1 AS FOO", []).await.unwrap();

    assert_eq!(result.len(), 1);
    let foo = result.rows()[0].get::<i64>("FOO").unwrap();
    conn.close().await.unwrap();
    foo
}

// =============================================================================
// Successful registration
// =============================================================================

#[tokio::test]
async fn test_creates_pool_from_config() {
    let driver = Driver::new();
    let mut host = PluginHost::new();
    let pool = setup::memory_pool().credentials("travis", "travis");

    plugin::register(&mut host, &driver, PluginOptions::pool(pool))
        .await
        .unwrap();

    assert!(host.has_decorator(DECORATION));
    assert_eq!(host.hook_count(Hook::OnClose), 1);

    let registry = setup::registry(&host);
    let conn = registry.get_connection().await.unwrap();
    let result = conn.execute("SELECT 1 AS FOO", []).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.rows()[0].get::<i64>("FOO").unwrap(), 1);
}

#[tokio::test]
async fn test_creates_named_pool_from_config() {
    let (host, _driver) = setup::host(vec![setup::options(Some("testdb"))]).await;

    let registry = setup::registry(&host);

    assert_eq!(select_foo(registry.pool()).await, 1);
    assert_eq!(select_foo(registry.named("testdb").unwrap()).await, 1);
    assert_eq!(host.hook_count(Hook::OnClose), 1);
}

#[tokio::test]
async fn test_named_pools_coexist() {
    let (host, _driver) = setup::host(vec![
        setup::options(None),
        setup::options(Some("reports")),
        setup::options(Some("audit")),
    ])
    .await;

    let registry = setup::registry(&host);

    assert_eq!(registry.names(), vec!["audit", "reports"]);
    for name in ["audit", "reports"] {
        assert_eq!(select_foo(registry.named(name).unwrap()).await, 1);
    }
    assert_eq!(select_foo(registry.pool()).await, 1);
    assert_eq!(host.hook_count(Hook::OnClose), 3);
}

#[tokio::test]
async fn test_registry_exposes_driver_handle() {
    let (host, driver) = setup::host(vec![PluginOptions::pool(
        setup::memory_pool().alias("primary"),
    )])
    .await;

    let registry = setup::registry(&host);

    assert_eq!(registry.db().aliases(), driver.aliases());
    assert!(registry.db().get_pool("primary").is_ok());
}

#[tokio::test]
async fn test_registers_pool_by_alias() {
    let driver = Driver::new();
    let shared = driver
        .create_pool(&setup::memory_pool().alias("shared"))
        .await
        .unwrap();
    let mut host = PluginHost::new();

    plugin::register(&mut host, &driver, PluginOptions::alias("shared"))
        .await
        .unwrap();

    let registry = setup::registry(&host);
    assert_eq!(registry.pool().alias(), Some("shared"));
    assert_eq!(select_foo(registry.pool()).await, 1);

    // the alias owner closes the pool, not the host
    assert_eq!(host.hook_count(Hook::OnClose), 0);
    host.close().await.unwrap();
    assert!(!shared.is_closed());
}

// =============================================================================
// Rejected registration
// =============================================================================

#[tokio::test]
async fn test_duplicate_connection_names_should_fail() {
    let (mut host, driver) = setup::host(vec![setup::options(Some("testdb"))]).await;

    let err = plugin::register(&mut host, &driver, setup::options(Some("testdb")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(
        err.to_string(),
        "lighter-pool: connection name \"testdb\" has already been registered"
    );
}

#[tokio::test]
async fn test_duplicate_plugin_registration_should_fail() {
    let (mut host, driver) = setup::host(vec![setup::options(None)]).await;

    let err = plugin::register(&mut host, &driver, setup::options(None))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::AlreadyRegistered));
    assert_eq!(err.to_string(), "lighter-pool has already been registered");
}

#[tokio::test]
async fn test_anonymous_after_named_should_fail() {
    let (mut host, driver) = setup::host(vec![setup::options(Some("testdb"))]).await;

    let err = plugin::register(&mut host, &driver, setup::options(None))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::AlreadyRegistered));
}

#[tokio::test]
async fn test_should_fail_if_no_pool_option_is_provided() {
    let driver = Driver::new();
    let mut host = PluginHost::new();

    let err = plugin::register(&mut host, &driver, PluginOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(
        err.to_string(),
        "lighter-pool: must supply options.pool database pool options"
    );
    assert!(!host.has_decorator(DECORATION));
}

#[tokio::test]
async fn test_should_fail_if_could_not_get_pool_alias() {
    let driver = Driver::new();
    let mut host = PluginHost::new();

    let err = plugin::register(&mut host, &driver, PluginOptions::alias("test"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("lighter-pool: could not get pool alias"));
    assert!(err.to_string().contains("\"test\""));
}

#[tokio::test]
async fn test_should_fail_if_pool_cannot_be_created() {
    let driver = Driver::new();

    for pool in [
        setup::memory_pool().size(5, 2),
        setup::memory_pool().size(0, 0),
        PoolConfig::new("localhost/xe").credentials("travis", "travis"),
    ] {
        let mut host = PluginHost::new();

        let err = plugin::register(&mut host, &driver, PluginOptions::pool(pool))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PoolCreation);
        assert!(
            err.to_string().contains("lighter-pool: failed to create pool"),
            "unexpected message: {err}"
        );
        assert!(!host.has_decorator(DECORATION));
        assert_eq!(host.hook_count(Hook::OnClose), 0);
    }
}

#[tokio::test]
async fn test_failed_registration_keeps_existing_pools() {
    let (mut host, driver) = setup::host(vec![setup::options(Some("testdb"))]).await;

    let bad = PluginOptions::pool(setup::memory_pool().size(3, 1)).named("reports");
    assert!(plugin::register(&mut host, &driver, bad).await.is_err());

    let registry = setup::registry(&host);
    assert_eq!(registry.names(), vec!["testdb"]);
    assert_eq!(select_foo(registry.named("testdb").unwrap()).await, 1);

    // the name is still free for a valid registration
    plugin::register(&mut host, &driver, setup::options(Some("reports")))
        .await
        .unwrap();
    assert_eq!(setup::registry(&host).names(), vec!["reports", "testdb"]);
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test]
async fn test_close_hooks_close_every_created_pool() {
    let (mut host, _driver) = setup::host(vec![
        setup::options(None),
        setup::options(Some("reports")),
    ])
    .await;

    let registry = setup::registry(&host).clone();

    host.close().await.unwrap();

    assert!(registry.pool().is_closed());
    assert!(registry.named("reports").unwrap().is_closed());
    assert!(matches!(
        registry.get_connection().await,
        Err(DatabaseError::PoolClosed)
    ));
}

#[tokio::test]
async fn test_closed_alias_can_be_recreated() {
    let (mut host, driver) = setup::host(vec![PluginOptions::pool(
        setup::memory_pool().alias("primary"),
    )])
    .await;

    host.close().await.unwrap();

    assert!(driver.get_pool("primary").is_err());

    let mut next = PluginHost::new();
    plugin::register(
        &mut next,
        &driver,
        PluginOptions::pool(setup::memory_pool().alias("primary")),
    )
    .await
    .unwrap();
    assert!(driver.get_pool("primary").is_ok());
}
