use actix_web::{App, HttpServer, web};
use anyhow::Context;

use lighter_pool::database::Driver;
use lighter_pool::plugin::{self, DECORATION, PluginHost, PoolRegistry};
use lighter_pool::{logging, router};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = lighter_pool::config::load().context("Failed to load configuration")?;

    logging::init(&config.observability);

    tracing::info!(
        name = %config.app.name,
        environment = %config.app.environment,
        databases = config.databases.len(),
        "Starting"
    );

    let driver = Driver::new();
    let mut host = PluginHost::new();

    for options in config.databases {
        if let Err(e) = plugin::register(&mut host, &driver, options).await {
            tracing::error!(error = %e, "Pool registration failed");
            host.close().await.ok();
            return Err(e.into());
        }
    }

    let registry = host
        .decoration::<PoolRegistry>(DECORATION)
        .cloned()
        .context("No database configured, add at least one [[databases]] entry")?;
    let registry = web::Data::new(registry);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .configure(router::route)
    })
    .workers(config.server.workers)
    .shutdown_timeout(config.app.shutdown_timeout)
    .bind((config.server.host.as_str(), config.server.port));

    let served = match server {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    // pools are closed even when the server stopped with an error
    host.close().await?;

    served.context("HTTP server failed")
}
