//! Health check endpoints
//!
//! Provides endpoints for monitoring service health and pool connectivity

use actix_web::{HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};

use crate::plugin::PoolRegistry;

/// Liveness health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Service status
    pub status: String,
}

/// Connectivity of one registered pool
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Registry name, `None` for an unnamed root pool
    pub name: Option<String>,
    /// Driver alias, if the pool was published under one
    pub alias: Option<String>,
    /// `connected` or `disconnected`
    pub status: String,
}

/// Health check response including every pool
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Application version
    pub version: String,
    /// Per-pool status, root pool first
    pub pools: Vec<PoolStatus>,
}

/// Liveness check endpoint
///
/// Always returns 200 OK while the process serves requests.
#[get("/health")]
pub async fn health() -> impl Responder {
    tracing::debug!("Liveness check: healthy");

    HttpResponse::Ok().json(LivenessResponse {
        status: "healthy".to_string(),
    })
}

/// Check a connection out of every registered pool
///
/// 200 when all pools answer, 503 otherwise.
#[get("/health/db")]
pub async fn health_db(registry: web::Data<PoolRegistry>) -> impl Responder {
    let mut pools = Vec::new();
    let mut healthy = true;

    for (name, pool) in registry.pools() {
        let checked = async { pool.get_connection().await?.close().await };
        let connected = match checked.await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(name = ?name, error = %e, "Pool health check failed");
                false
            }
        };
        healthy &= connected;

        pools.push(PoolStatus {
            name: name.map(str::to_string),
            alias: pool.alias().map(str::to_string),
            status: if connected { "connected" } else { "disconnected" }.to_string(),
        });
    }

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pools,
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
