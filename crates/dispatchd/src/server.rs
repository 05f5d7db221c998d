//! HTTP server assembly.

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::lifecycle::LifecycleService;
use crate::routes;

/// Shared state handed to every handler.
pub struct AppState {
    pub service: LifecycleService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: LifecycleService) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::request_routes())
        .merge(routes::queue_routes())
        .merge(routes::technician_routes())
        .merge(routes::vehicle_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until ctrl-c.
pub async fn run(config: &Config, state: Arc<AppState>) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("bind {}", config.server.listen_addr))?;
    info!("dispatchd listening on {}", config.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
