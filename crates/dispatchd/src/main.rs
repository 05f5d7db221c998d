//! dispatchd entry point.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dispatchd::audit::AuditLog;
use dispatchd::config::Config;
use dispatchd::lifecycle::LifecycleService;
use dispatchd::server::{self, AppState};
use dispatchd::store::{Store, StoreLocation};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("dispatchd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let store = Store::open(StoreLocation::Custom(config.store.db_path.clone())).await?;
    let audit = AuditLog::new(config.store.audit_path.clone());
    let service = LifecycleService::new(store, audit, &config);
    let state = Arc::new(AppState::new(service));

    server::run(&config, state).await
}
