use anyhow::{anyhow, Result};
use axum::Router;
use tracing::info;

use crate::cache::token_manager::TokenManager;
use crate::config::settings::ServiceConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::token_route::TokenRouteState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_state: TokenRouteState,
}

impl AppState {
    pub fn new(metrics: &Metrics, token_manager: TokenManager) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            token_state: TokenRouteState::new(token_manager),
        }
    }
}

/// Token route plus, when enabled, the metrics route.
pub async fn router(service_config: &ServiceConfig, token_manager: TokenManager) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, token_manager);

    Router::new()
        .merge(state.metrics_state.router(&service_config.metrics))
        .merge(state.token_state.router(&service_config.token.path))
        .with_state(state)
}

/// Serve until the process receives ctrl-c.
pub async fn start(service_config: &ServiceConfig, token_manager: TokenManager) -> Result<()> {
    let app = router(service_config, token_manager).await;

    let bind_addr = format!("{}:{}", service_config.server.host, service_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", bind_addr, e))?;
    info!(
        "listening on {}, token served at {}",
        bind_addr, service_config.token.path
    );

    let metrics = get_metrics().await;
    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {}", e);
        futures::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
