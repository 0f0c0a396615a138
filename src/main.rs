use std::sync::Arc;

use axum::Router;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use config::AppConfig;
use handlers::portal_handlers;
use services::transaction_store::InMemoryTransactionStore;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env()?;
    log_startup(&config);

    let addr = format!("{}:{}", config.host, config.port);
    let app_state = AppState::new(config, Arc::new(InMemoryTransactionStore::new()))?;

    let app = build_router(app_state);
    start_server(app, &addr).await
}

fn log_startup(config: &AppConfig) {
    tracing::info!("🔧 Configuration: {}", config.get_config_info());
    if !config.webhook_signing_enabled() {
        tracing::warn!("⚠️ WEBHOOK_ALLOW_UNSIGNED is set: webhook signatures will NOT be verified");
    }
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY not set, transaction listing is disabled");
    }
}

pub(crate) fn build_router(app_state: AppState) -> Router {
    let api = routes::api_routes(&app_state);
    let cors = middleware::cors::cors_layer(&app_state.config);

    Router::new()
        .nest("/api", api.clone())
        .merge(api)
        .fallback(portal_handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, addr: &str) -> anyhow::Result<()> {
    tracing::info!("🚀 {} starting on {}", portal_handlers::SERVICE_NAME, addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;
    axum::serve(listener, app).await?;
    Ok(())
}
