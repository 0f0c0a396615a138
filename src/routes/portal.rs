use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::portal_handlers;
use crate::state::AppState;

pub fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(portal_handlers::health_check))
        .route("/health", get(portal_handlers::health_check))
        .route("/status", get(portal_handlers::service_status))
        .route("/packages", get(portal_handlers::list_packages))
        .route("/log-redirect", post(portal_handlers::log_redirect))
}
