use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, Uri},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::{AppError, Result};
use crate::models::package::CATALOG;
use crate::models::payment::RedirectLog;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "Hotspot Payment Backend";
const GATEWAY_NAME: &str = "HexAI Payment Gateway";

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
        "env": state.config.environment,
    }))
}

pub async fn service_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "active",
        "business": state.config.business_name,
        "currency": state.config.currency,
        "gateway": GATEWAY_NAME,
    }))
}

pub async fn list_packages(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": {
            "currency": state.config.currency,
            "packages": CATALOG,
        }
    }))
}

/// Records where the payment pages were redirected to, for debugging the
/// wallet round trip.
pub async fn log_redirect(
    payload: std::result::Result<Json<RedirectLog>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(log) = payload?;
    let params = log
        .params
        .map(|p| p.to_string())
        .unwrap_or_else(|| "{}".to_string());

    info!(
        "Payment redirect [{}] page={} url={} params={}",
        log.timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
        log.page.as_deref().unwrap_or("-"),
        log.url.as_deref().unwrap_or("-"),
        params
    );

    Ok(Json(json!({ "status": "logged" })))
}

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    info!("404 Not Found: {} {}", method, uri);
    AppError::NotFound(format!("Route {} {} not found on this server", method, uri))
}
