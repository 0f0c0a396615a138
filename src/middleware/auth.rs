use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Requires `Authorization: Bearer {ADMIN_API_KEY}`. With no key configured
/// every request is refused.
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.admin_api_key.as_deref() else {
        warn!("Admin endpoint called but ADMIN_API_KEY is not configured");
        return Err(AppError::Unauthorized);
    };

    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        warn!("Admin endpoint called with an invalid token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
