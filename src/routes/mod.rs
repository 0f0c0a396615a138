use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod payment;
pub mod portal;

/// Every API route. Mounted both under `/api` and at the root, since the
/// gateway and some proxies call the service without the prefix.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(portal::portal_routes())
        .merge(payment::payment_routes())
        .merge(admin::admin_routes(state))
}
