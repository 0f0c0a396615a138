use axum::{middleware, routing::get, Router};

use crate::handlers::admin_handlers;
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/transactions", get(admin_handlers::list_transactions))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}
