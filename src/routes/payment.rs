use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{payment_handlers, webhook_handlers};
use crate::state::AppState;

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        // POST /payment/initiate - start a collection and reserve a voucher
        .route("/payment/initiate", post(payment_handlers::initiate_payment))
        // GET /payment/status/:reference - voucher is only returned once paid
        .route(
            "/payment/status/:reference",
            get(payment_handlers::check_payment_status),
        )
        // POST /webhook - gateway notifications
        .route("/webhook", post(webhook_handlers::payment_webhook))
}
