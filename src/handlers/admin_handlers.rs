use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::Result;
use crate::models::payment::TransactionListQuery;
use crate::state::AppState;

const MAX_LISTED: usize = 50;

/// Most recent cached transactions. Mounted behind the admin token guard.
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.unwrap_or(MAX_LISTED).clamp(1, MAX_LISTED);
    let total = state.transactions.len().await?;
    let transactions = state.transactions.list(limit).await?;

    info!("Admin listed {} of {} transactions", transactions.len(), total);

    Ok(Json(json!({
        "status": "success",
        "data": {
            "total": total,
            "transactions": transactions,
        }
    })))
}
