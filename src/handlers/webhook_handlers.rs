// handlers/webhook_handlers.rs
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, WebhookVerification};
use crate::errors::{AppError, Result};
use crate::models::transaction::{TransactionRecord, Transition};
use crate::models::webhook::{WebhookEvent, WebhookPayload, WebhookTransaction};
use crate::services::webhook_signature::{signature_from_headers, verify_signature};
use crate::state::AppState;

/// Gateway payment notifications.
///
/// Every authenticated notification is acknowledged, including bodies that do
/// not parse and ones for unknown references, so the gateway stops
/// redelivering it.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    authenticate(&state.config, &headers, &body)?;

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Signed webhook body could not be parsed, acknowledging anyway: {}", e);
            return Ok(acknowledged());
        }
    };
    let event = payload.event.unwrap_or_default();
    let transaction = payload.transaction;
    let gateway_id = transaction.as_ref().and_then(WebhookTransaction::gateway_id);

    info!(
        "Webhook received: event={} transaction={} reference={} status={}",
        if event.is_empty() { "-" } else { event.as_str() },
        gateway_id.as_deref().unwrap_or("-"),
        field(&transaction, |t| t.client_reference.as_deref()),
        field(&transaction, |t| t.status.as_deref()),
    );

    match WebhookEvent::parse(&event) {
        WebhookEvent::Completed => {
            if let Some(tx) = transaction {
                let transition = Transition::Complete {
                    gateway_transaction_id: gateway_id,
                    at: Utc::now(),
                };
                apply(&state, &tx, transition).await?;
            }
        }
        WebhookEvent::Failed => {
            if let Some(tx) = transaction {
                let transition = Transition::Fail {
                    reason: tx.failure_reason.clone(),
                    at: Utc::now(),
                };
                apply(&state, &tx, transition).await?;
            }
        }
        WebhookEvent::Other(event) => {
            info!("Unhandled webhook event: {}", event);
        }
    }

    Ok(acknowledged())
}

fn acknowledged() -> Json<Value> {
    Json(json!({ "received": true }))
}

fn authenticate(config: &AppConfig, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    match &config.webhook {
        WebhookVerification::Signed { secret } => {
            let Some(signature) = signature_from_headers(headers) else {
                warn!("Webhook rejected: missing signature header");
                return Err(AppError::InvalidSignature);
            };
            if !verify_signature(body, signature, secret) {
                warn!("Webhook rejected: invalid signature");
                return Err(AppError::InvalidSignature);
            }
            Ok(())
        }
        WebhookVerification::Unsigned => {
            debug!("Accepting unsigned webhook");
            Ok(())
        }
    }
}

async fn apply(state: &AppState, tx: &WebhookTransaction, transition: Transition) -> Result<()> {
    let Some(reference) = tx.client_reference.as_deref() else {
        warn!("Webhook transaction has no client_reference, ignoring");
        return Ok(());
    };

    let result = state
        .transactions
        .update(
            reference,
            Box::new(move |record: &mut TransactionRecord| record.apply(transition).map(|_| ())),
        )
        .await;

    match result {
        Ok(Some(record)) => {
            let amount = tx
                .amount
                .as_ref()
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| "-".to_string());
            info!(
                "Transaction {} is now {} (amount {})",
                reference,
                record.status(),
                amount,
            );
            if let Some(reason) = &record.failure_reason {
                info!("Payment {} failed: {}", reference, reason);
            }
            Ok(())
        }
        Ok(None) => {
            info!("Webhook for unknown reference {}, nothing to update", reference);
            Ok(())
        }
        Err(AppError::InvalidTransition { from, to }) => {
            warn!("Ignoring webhook for {}: cannot move from {} to {}", reference, from, to);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn field<'a>(
    tx: &'a Option<WebhookTransaction>,
    get: impl Fn(&'a WebhookTransaction) -> Option<&'a str>,
) -> &'a str {
    tx.as_ref().and_then(get).unwrap_or("-")
}
