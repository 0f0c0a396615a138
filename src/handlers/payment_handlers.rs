// handlers/payment_handlers.rs
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::package::find_package;
use crate::models::payment::{InitiatePaymentData, InitiatePaymentRequest, PackageInfo};
use crate::models::transaction::{
    is_completed_gateway_status, TransactionRecord, TransactionStatus, Transition,
};
use crate::services::gateway_service::Customer;
use crate::services::generator::{generate_reference, generate_voucher_code};
use crate::state::AppState;

const REFERENCE_ATTEMPTS: usize = 3;
const CUSTOMER_NAME: &str = "WiFi Customer";
const CUSTOMER_PHONE_PREFIX: &str = "+220";

pub async fn initiate_payment(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InitiatePaymentRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;
    request.validate()?;

    let (amount, package_type) = match (&request.amount, request.package_type.as_deref().map(str::trim)) {
        (Some(amount), Some(package_type)) if !package_type.is_empty() => (amount.to_amount()?, package_type),
        _ => return Err(AppError::invalid_data("Amount and package_type are required")),
    };

    if !package_type.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::invalid_data("package_type may only contain letters and digits"));
    }

    let config = &state.config;
    let package_name = request
        .package_name
        .clone()
        .or_else(|| find_package(package_type).map(|p| p.name.to_string()));

    let reference = unique_reference(&state, package_type).await?;
    let mac = request.device_info.as_ref().and_then(|d| d.mac.as_deref());
    let voucher_code = generate_voucher_code(package_type, mac);

    let success_url = with_reference(
        https_or_default(request.success_url.as_deref(), &config.default_success_url),
        &reference,
    );
    let error_url = with_reference(
        https_or_default(request.error_url.as_deref(), &config.default_error_url),
        &reference,
    );

    let customer = request
        .customer_phone
        .as_deref()
        .map(str::trim)
        .filter(|phone| is_local_mobile(phone))
        .map(|phone| Customer {
            name: CUSTOMER_NAME.to_string(),
            mobile: phone.to_string(),
        });

    info!(
        "Initiating payment {}: {}{:.2} package {} voucher {}… device {}",
        reference,
        config.currency,
        amount,
        package_name.as_deref().unwrap_or(package_type),
        &voucher_code[..voucher_code.len().min(4)],
        mac.unwrap_or("N/A")
    );

    let collection = state
        .gateway
        .initiate(amount, &config.currency, &reference, &success_url, &error_url, customer)
        .await?;

    let mut record = TransactionRecord::pending(
        reference.clone(),
        amount,
        config.currency.clone(),
        package_type.to_string(),
        package_name,
        voucher_code,
        request.device_info.clone(),
    );
    record.gateway_transaction_id = collection.transaction_id.clone();

    if let Err(e) = state.transactions.put(record).await {
        error!("Payment {} initiated but could not be recorded: {}", reference, e);
        return Err(e);
    }

    let data = InitiatePaymentData {
        transaction_id: collection.transaction_id,
        redirect_url: collection.redirect_url,
        wave_launch_url: collection.wave_launch_url,
        client_reference: reference,
        status: collection
            .status
            .unwrap_or_else(|| TransactionStatus::Pending.to_string()),
    };

    Ok(Json(json!({
        "status": "success",
        "data": data,
    })))
}

/// Reports the gateway status for a payment. The voucher is only included
/// once the gateway confirms the payment as completed.
pub async fn check_payment_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Value>> {
    if !is_valid_reference(&reference) {
        return Err(AppError::invalid_data("Invalid payment reference"));
    }

    let gateway_status = state.gateway.check_status(&reference).await?;
    let observed = gateway_status
        .status
        .as_deref()
        .map(TransactionStatus::from_gateway)
        .unwrap_or(TransactionStatus::Pending);
    let at = Utc::now();

    let cached = match state
        .transactions
        .update(
            &reference,
            Box::new(move |tx: &mut TransactionRecord| {
                tx.apply(Transition::Verify { observed, at }).map(|_| ())
            }),
        )
        .await
    {
        Ok(cached) => cached,
        Err(AppError::InvalidTransition { from, to }) => {
            warn!("Gateway reports {} for {} but cached status is {}", to, reference, from);
            state.transactions.get(&reference).await?
        }
        Err(e) => return Err(e),
    };

    if !is_completed_gateway_status(gateway_status.status.as_deref()) {
        info!(
            "Payment {} not completed: {}",
            reference,
            gateway_status.status.as_deref().unwrap_or("unknown")
        );
        return Err(AppError::PaymentNotCompleted {
            payment_status: gateway_status.status,
        });
    }

    let package_info = cached.map(|tx| PackageInfo {
        voucher_code: tx.voucher_code().to_string(),
        package_type: tx.package_type,
        package_name: tx.package_name,
        amount: tx.amount,
    });
    if package_info.is_none() {
        warn!("Payment {} completed but no cached transaction", reference);
    }

    let mut data = gateway_status.data;
    data.insert("package_info".to_string(), serde_json::to_value(package_info)?);

    Ok(Json(json!({
        "status": "success",
        "data": data,
    })))
}

async fn unique_reference(state: &AppState, package_type: &str) -> Result<String> {
    for _ in 0..REFERENCE_ATTEMPTS {
        let reference = generate_reference(package_type);
        if !state.transactions.contains(&reference).await? {
            return Ok(reference);
        }
        warn!("Generated reference {} already exists, regenerating", reference);
    }
    Err(AppError::internal("Could not generate a unique payment reference"))
}

fn https_or_default<'a>(candidate: Option<&'a str>, default: &'a str) -> &'a str {
    candidate
        .map(str::trim)
        .filter(|url| url.starts_with("https://"))
        .unwrap_or(default)
}

fn with_reference(url: &str, reference: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}reference={}", url, separator, reference)
}

/// `+220` followed by exactly seven digits.
fn is_local_mobile(phone: &str) -> bool {
    phone
        .strip_prefix(CUSTOMER_PHONE_PREFIX)
        .map(|rest| rest.len() == 7 && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn is_valid_reference(reference: &str) -> bool {
    !reference.is_empty()
        && reference.len() <= 128
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_urls_require_https() {
        assert_eq!(https_or_default(Some("https://a.example/ok"), "https://d"), "https://a.example/ok");
        assert_eq!(https_or_default(Some("http://localhost/ok"), "https://d"), "https://d");
        assert_eq!(https_or_default(None, "https://d"), "https://d");
    }

    #[test]
    fn reference_is_appended_as_query_parameter() {
        assert_eq!(with_reference("https://a/ok", "R1"), "https://a/ok?reference=R1");
        assert_eq!(with_reference("https://a/ok?x=1", "R1"), "https://a/ok?x=1&reference=R1");
    }

    #[test]
    fn only_local_mobiles_become_customers() {
        assert!(is_local_mobile("+2203456789"));
        assert!(!is_local_mobile("+220345678"));
        assert!(!is_local_mobile("+22034567890"));
        assert!(!is_local_mobile("2203456789"));
        assert!(!is_local_mobile("+220345678a"));
    }

    #[test]
    fn references_are_path_safe() {
        assert!(is_valid_reference("WIFI-24H-1700000000000-0A1B2C3D"));
        assert!(!is_valid_reference(""));
        assert!(!is_valid_reference("../admin"));
        assert!(!is_valid_reference(&"A".repeat(129)));
    }
}
