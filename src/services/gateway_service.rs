// services/gateway_service.rs
use axum::http::StatusCode;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, GatewayErrorCode, Result, TransportErrorKind};

#[derive(Debug, Serialize)]
pub struct CollectionRequest {
    pub amount: String,
    pub currency: String,
    pub client_reference: String,
    pub success_url: String,
    pub error_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_mobile: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionResponse {
    pub transaction_id: Option<String>,
    pub redirect_url: Option<String>,
    pub wave_launch_url: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub mobile: String,
}

/// Status report for a collection. `data` is the gateway's `data` object as-is.
#[derive(Debug, Clone)]
pub struct CollectionStatus {
    pub status: Option<String>,
    pub data: Map<String, Value>,
}

/// Client for the mobile-money payment gateway. Each call is a single HTTP
/// request; failures are returned to the caller and never retried.
#[derive(Debug, Clone)]
pub struct GatewayService {
    base_url: String,
    api_key: String,
    client: Client,
    expose_details: bool,
}

impl GatewayService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.gateway_timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(GatewayService {
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            client,
            expose_details: config.is_development(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("x-hexai-key", &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
    }

    pub async fn initiate(
        &self,
        amount: f64,
        currency: &str,
        reference: &str,
        success_url: &str,
        error_url: &str,
        customer: Option<Customer>,
    ) -> Result<CollectionResponse> {
        let (customer_name, customer_mobile) = match customer {
            Some(c) => (Some(c.name), Some(c.mobile)),
            None => (None, None),
        };

        let request = CollectionRequest {
            amount: format!("{:.2}", amount),
            currency: currency.to_string(),
            client_reference: reference.to_string(),
            success_url: success_url.to_string(),
            error_url: error_url.to_string(),
            customer_name,
            customer_mobile,
        };

        info!("Initiating collection {} for {} {}", reference, request.amount, currency);

        let url = format!("{}/collections/initiate", self.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error("initiate", e))?;

        let status = to_status(&response);
        let body = read_body(response, self.expose_details).await?;
        let data: Value = serde_json::from_str(&body).unwrap_or_else(|_| {
            serde_json::json!({ "status": "error", "message": body })
        });

        if !status.is_success() || data.get("status").and_then(Value::as_str) != Some("success") {
            error!("Collection {} rejected by gateway ({}): {}", reference, status, body);
            return Err(gateway_error(status, &data, "PAYMENT_FAILED", "Failed to initiate payment"));
        }

        let payload = data.get("data").cloned().unwrap_or(data);
        let collection: CollectionResponse = serde_json::from_value(payload).map_err(|e| {
            error!("Unexpected initiate response for {}: {}", reference, e);
            invalid_response()
        })?;

        info!(
            "Collection {} initiated: transaction {}",
            reference,
            collection.transaction_id.as_deref().unwrap_or("unknown")
        );
        Ok(collection)
    }

    pub async fn check_status(&self, reference: &str) -> Result<CollectionStatus> {
        let url = format!("{}/collections/status/{}", self.base_url, reference);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| self.transport_error("status", e))?;

        let status = to_status(&response);
        let body = read_body(response, self.expose_details).await?;
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            warn!("Status check for {} failed ({}): {}", reference, status, body);
            let data = parsed.unwrap_or_else(|| serde_json::json!({ "message": body }));
            return Err(gateway_error(status, &data, "STATUS_CHECK_FAILED", "Failed to check payment status"));
        }

        let data = match parsed.as_ref().and_then(|v| v.get("data")) {
            Some(Value::Object(map)) => map.clone(),
            _ => {
                error!("Unexpected status response for {}: {}", reference, body);
                return Err(invalid_response());
            }
        };

        let payment_status = data.get("status").and_then(Value::as_str).map(str::to_string);
        info!(
            "Gateway status for {}: {}",
            reference,
            payment_status.as_deref().unwrap_or("unknown")
        );

        Ok(CollectionStatus { status: payment_status, data })
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> AppError {
        let kind = TransportErrorKind::classify(&err);
        error!("Gateway {} call failed ({}): {}", operation, kind.code(), err);
        AppError::Transport {
            kind,
            details: self.expose_details.then(|| err.to_string()),
        }
    }
}

fn to_status(response: &Response) -> StatusCode {
    StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}

async fn read_body(response: Response, expose_details: bool) -> Result<String> {
    response.text().await.map_err(|e| {
        let kind = TransportErrorKind::classify(&e);
        error!("Failed to read gateway response ({}): {}", kind.code(), e);
        AppError::Transport {
            kind,
            details: expose_details.then(|| e.to_string()),
        }
    })
}

fn invalid_response() -> AppError {
    AppError::Gateway {
        status: StatusCode::BAD_GATEWAY,
        code: GatewayErrorCode::parse("INVALID_RESPONSE"),
        message: Some("Unexpected response from payment service. Please try again.".to_string()),
        details: None,
    }
}

/// Builds the error for a non-success gateway reply. Reads `error.code`, then
/// `code`, then falls back to `default_code`.
fn gateway_error(status: StatusCode, data: &Value, default_code: &str, default_details: &str) -> AppError {
    let error_obj = data.get("error");
    let field = |v: Option<&Value>, key: &str| {
        v.and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let code = field(error_obj, "code")
        .or_else(|| field(Some(data), "code"))
        .unwrap_or_else(|| default_code.to_string());
    let message = field(Some(data), "message").or_else(|| field(error_obj, "message"));
    let details = field(error_obj, "details")
        .or_else(|| message.clone())
        .unwrap_or_else(|| default_details.to_string());

    AppError::Gateway {
        status,
        code: GatewayErrorCode::parse(&code),
        message,
        details: Some(details),
    }
}
