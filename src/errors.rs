// src/errors.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

const GENERIC_MESSAGE: &str = "An error occurred. Please try again.";

/// Error codes the payment gateway reports for a rejected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayErrorCode {
    InvalidRequest,
    InvalidAmount,
    InvalidPhone,
    InsufficientFunds,
    PaymentFailed,
    ServiceUnavailable,
    RateLimitExceeded,
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    DuplicateReference,
    InvalidCurrency,
    AmountTooLow,
    AmountTooHigh,
    WaveError,
    Other(String),
}

impl GatewayErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "INVALID_REQUEST" => Self::InvalidRequest,
            "INVALID_AMOUNT" => Self::InvalidAmount,
            "INVALID_PHONE" => Self::InvalidPhone,
            "INSUFFICIENT_FUNDS" => Self::InsufficientFunds,
            "PAYMENT_FAILED" => Self::PaymentFailed,
            "SERVICE_UNAVAILABLE" => Self::ServiceUnavailable,
            "RATE_LIMIT_EXCEEDED" => Self::RateLimitExceeded,
            "UNAUTHORIZED" => Self::Unauthorized,
            "FORBIDDEN" => Self::Forbidden,
            "NOT_FOUND" => Self::NotFound,
            "TIMEOUT" => Self::Timeout,
            "DUPLICATE_REFERENCE" => Self::DuplicateReference,
            "INVALID_CURRENCY" => Self::InvalidCurrency,
            "AMOUNT_TOO_LOW" => Self::AmountTooLow,
            "AMOUNT_TOO_HIGH" => Self::AmountTooHigh,
            "WAVE_ERROR" => Self::WaveError,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::DuplicateReference => "DUPLICATE_REFERENCE",
            Self::InvalidCurrency => "INVALID_CURRENCY",
            Self::AmountTooLow => "AMOUNT_TOO_LOW",
            Self::AmountTooHigh => "AMOUNT_TOO_HIGH",
            Self::WaveError => "WAVE_ERROR",
            Self::Other(code) => code,
        }
    }

    /// Message shown to the customer. Unknown codes use the gateway's own
    /// message when it sent one.
    pub fn user_message(&self, fallback: Option<&str>) -> String {
        let fixed = match self {
            Self::InvalidRequest => "Invalid payment request. Please check your details and try again.",
            Self::InvalidAmount => "Invalid payment amount. Please select a valid package.",
            Self::InvalidPhone => "Invalid phone number format. Please use format: +220XXXXXXX",
            Self::InsufficientFunds => "Insufficient funds in your Wave account.",
            Self::PaymentFailed => "Payment could not be processed. Please try again.",
            Self::ServiceUnavailable => "Payment service is temporarily unavailable. Please try again later.",
            Self::RateLimitExceeded => "Too many requests. Please wait a moment before trying again.",
            Self::Unauthorized => "Authentication failed. Please contact support.",
            Self::Forbidden => "Access denied. Please contact support.",
            Self::NotFound => "Payment service not found. Please contact support.",
            Self::Timeout => "Payment request timed out. Please try again.",
            Self::DuplicateReference => "This payment has already been initiated. Please wait or try a new payment.",
            Self::InvalidCurrency => "Invalid currency. Only GMD (Gambian Dalasi) is supported.",
            Self::AmountTooLow => "Amount is below minimum. Minimum payment is D5.",
            Self::AmountTooHigh => "Amount exceeds maximum limit.",
            Self::WaveError => "Wave payment service error. Please try again later.",
            Self::Other(_) => {
                return fallback
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(GENERIC_MESSAGE)
                    .to_string()
            }
        };
        fixed.to_string()
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an outbound call that never produced a gateway response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connection,
    Timeout,
    Network,
    Internal,
}

impl TransportErrorKind {
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection
        } else if err.is_request() || err.is_body() || err.is_decode() {
            Self::Network
        } else {
            Self::Internal
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection => "CONNECTION_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Connection => "Unable to connect to payment service. Please try again later.",
            Self::Timeout => "Payment request timed out. Please try again.",
            Self::Network => "Network error. Please check your connection and try again.",
            Self::Internal => "An unexpected error occurred. Please try again.",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Gateway rejected request ({status}): {code}")]
    Gateway {
        status: StatusCode,
        code: GatewayErrorCode,
        message: Option<String>,
        details: Option<String>,
    },

    #[error("Gateway transport error: {}", .kind.code())]
    Transport {
        kind: TransportErrorKind,
        details: Option<String>,
    },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Payment has not been completed yet")]
    PaymentNotCompleted { payment_status: Option<String> },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Duplicate reference: {0}")]
    DuplicateReference(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AppError {
    pub fn code(&self) -> &str {
        match self {
            AppError::ValidationError(_) => "INVALID_REQUEST",
            AppError::Gateway { code, .. } => code.as_str(),
            AppError::Transport { kind, .. } => kind.code(),
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::InvalidSignature => "INVALID_SIGNATURE",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::PaymentNotCompleted { .. } => "PAYMENT_NOT_COMPLETED",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Gateway { status, .. } => {
                if status.is_client_error() || status.is_server_error() {
                    *status
                } else {
                    StatusCode::BAD_REQUEST
                }
            }
            AppError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PaymentNotCompleted { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::DuplicateReference(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::Gateway { code, message, .. } => code.user_message(message.as_deref()),
            AppError::Transport { kind, .. } => kind.user_message().to_string(),
            AppError::InternalError(_) | AppError::ConfigurationError(_) => {
                "An internal error occurred".to_string()
            }
            AppError::InvalidSignature => "Invalid signature".to_string(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::DuplicateReference(_) => GatewayErrorCode::DuplicateReference.user_message(None),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let mut error = Map::new();
        error.insert("code".into(), json!(self.code()));
        error.insert("message".into(), json!(self.user_message()));

        match &self {
            AppError::Gateway { details: Some(details), .. }
            | AppError::Transport { details: Some(details), .. } => {
                error.insert("details".into(), json!(details));
            }
            AppError::PaymentNotCompleted { payment_status } => {
                error.insert("payment_status".into(), json!(payment_status));
            }
            _ => {}
        }

        let body = Json(json!({
            "status": "error",
            "error": Value::Object(error),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::ValidationError(format!("Invalid JSON body: {}", err.body_text()))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(format!("Validation failed: {}", err))
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
