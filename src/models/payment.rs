use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::transaction::DeviceInfo;

/// Amount as sent by the portal: either `"25.00"` or `25`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(f64),
}

impl AmountInput {
    pub fn to_amount(&self) -> Result<f64> {
        let value = match self {
            AmountInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::invalid_data(format!("Invalid amount: {}", text)))?,
            AmountInput::Number(number) => *number,
        };

        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::invalid_data("Amount must be greater than 0"));
        }
        Ok(value)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct InitiatePaymentRequest {
    pub amount: Option<AmountInput>,

    #[validate(length(min = 1, max = 16, message = "package_type must be 1-16 characters"))]
    pub package_type: Option<String>,

    #[validate(length(max = 64, message = "package_name is too long"))]
    pub package_name: Option<String>,

    pub customer_phone: Option<String>,
    pub success_url: Option<String>,
    pub error_url: Option<String>,
    pub device_info: Option<DeviceInfo>,
}

#[derive(Debug, Serialize)]
pub struct InitiatePaymentData {
    pub transaction_id: Option<String>,
    pub redirect_url: Option<String>,
    pub wave_launch_url: Option<String>,
    pub client_reference: String,
    pub status: String,
}

/// Voucher and package details, only sent once payment is confirmed.
#[derive(Debug, Serialize)]
pub struct PackageInfo {
    pub package_type: String,
    pub package_name: Option<String>,
    pub amount: f64,
    pub voucher_code: String,
}

#[derive(Debug, Deserialize)]
pub struct RedirectLog {
    pub page: Option<String>,
    pub url: Option<String>,
    pub params: Option<serde_json::Value>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_text_and_numbers() {
        let text: AmountInput = serde_json::from_str(r#""25.00""#).unwrap();
        let number: AmountInput = serde_json::from_str("10").unwrap();
        assert_eq!(text.to_amount().unwrap(), 25.0);
        assert_eq!(number.to_amount().unwrap(), 10.0);
    }

    #[test]
    fn amount_rejects_zero_negative_and_garbage() {
        assert!(AmountInput::Number(0.0).to_amount().is_err());
        assert!(AmountInput::Text("-5".into()).to_amount().is_err());
        assert!(AmountInput::Text("abc".into()).to_amount().is_err());
        assert!(AmountInput::Text("NaN".into()).to_amount().is_err());
    }

    #[test]
    fn package_type_length_is_validated() {
        let request: InitiatePaymentRequest = serde_json::from_value(serde_json::json!({
            "amount": "25.00",
            "package_type": "",
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
