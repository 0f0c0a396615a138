// models/transaction.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{AppError, Result};

/// Gateway statuses that count as a finished, paid transaction. Matched after
/// trimming and upper-casing, so `success` or ` Completed ` also disclose the
/// voucher.
pub const COMPLETED_GATEWAY_STATUSES: [&str; 3] = ["COMPLETED", "SUCCESS", "SUCCEEDED"];

const FAILED_GATEWAY_STATUSES: [&str; 6] =
    ["FAILED", "FAILURE", "CANCELLED", "CANCELED", "EXPIRED", "REJECTED"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Maps a status string reported by the gateway onto the local lifecycle.
    pub fn from_gateway(status: &str) -> Self {
        let status = status.trim().to_ascii_uppercase();
        if COMPLETED_GATEWAY_STATUSES.contains(&status.as_str()) {
            TransactionStatus::Completed
        } else if FAILED_GATEWAY_STATUSES.contains(&status.as_str()) {
            TransactionStatus::Failed
        } else {
            TransactionStatus::Pending
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the gateway status allows the voucher to be disclosed.
pub fn is_completed_gateway_status(status: Option<&str>) -> bool {
    status
        .map(|s| TransactionStatus::from_gateway(s) == TransactionStatus::Completed)
        .unwrap_or(false)
}

/// Device details captured by the captive portal (MAC, IP and whatever else it sends).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub enum Transition {
    /// Payment confirmed by a webhook.
    Complete {
        gateway_transaction_id: Option<String>,
        at: DateTime<Utc>,
    },
    /// Payment failure reported by a webhook.
    Fail {
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    /// Status observed while polling the gateway.
    Verify {
        observed: TransactionStatus,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub package_type: String,
    pub package_name: Option<String>,
    voucher_code: String,
    status: TransactionStatus,
    pub device_info: Option<DeviceInfo>,
    pub gateway_transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    pub fn pending(
        reference: String,
        amount: f64,
        currency: String,
        package_type: String,
        package_name: Option<String>,
        voucher_code: String,
        device_info: Option<DeviceInfo>,
    ) -> Self {
        TransactionRecord {
            reference,
            amount,
            currency,
            package_type,
            package_name,
            voucher_code,
            status: TransactionStatus::Pending,
            device_info,
            gateway_transaction_id: None,
            failure_reason: None,
            created_at: Utc::now(),
            completed_at: None,
            failed_at: None,
            verified_at: None,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn voucher_code(&self) -> &str {
        &self.voucher_code
    }

    /// Applies a lifecycle transition. Returns whether the status changed.
    ///
    /// PENDING moves to either terminal state. Repeating the transition into the
    /// state a record already holds is accepted and leaves it as it was, so
    /// duplicate webhook deliveries are harmless. Moving between COMPLETED and
    /// FAILED is rejected.
    pub fn apply(&mut self, transition: Transition) -> Result<bool> {
        match transition {
            Transition::Complete { gateway_transaction_id, at } => {
                let changed = self.enter(TransactionStatus::Completed, at)?;
                if self.gateway_transaction_id.is_none() {
                    self.gateway_transaction_id = gateway_transaction_id;
                }
                Ok(changed)
            }
            Transition::Fail { reason, at } => {
                let changed = self.enter(TransactionStatus::Failed, at)?;
                if changed {
                    self.failure_reason = reason;
                }
                Ok(changed)
            }
            Transition::Verify { observed, at } => {
                let changed = if observed.is_terminal() {
                    self.enter(observed, at)?
                } else {
                    false
                };
                self.verified_at = Some(at);
                Ok(changed)
            }
        }
    }

    fn enter(&mut self, target: TransactionStatus, at: DateTime<Utc>) -> Result<bool> {
        match (self.status, target) {
            (current, target) if current == target => Ok(false),
            (TransactionStatus::Pending, TransactionStatus::Completed) => {
                self.status = target;
                self.completed_at = Some(at);
                Ok(true)
            }
            (TransactionStatus::Pending, TransactionStatus::Failed) => {
                self.status = target;
                self.failed_at = Some(at);
                Ok(true)
            }
            (from, to) => Err(AppError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}
