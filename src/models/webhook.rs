use serde::Deserialize;
use serde_json::Value;

/// Payment notification posted by the gateway.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event: Option<String>,
    pub transaction: Option<WebhookTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookTransaction {
    pub id: Option<Value>,
    pub client_reference: Option<String>,
    pub status: Option<String>,
    pub amount: Option<Value>,
    pub failure_reason: Option<String>,
}

impl WebhookTransaction {
    /// Gateway transaction id, sent either as a string or as a number.
    pub fn gateway_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Completed,
    Failed,
    Other(String),
}

impl WebhookEvent {
    /// `transaction.completed` and `collection.completed` both count as completion.
    pub fn parse(event: &str) -> Self {
        match event.rsplit_once('.') {
            Some((_, "completed")) => WebhookEvent::Completed,
            Some((_, "failed")) => WebhookEvent::Failed,
            _ => WebhookEvent::Other(event.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_suffix() {
        assert_eq!(WebhookEvent::parse("transaction.completed"), WebhookEvent::Completed);
        assert_eq!(WebhookEvent::parse("collection.completed"), WebhookEvent::Completed);
        assert_eq!(WebhookEvent::parse("collection.failed"), WebhookEvent::Failed);
        assert_eq!(
            WebhookEvent::parse("collection.refunded"),
            WebhookEvent::Other("collection.refunded".into())
        );
        assert_eq!(WebhookEvent::parse("completed"), WebhookEvent::Other("completed".into()));
    }

    #[test]
    fn payload_tolerates_numeric_amount_and_missing_fields() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"event":"collection.completed","transaction":{"id":"T1","client_reference":"R1","amount":25}}"#,
        )
        .unwrap();
        let tx = payload.transaction.unwrap();
        assert_eq!(tx.client_reference.as_deref(), Some("R1"));
        assert_eq!(tx.amount, Some(Value::from(25)));
        assert!(tx.failure_reason.is_none());
        assert_eq!(tx.gateway_id().as_deref(), Some("T1"));
    }

    #[test]
    fn numeric_id_and_null_event_are_accepted() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"event":null,"transaction":{"id":987654,"client_reference":"R1"}}"#,
        )
        .unwrap();
        assert!(payload.event.is_none());
        assert_eq!(payload.transaction.unwrap().gateway_id().as_deref(), Some("987654"));
    }
}
