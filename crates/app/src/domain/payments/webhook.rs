//! Payment webhook payloads.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::orders::records::{OrderUuid, PaymentStatus};

/// Notification body posted by the gateway: `{"type": "payment", "data": {"id": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub id: Option<Value>,
}

impl WebhookPayload {
    /// Gateway payment id for payment notifications; `None` for anything else.
    pub fn payment_id(&self) -> Option<String> {
        if self.kind.as_deref() != Some("payment") {
            return None;
        }

        match self.data.as_ref()?.id.as_ref()? {
            Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// What a webhook delivery amounted to. Every outcome is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Not a payment notification, or one without a usable id.
    Ignored,

    /// The gateway payment references no order we know.
    OrderNotFound,

    Processed {
        order: OrderUuid,
        payment_status: PaymentStatus,

        /// Whether this delivery confirmed the order.
        confirmed: bool,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Result<WebhookPayload, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn payment_notifications_yield_an_id() -> Result<(), serde_json::Error> {
        let string_id = payload(json!({"type": "payment", "data": {"id": "123"}}))?;
        let numeric_id = payload(json!({"type": "payment", "data": {"id": 456}}))?;

        assert_eq!(string_id.payment_id().as_deref(), Some("123"));
        assert_eq!(numeric_id.payment_id().as_deref(), Some("456"));

        Ok(())
    }

    #[test]
    fn other_notifications_are_ignored() -> Result<(), serde_json::Error> {
        let other = payload(json!({"type": "merchant_order", "data": {"id": "1"}}))?;
        let empty = payload(json!({}))?;
        let blank = payload(json!({"type": "payment", "data": {"id": "  "}}))?;
        let no_data = payload(json!({"type": "payment"}))?;

        assert_eq!(other.payment_id(), None);
        assert_eq!(empty.payment_id(), None);
        assert_eq!(blank.payment_id(), None);
        assert_eq!(no_data.payment_id(), None);

        Ok(())
    }
}
