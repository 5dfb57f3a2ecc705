//! Payment Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    domain::orders::records::{OrderUuid, PaymentStatus},
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// Payment Record
///
/// One row per gateway transaction; replays of the same transaction update it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub order_uuid: OrderUuid,
    pub gateway_transaction_id: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub gateway_response: Option<Value>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Translate a gateway status word into ours. Unknown words read as pending.
pub fn map_gateway_status(status: &str) -> PaymentStatus {
    match status {
        "approved" => PaymentStatus::Completed,
        "pending" | "in_process" => PaymentStatus::Processing,
        "rejected" => PaymentStatus::Failed,
        "cancelled" => PaymentStatus::Cancelled,
        "refunded" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_statuses_map_to_payment_statuses() {
        assert_eq!(map_gateway_status("approved"), PaymentStatus::Completed);
        assert_eq!(map_gateway_status("pending"), PaymentStatus::Processing);
        assert_eq!(map_gateway_status("in_process"), PaymentStatus::Processing);
        assert_eq!(map_gateway_status("rejected"), PaymentStatus::Failed);
        assert_eq!(map_gateway_status("cancelled"), PaymentStatus::Cancelled);
        assert_eq!(map_gateway_status("refunded"), PaymentStatus::Refunded);
    }

    #[test]
    fn unknown_gateway_status_is_pending() {
        assert_eq!(map_gateway_status("charged_back"), PaymentStatus::Pending);
        assert_eq!(map_gateway_status(""), PaymentStatus::Pending);
    }
}
