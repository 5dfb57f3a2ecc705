//! Order Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{accounts::records::AccountUuid, products::records::ProductUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Orders can be cancelled until work on them starts.
    pub const fn can_be_cancelled(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Confirmed)
            | (Self::Confirmed, Self::Processing)
            | (Self::Processing, Self::Shipped)
            | (Self::Shipped, Self::Delivered) => true,
            (current, Self::Cancelled | Self::Refunded) => current.can_be_cancelled(),
            _ => false,
        }
    }
}

/// Settlement state of an order or a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// A completed payment only ever moves on to refunded.
    pub const fn accepts(self, next: Self) -> bool {
        match self {
            Self::Completed => matches!(next, Self::Completed | Self::Refunded),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order Record
///
/// An immutable snapshot of a checkout. Only the status fields and their
/// timestamps change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub account_uuid: Option<AccountUuid>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub shipping_address_line_1: String,
    pub shipping_address_line_2: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub shipping_method: String,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub shipped_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
}

impl OrderRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.status.can_be_cancelled()
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Non-empty shipping address parts joined with commas.
    pub fn shipping_address(&self) -> String {
        [
            self.shipping_address_line_1.as_str(),
            self.shipping_address_line_2.as_str(),
            self.shipping_city.as_str(),
            self.shipping_state.as_str(),
            self.shipping_postal_code.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Order Item Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    #[test]
    fn forward_path_is_linear() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn cancel_and_refund_only_before_processing() {
        for status in ALL {
            let expected = matches!(status, OrderStatus::Pending | OrderStatus::Confirmed);

            assert_eq!(status.can_be_cancelled(), expected, "{status}");
            assert_eq!(status.can_transition_to(OrderStatus::Cancelled), expected, "{status}");
            assert_eq!(status.can_transition_to(OrderStatus::Refunded), expected, "{status}");
        }
    }

    #[test]
    fn statuses_round_trip_through_text() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }

        assert!("paid".parse::<OrderStatus>().is_err());
        assert_eq!("completed".parse::<PaymentStatus>(), Ok(PaymentStatus::Completed));
        assert_eq!(
            "approved".parse::<PaymentStatus>(),
            Err(UnknownStatus("approved".to_string()))
        );
    }

    #[test]
    fn unknown_status_names_the_value() {
        let error = "paid".parse::<OrderStatus>().err();

        assert_eq!(
            error.map(|error| error.to_string()),
            Some("unknown status: paid".to_string())
        );
    }

    #[test]
    fn completed_payment_only_accepts_refund() {
        assert!(PaymentStatus::Completed.accepts(PaymentStatus::Refunded));
        assert!(PaymentStatus::Completed.accepts(PaymentStatus::Completed));
        assert!(!PaymentStatus::Completed.accepts(PaymentStatus::Failed));
        assert!(!PaymentStatus::Completed.accepts(PaymentStatus::Processing));
        assert!(!PaymentStatus::Completed.accepts(PaymentStatus::Pending));
        assert!(PaymentStatus::Failed.accepts(PaymentStatus::Completed));
        assert!(PaymentStatus::Pending.accepts(PaymentStatus::Processing));
    }
}
