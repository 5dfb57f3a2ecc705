//! Order request and response bodies.

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    orders::{
        data::ShippingInfo,
        records::{OrderItemRecord, OrderRecord},
    },
    payments::records::PaymentRecord,
};

/// Checkout Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct CheckoutRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    /// Defaults to Brasil when blank
    pub country: String,
    pub shipping_method: String,

    #[salvo(schema(value_type = String))]
    pub shipping_cost: Decimal,
}

impl CheckoutRequest {
    pub(crate) fn into_parts(self) -> (ShippingInfo, Decimal) {
        let shipping = ShippingInfo {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address_line_1: self.address_line_1,
            address_line_2: self.address_line_2,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            shipping_method: self.shipping_method,
        };

        (shipping, self.shipping_cost)
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub order_number: String,

    /// `pending`, `confirmed`, `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,
    pub payment_status: String,

    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub shipping_address: String,
    pub shipping_method: String,

    #[salvo(schema(value_type = String))]
    pub subtotal: Decimal,

    #[salvo(schema(value_type = String))]
    pub shipping_cost: Decimal,

    #[salvo(schema(value_type = String))]
    pub total: Decimal,

    pub item_count: u64,
    pub items: Vec<OrderItemResponse>,

    #[serde(default)]
    pub payments: Vec<PaymentResponse>,

    #[salvo(schema(value_type = String))]
    pub created_at: Timestamp,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into(),
            full_name: order.full_name(),
            shipping_address: order.shipping_address(),
            item_count: order.item_count(),
            order_number: order.order_number,
            status: order.status.to_string(),
            payment_status: order.payment_status.to_string(),
            email: order.email,
            phone: order.phone,
            shipping_method: order.shipping_method,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            total: order.total,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            payments: Vec::new(),
            created_at: order.created_at,
        }
    }
}

impl OrderResponse {
    pub(crate) fn with_payments(mut self, payments: Vec<PaymentRecord>) -> Self {
        self.payments = payments.into_iter().map(PaymentResponse::from).collect();
        self
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub product_uuid: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: u32,

    #[salvo(schema(value_type = String))]
    pub unit_price: Decimal,

    #[salvo(schema(value_type = String))]
    pub total_price: Decimal,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            product_uuid: item.product_uuid.into(),
            product_name: item.product_name,
            product_sku: item.product_sku,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub gateway_transaction_id: String,
    pub status: String,

    #[salvo(schema(value_type = String))]
    pub amount: Decimal,

    #[salvo(schema(value_type = Option<String>))]
    pub paid_at: Option<Timestamp>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            gateway_transaction_id: payment.gateway_transaction_id,
            status: payment.status.to_string(),
            amount: payment.amount,
            paid_at: payment.paid_at,
        }
    }
}
