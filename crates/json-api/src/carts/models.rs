//! Cart response bodies.

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use storefront_app::domain::carts::models::{Cart, CartItem, CartLine, CartSummary};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Lines resolved against the catalog
    pub lines: Vec<CartLineResponse>,

    /// Sum of line totals
    #[salvo(schema(value_type = String))]
    pub total_price: Decimal,

    /// Total units across all lines
    pub item_count: u64,
}

impl From<CartSummary> for CartResponse {
    fn from(summary: CartSummary) -> Self {
        Self {
            lines: summary.lines.into_iter().map(CartLineResponse::from).collect(),
            total_price: summary.total_price,
            item_count: summary.item_count,
        }
    }
}

/// Cart Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineResponse {
    pub product_uuid: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: u32,

    /// Price captured when the product was first added
    #[salvo(schema(value_type = String))]
    pub unit_price: Decimal,

    #[salvo(schema(value_type = String))]
    pub total_price: Decimal,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            product_uuid: line.product.uuid.into(),
            name: line.product.name,
            sku: line.product.sku,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total_price,
        }
    }
}

/// Cart contents after a change, without catalog details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartStateResponse {
    pub items: Vec<CartItemResponse>,

    #[salvo(schema(value_type = String))]
    pub total_price: Decimal,

    pub item_count: u64,
}

impl From<Cart> for CartStateResponse {
    fn from(cart: Cart) -> Self {
        Self {
            items: cart.items().map(CartItemResponse::from).collect(),
            total_price: cart.total_price(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub product_uuid: Uuid,
    pub quantity: u32,

    #[salvo(schema(value_type = String))]
    pub price: Decimal,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            product_uuid: item.product_uuid.into(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Loose quantity input: numbers and numeric strings are read, anything else
/// falls back to the operation's default.
pub(crate) fn quantity_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn quantity_text_reads_numbers_and_strings() {
        assert_eq!(quantity_text(Some(&json!(3))).as_deref(), Some("3"));
        assert_eq!(quantity_text(Some(&json!(" 4 "))).as_deref(), Some(" 4 "));
        assert_eq!(quantity_text(Some(&json!(true))), None);
        assert_eq!(quantity_text(None), None);
    }
}
