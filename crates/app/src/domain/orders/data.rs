//! Orders Data

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{
    accounts::records::AccountUuid,
    orders::{errors::OrdersServiceError, records::OrderUuid},
    products::records::ProductUuid,
};

/// Country recorded when the customer leaves it blank.
pub const DEFAULT_COUNTRY: &str = "Brasil";

/// Customer and delivery details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ShippingInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub shipping_method: String,
}

impl ShippingInfo {
    /// Trim every field, fill in the default country and check required fields.
    pub fn normalized(self) -> Result<Self, OrdersServiceError> {
        let trim = |value: String| value.trim().to_string();

        let mut info = Self {
            email: trim(self.email).to_lowercase(),
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
            phone: trim(self.phone),
            address_line_1: trim(self.address_line_1),
            address_line_2: trim(self.address_line_2),
            city: trim(self.city),
            state: trim(self.state).to_uppercase(),
            postal_code: trim(self.postal_code),
            country: trim(self.country),
            shipping_method: trim(self.shipping_method),
        };

        if info.country.is_empty() {
            DEFAULT_COUNTRY.clone_into(&mut info.country);
        }

        let required = [
            &info.email,
            &info.first_name,
            &info.last_name,
            &info.address_line_1,
            &info.city,
            &info.state,
            &info.postal_code,
        ];

        if required.iter().any(|field| field.is_empty()) {
            return Err(OrdersServiceError::MissingRequiredData);
        }

        if !info.email.contains('@') {
            return Err(OrdersServiceError::InvalidData);
        }

        Ok(info)
    }
}

/// Row values for a new order header.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub account_uuid: Option<AccountUuid>,
    pub shipping: ShippingInfo,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

/// Row values for an order line snapshot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewOrderItem {
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}
