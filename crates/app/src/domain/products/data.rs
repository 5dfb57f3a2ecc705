//! Products Data

use rust_decimal::Decimal;

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    pub track_stock: bool,
    pub allow_backorder: bool,
}

/// Product Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    pub is_active: bool,
}
