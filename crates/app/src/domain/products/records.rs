//! Product Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: String,

    /// Current authoritative price.
    pub price: Decimal,

    pub stock_quantity: u32,

    /// Untracked products (digital goods) have unlimited stock.
    pub track_stock: bool,

    pub allow_backorder: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProductRecord {
    /// Whether the product can currently be offered for sale.
    pub fn is_in_stock(&self) -> bool {
        !self.track_stock || self.stock_quantity > 0 || self.allow_backorder
    }

    /// Whether the ledger would accept a reduction of `quantity` units.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        !self.track_stock || self.stock_quantity >= quantity
    }
}
