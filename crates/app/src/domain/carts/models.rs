//! Cart Models

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::domain::{
    accounts::records::AccountUuid,
    products::records::{ProductRecord, ProductUuid},
    sessions::SessionKey,
};

/// Largest quantity a single line can hold; matches the `INTEGER` storage column.
pub const MAX_LINE_QUANTITY: u32 = 2_147_483_647;

/// Whose cart an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    /// Anonymous visitor, stored in the session.
    Session(SessionKey),

    /// Signed-in account, stored in `cart_items`.
    Account(AccountUuid),
}

/// A stored cart line: quantity plus the unit price captured when first added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(skip)]
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub price: Decimal,
}

/// A cart line joined against the live catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: ProductRecord,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Resolved view of a whole cart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total_price: Decimal,
    pub item_count: u64,
}

/// Cart Model
///
/// At most one line per product. The cart never consults stock; it only
/// records what the visitor asked for and at what price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: BTreeMap<ProductUuid, CartItem>,
    modified: bool,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines without marking it modified.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.product_uuid, item))
                .collect(),
            modified: false,
        }
    }

    /// Add `quantity` units of `product`, or set the line to `quantity` when overriding.
    ///
    /// A non-positive quantity removes the line when overriding and is ignored otherwise.
    pub fn add(&mut self, product: &ProductRecord, quantity: i64, override_quantity: bool) {
        if quantity <= 0 {
            if override_quantity {
                self.remove(product.uuid);
            }

            return;
        }

        let quantity = clamp_quantity(quantity);

        let item = self.items.entry(product.uuid).or_insert(CartItem {
            product_uuid: product.uuid,
            quantity: 0,
            price: product.price,
        });

        item.quantity = if override_quantity {
            quantity
        } else {
            item.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY)
        };

        self.modified = true;
    }

    pub fn remove(&mut self, product: ProductUuid) {
        if self.items.remove(&product).is_some() {
            self.modified = true;
        }
    }

    pub fn update_quantity(&mut self, product: &ProductRecord, quantity: i64) {
        if quantity > 0 {
            self.add(product, quantity, true);
        } else {
            self.remove(product.uuid);
        }
    }

    /// Fold `other` into this cart. Quantities add; prices already held here win.
    pub fn merge(&mut self, other: &Cart) {
        for incoming in other.items.values() {
            let item = self.items.entry(incoming.product_uuid).or_insert(CartItem {
                quantity: 0,
                ..*incoming
            });

            item.quantity = item
                .quantity
                .saturating_add(incoming.quantity)
                .min(MAX_LINE_QUANTITY);

            self.modified = true;
        }
    }

    /// Empty the cart. Always marks it modified so the empty state is persisted.
    pub fn clear(&mut self) {
        self.items.clear();
        self.modified = true;
    }

    pub fn get(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.get(&product)
    }

    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    pub fn product_uuids(&self) -> SmallVec<[ProductUuid; 8]> {
        self.items.keys().copied().collect()
    }

    /// Resolved lines in product order. Products missing from `catalog` are skipped.
    ///
    /// The iterator is lazy and can be cloned to walk the cart again.
    pub fn lines<'a>(
        &'a self,
        catalog: &'a FxHashMap<ProductUuid, ProductRecord>,
    ) -> impl Iterator<Item = CartLine> + Clone + 'a {
        self.items
            .values()
            .filter_map(move |item| resolve(item, catalog))
    }

    /// The resolved line for `product`, if present in both cart and catalog.
    pub fn line(
        &self,
        product: ProductUuid,
        catalog: &FxHashMap<ProductUuid, ProductRecord>,
    ) -> Option<CartLine> {
        self.items
            .get(&product)
            .and_then(|item| resolve(item, catalog))
    }

    pub fn summary(&self, catalog: &FxHashMap<ProductUuid, ProductRecord>) -> CartSummary {
        CartSummary {
            lines: self.lines(catalog).collect(),
            total_price: self.total_price(),
            item_count: self.item_count(),
        }
    }

    /// Sum of stored unit price times quantity, including lines the catalog no longer has.
    pub fn total_price(&self) -> Decimal {
        self.items
            .values()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items
            .values()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Session representation: `{"<product uuid>": {"quantity": 2, "price": "12.50"}}`.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.items)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let items: BTreeMap<ProductUuid, CartItem> = serde_json::from_value(value)?;

        Ok(Self::from_items(items.into_iter().map(|(product_uuid, item)| {
            CartItem {
                product_uuid,
                ..item
            }
        })))
    }
}

fn resolve(item: &CartItem, catalog: &FxHashMap<ProductUuid, ProductRecord>) -> Option<CartLine> {
    let product = catalog.get(&item.product_uuid)?;

    Some(CartLine {
        product: product.clone(),
        quantity: item.quantity,
        unit_price: item.price,
        total_price: item.price * Decimal::from(item.quantity),
    })
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).map_or(MAX_LINE_QUANTITY, |q| q.min(MAX_LINE_QUANTITY))
}

/// Quantity for an addition: anything non-numeric or below one becomes one.
pub fn parse_add_quantity(raw: Option<&str>) -> i64 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|quantity| *quantity >= 1)
        .unwrap_or(1)
}

/// Quantity for an update: non-numeric becomes one, non-positive means removal.
pub fn parse_update_quantity(raw: Option<&str>) -> i64 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1)
}
