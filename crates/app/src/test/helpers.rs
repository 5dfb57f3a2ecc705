//! Test Helpers

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    domain::{
        accounts::{
            AccountsService, AccountsServiceError,
            data::{NewAccount, NewAddress},
            records::{AccountRecord, AccountUuid, AddressKind, AddressUuid},
        },
        orders::data::ShippingInfo,
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
    },
    test::TestContext,
};

fn unique_suffix() -> String {
    Uuid::now_v7().simple().to_string()
}

/// A tracked, active product with a unique SKU.
pub(crate) fn new_product(price: Decimal, stock: u32) -> NewProduct {
    let suffix = unique_suffix();

    NewProduct {
        uuid: ProductUuid::new(),
        name: format!("Product {suffix}"),
        sku: format!("SKU-{suffix}"),
        price,
        stock_quantity: stock,
        track_stock: true,
        allow_backorder: false,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    price: Decimal,
    stock: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products.create_product(new_product(price, stock)).await
}

pub(crate) async fn create_account(ctx: &TestContext) -> Result<AccountRecord, AccountsServiceError> {
    ctx.accounts
        .create_account(NewAccount {
            uuid: AccountUuid::new(),
            email: format!("customer-{}@example.com", unique_suffix()),
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            phone: "+5581999998888".to_string(),
        })
        .await
}

pub(crate) fn new_address(name: &str, is_default: bool) -> NewAddress {
    NewAddress {
        uuid: AddressUuid::new(),
        kind: AddressKind::Home,
        name: name.to_string(),
        street: "Rua da Aurora".to_string(),
        number: "100".to_string(),
        complement: String::new(),
        neighborhood: "Boa Vista".to_string(),
        city: "Recife".to_string(),
        state: "PE".to_string(),
        zip_code: "50050-000".to_string(),
        is_default,
    }
}

pub(crate) fn shipping_info() -> ShippingInfo {
    ShippingInfo {
        email: "ana@example.com".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Souza".to_string(),
        phone: "+5581999998888".to_string(),
        address_line_1: "Rua da Aurora, 100".to_string(),
        address_line_2: String::new(),
        city: "Recife".to_string(),
        state: "PE".to_string(),
        postal_code: "50050-000".to_string(),
        country: String::new(),
        shipping_method: "standard".to_string(),
    }
}
