//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use storefront_app::{
    context::AppContext,
    domain::{
        accounts::MockAccountsService,
        carts::MockCartsService,
        orders::{
            MockOrdersService,
            records::{OrderRecord, OrderStatus, OrderUuid, PaymentStatus},
        },
        payments::MockPaymentsService,
        products::{
            MockProductsService, MockStockLedger,
            records::{ProductRecord, ProductUuid},
        },
        sessions::MockSessionStore,
    },
};

use crate::{sessions, state::State};

/// Session key sent by tests that need a stable visitor.
pub(crate) const TEST_SESSION_KEY: &str = "test-session";

/// Strict service mocks; any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct TestApp {
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) payments: MockPaymentsService,
    pub(crate) sessions: MockSessionStore,
}

impl TestApp {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            accounts: Arc::new(MockAccountsService::new()),
            products: Arc::new(MockProductsService::new()),
            stock: Arc::new(MockStockLedger::new()),
            sessions: Arc::new(self.sessions),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
        })
    }

    /// Serve `route` behind state injection and the session middleware.
    pub(crate) fn service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(sessions::handler)
                .push(route),
        )
    }
}

pub(crate) fn make_product(price: Decimal) -> ProductRecord {
    let uuid = ProductUuid::new();

    ProductRecord {
        uuid,
        name: "Camiseta".to_string(),
        sku: format!("SKU-{uuid}"),
        price,
        stock_quantity: 10,
        track_stock: true,
        allow_backorder: false,
        is_active: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_order(uuid: OrderUuid) -> OrderRecord {
    OrderRecord {
        uuid,
        order_number: "ORD-0000BEEF".to_string(),
        account_uuid: None,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        email: "ana@example.com".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Souza".to_string(),
        phone: String::new(),
        shipping_address_line_1: "Rua da Aurora, 100".to_string(),
        shipping_address_line_2: String::new(),
        shipping_city: "Recife".to_string(),
        shipping_state: "PE".to_string(),
        shipping_postal_code: "50050-000".to_string(),
        shipping_country: "Brasil".to_string(),
        shipping_method: "standard".to_string(),
        subtotal: Decimal::new(2000, 2),
        shipping_cost: Decimal::new(500, 2),
        total: Decimal::new(2500, 2),
        items: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        shipped_at: None,
        delivered_at: None,
    }
}
