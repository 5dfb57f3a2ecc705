//! Orders service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        accounts::records::AccountUuid,
        carts::{CartsService, models::CartOwner},
        orders::{
            data::{NewOrder, NewOrderItem, ShippingInfo},
            errors::OrdersServiceError,
            records::{OrderRecord, OrderStatus, OrderUuid},
            repository::PgOrdersRepository,
        },
        products::{records::ProductRecord, repository::PgProductsRepository},
    },
};

/// How many fresh order numbers to try before giving up.
pub const ORDER_NUMBER_ATTEMPTS: usize = 5;

type OrderNumberGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// `ORD-` followed by eight random uppercase hex digits.
pub fn generate_order_number() -> String {
    format!("ORD-{:08X}", rand::random::<u32>())
}

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    carts: Arc<dyn CartsService>,
    repository: PgOrdersRepository,
    products: PgProductsRepository,
    order_numbers: OrderNumberGenerator,
}

impl fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, carts: Arc<dyn CartsService>) -> Self {
        Self {
            db,
            carts,
            repository: PgOrdersRepository::new(),
            products: PgProductsRepository::new(),
            order_numbers: Arc::new(generate_order_number),
        }
    }

    /// Replace the order number source.
    #[must_use]
    pub fn with_order_numbers(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.order_numbers = Arc::new(generator);
        self
    }

    async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let order_number = (self.order_numbers)();

            if let Some(created) = self
                .repository
                .create_order(tx, &order_number, order)
                .await?
            {
                return Ok(created);
            }

            warn!(%order_number, attempt, "order number collision");
        }

        Err(OrdersServiceError::OrderNumberCollision)
    }

    async fn transition(
        &self,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        if !current.status.can_transition_to(next) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        if next == OrderStatus::Cancelled {
            for item in &current.items {
                self.products
                    .increase_stock(&mut tx, item.product_uuid, item.quantity)
                    .await?;
            }
        }

        let updated = self.repository.update_status(&mut tx, &current, next).await?;

        tx.commit().await?;

        info!(
            order_number = %updated.order_number,
            from = %current.status,
            to = %next,
            "order status changed"
        );

        Ok(updated)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order_from_cart(
        &self,
        owner: &CartOwner,
        shipping: ShippingInfo,
        shipping_cost: Decimal,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if shipping_cost < Decimal::ZERO {
            return Err(OrdersServiceError::InvalidData);
        }

        let shipping = shipping.normalized()?;
        let cart = self.carts.get_cart(owner).await?;

        if cart.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let account_uuid = match owner {
            CartOwner::Account(account) => Some(*account),
            CartOwner::Session(_) => None,
        };

        let mut tx = self.db.begin_transaction().await?;

        let catalog: FxHashMap<_, ProductRecord> = self
            .products
            .get_products(&mut tx, &cart.product_uuids())
            .await?
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        let subtotal = cart.total_price();

        let new_order = NewOrder {
            uuid: OrderUuid::new(),
            account_uuid,
            shipping,
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
        };

        let mut order = self.insert_order(&mut tx, &new_order).await?;

        for item in cart.items() {
            let Some(product) = catalog
                .get(&item.product_uuid)
                .filter(|product| product.is_active)
            else {
                return Err(OrdersServiceError::ProductUnavailable(item.product_uuid));
            };

            let reduced = self
                .products
                .reduce_stock(&mut tx, item.product_uuid, item.quantity)
                .await?;

            if !reduced {
                tx.rollback().await?;

                warn!(
                    product = %item.product_uuid,
                    quantity = item.quantity,
                    "checkout refused for insufficient stock"
                );

                return Err(OrdersServiceError::InsufficientStock(item.product_uuid));
            }

            let created = self
                .repository
                .create_order_item(
                    &mut tx,
                    order.uuid,
                    NewOrderItem {
                        product_uuid: product.uuid,
                        product_name: product.name.clone(),
                        product_sku: product.sku.clone(),
                        quantity: item.quantity,
                        unit_price: item.price,
                        total_price: item.price * Decimal::from(item.quantity),
                    },
                )
                .await?;

            order.items.push(created);
        }

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            lines = order.items.len(),
            total = %order.total,
            "order created"
        );

        if let Err(error) = self.carts.clear(owner).await {
            warn!(order_number = %order.order_number, %error, "failed to clear cart after checkout");
        }

        Ok(order)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.repository.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(
        &self,
        account: AccountUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let orders = self.repository.list_orders(&mut tx, account).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn cancel_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        self.transition(order, OrderStatus::Cancelled).await
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        self.transition(order, status).await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the owner's cart into an order, taking stock for every line.
    ///
    /// Either the whole order is written and all stock taken, or nothing is.
    /// The cart is cleared only once the order is committed.
    async fn create_order_from_cart(
        &self,
        owner: &CartOwner,
        shipping: ShippingInfo,
        shipping_cost: Decimal,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order with its items.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// An account's orders, newest first.
    async fn list_orders(&self, account: AccountUuid)
    -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Cancel a pending or confirmed order and return its items to stock.
    async fn cancel_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Move an order along its lifecycle.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        domain::{
            orders::records::PaymentStatus,
            products::{ProductsService, StockLedger, data::ProductUpdate},
            sessions::SessionKey,
        },
        test::{
            TestContext,
            helpers::{create_account, create_product, shipping_info},
        },
    };

    use super::*;

    fn session_owner() -> CartOwner {
        CartOwner::Session(SessionKey::generate())
    }

    #[test]
    fn generated_order_numbers_have_fixed_shape() {
        let number = generate_order_number();
        let suffix = number.strip_prefix("ORD-").unwrap_or_default();

        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn checkout_takes_stock_and_clears_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let a = create_product(&ctx, dec!(10.00), 5).await?;
        let b = create_product(&ctx, dec!(2.50), 4).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, a.uuid, 2, false).await?;
        ctx.carts.add_item(&owner, b.uuid, 4, false).await?;

        let order = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(15.00))
            .await?;

        assert_eq!(order.subtotal, dec!(30.00));
        assert_eq!(order.shipping_cost, dec!(15.00));
        assert_eq!(order.total, dec!(45.00));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.item_count(), 6);
        assert!(order.account_uuid.is_none());
        assert!(order.order_number.starts_with("ORD-"));

        assert_eq!(ctx.products.get_product(a.uuid).await?.stock_quantity, 3);
        assert_eq!(ctx.products.get_product(b.uuid).await?.stock_quantity, 0);
        assert!(ctx.carts.get_cart(&owner).await?.is_empty());

        let stored = ctx.orders.get_order(order.uuid).await?;

        assert_eq!(stored, order);

        Ok(())
    }

    #[tokio::test]
    async fn items_snapshot_cart_price_and_product_details() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(10.00), 5).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, product.uuid, 2, false).await?;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: "Renamed".to_string(),
                    price: dec!(99.00),
                    is_active: true,
                },
            )
            .await?;

        let order = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(0))
            .await?;

        let item = order.items.first().ok_or("missing order item")?;

        assert_eq!(item.unit_price, dec!(10.00));
        assert_eq!(item.total_price, dec!(20.00));
        assert_eq!(item.product_name, "Renamed");
        assert_eq!(item.product_sku, product.sku);
        assert_eq!(order.subtotal, dec!(20.00));

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_rolls_back_everything() -> TestResult {
        let ctx = TestContext::new().await;
        let plenty = create_product(&ctx, dec!(1.00), 10).await?;
        let short = create_product(&ctx, dec!(1.00), 5).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, plenty.uuid, 4, false).await?;
        ctx.carts.add_item(&owner, short.uuid, 3, false).await?;

        // Someone else buys most of the stock after it went into the cart.
        assert!(ctx.stock.reduce(short.uuid, 3).await?);

        let result = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(5.00))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InsufficientStock(p)) if p == short.uuid),
            "expected InsufficientStock, got {result:?}"
        );

        assert_eq!(ctx.products.get_product(short.uuid).await?.stock_quantity, 2);
        assert_eq!(ctx.products.get_product(plenty.uuid).await?.stock_quantity, 10);

        let cart = ctx.carts.get_cart(&owner).await?;

        assert_eq!(cart.item_count(), 7);

        let orders: i64 = sqlx::query_scalar("SELECT count(*) FROM orders")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(orders, 0);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .create_order_from_cart(&session_owner(), shipping_info(), dec!(0))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn negative_shipping_cost_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(1.00), 10).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, product.uuid, 1, false).await?;

        let result = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(-1.00))
            .await;

        assert!(matches!(result, Err(OrdersServiceError::InvalidData)));

        Ok(())
    }

    #[tokio::test]
    async fn deactivated_product_makes_checkout_fail() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(1.00), 10).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, product.uuid, 1, false).await?;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: product.name.clone(),
                    price: product.price,
                    is_active: false,
                },
            )
            .await?;

        let result = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(0))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::ProductUnavailable(p)) if p == product.uuid),
            "expected ProductUnavailable, got {result:?}"
        );

        assert_eq!(ctx.products.get_product(product.uuid).await?.stock_quantity, 10);

        Ok(())
    }

    #[tokio::test]
    async fn order_number_collisions_are_retried() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(1.00), 10).await?;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        // First two draws repeat the same number, the third is fresh.
        let orders = PgOrdersService::new(ctx.app_db(), Arc::new(ctx.carts.clone()))
            .with_order_numbers(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);

                if n < 2 {
                    "ORD-00000001".to_string()
                } else {
                    format!("ORD-{n:08X}")
                }
            });

        let first_owner = session_owner();
        ctx.carts.add_item(&first_owner, product.uuid, 1, false).await?;
        let first = orders
            .create_order_from_cart(&first_owner, shipping_info(), dec!(0))
            .await?;

        let second_owner = session_owner();
        ctx.carts.add_item(&second_owner, product.uuid, 1, false).await?;
        let second = orders
            .create_order_from_cart(&second_owner, shipping_info(), dec!(0))
            .await?;

        assert_eq!(first.order_number, "ORD-00000001");
        assert_eq!(second.order_number, "ORD-00000002");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_order_numbers_fail_without_taking_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(1.00), 10).await?;

        let orders = PgOrdersService::new(ctx.app_db(), Arc::new(ctx.carts.clone()))
            .with_order_numbers(|| "ORD-DEADBEEF".to_string());

        let first_owner = session_owner();
        ctx.carts.add_item(&first_owner, product.uuid, 1, false).await?;
        orders
            .create_order_from_cart(&first_owner, shipping_info(), dec!(0))
            .await?;

        let second_owner = session_owner();
        ctx.carts.add_item(&second_owner, product.uuid, 1, false).await?;
        let result = orders
            .create_order_from_cart(&second_owner, shipping_info(), dec!(0))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::OrderNumberCollision)),
            "expected OrderNumberCollision, got {result:?}"
        );

        assert_eq!(ctx.products.get_product(product.uuid).await?.stock_quantity, 9);
        assert_eq!(ctx.carts.get_cart(&second_owner).await?.item_count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn account_checkout_links_order_to_account() -> TestResult {
        let ctx = TestContext::new().await;
        let account = create_account(&ctx).await?;
        let product = create_product(&ctx, dec!(3.00), 10).await?;
        let owner = CartOwner::Account(account.uuid);

        ctx.carts.add_item(&owner, product.uuid, 1, false).await?;
        let older = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(0))
            .await?;

        ctx.carts.add_item(&owner, product.uuid, 2, false).await?;
        let newer = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(0))
            .await?;

        assert_eq!(newer.account_uuid, Some(account.uuid));

        let orders = ctx.orders.list_orders(account.uuid).await?;
        let uuids: Vec<OrderUuid> = orders.iter().map(|o| o.uuid).collect();

        assert_eq!(uuids, vec![newer.uuid, older.uuid]);
        assert_eq!(orders.first().map(OrderRecord::item_count), Some(2));
        assert!(ctx.carts.get_cart(&owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn cancel_returns_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(3.00), 10).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, product.uuid, 4, false).await?;
        let order = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(0))
            .await?;

        assert_eq!(ctx.products.get_product(product.uuid).await?.stock_quantity, 6);

        let cancelled = ctx.orders.cancel_order(order.uuid).await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(!cancelled.can_be_cancelled());
        assert_eq!(ctx.products.get_product(product.uuid).await?.stock_quantity, 10);

        let again = ctx.orders.cancel_order(order.uuid).await;

        assert!(
            matches!(
                again,
                Err(OrdersServiceError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Cancelled
                })
            ),
            "expected InvalidTransition, got {again:?}"
        );

        assert_eq!(ctx.products.get_product(product.uuid).await?.stock_quantity, 10);

        Ok(())
    }

    #[tokio::test]
    async fn status_updates_follow_lifecycle_and_stamp_times() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(3.00), 10).await?;
        let owner = session_owner();

        ctx.carts.add_item(&owner, product.uuid, 1, false).await?;
        let order = ctx
            .orders
            .create_order_from_cart(&owner, shipping_info(), dec!(0))
            .await?;

        let skipped = ctx.orders.update_status(order.uuid, OrderStatus::Shipped).await;

        assert!(matches!(skipped, Err(OrdersServiceError::InvalidTransition { .. })));

        for status in [OrderStatus::Confirmed, OrderStatus::Processing] {
            ctx.orders.update_status(order.uuid, status).await?;
        }

        let shipped = ctx.orders.update_status(order.uuid, OrderStatus::Shipped).await?;

        assert!(shipped.shipped_at.is_some());
        assert!(shipped.delivered_at.is_none());

        let delivered = ctx.orders.update_status(order.uuid, OrderStatus::Delivered).await?;

        assert!(delivered.delivered_at.is_some());
        assert_eq!(delivered.shipped_at, shipped.shipped_at);

        let cancel = ctx.orders.cancel_order(order.uuid).await;

        assert!(matches!(cancel, Err(OrdersServiceError::InvalidTransition { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.get_order(OrderUuid::new()).await;

        assert!(matches!(result, Err(OrdersServiceError::NotFound)));
    }

    #[tokio::test]
    async fn checkout_succeeds_when_cart_clear_fails() -> TestResult {
        use crate::domain::carts::{CartsServiceError, MockCartsService, models::Cart};

        let ctx = TestContext::new().await;
        let product = create_product(&ctx, dec!(2.00), 10).await?;
        let record = ctx.products.get_product(product.uuid).await?;

        let mut cart = Cart::new();
        cart.add(&record, 3, false);

        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .times(1)
            .returning(move |_| Ok(cart.clone()));
        carts
            .expect_clear()
            .times(1)
            .returning(|_| Err(CartsServiceError::InvalidData));

        let orders = PgOrdersService::new(ctx.app_db(), Arc::new(carts));
        let order = orders
            .create_order_from_cart(&session_owner(), shipping_info(), dec!(1.00))
            .await?;

        assert_eq!(order.total, dec!(7.00));
        assert_eq!(ctx.products.get_product(product.uuid).await?.stock_quantity, 7);

        Ok(())
    }
}
