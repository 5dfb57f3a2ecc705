//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::{decode_column, quantity_param, try_get_quantity},
    domain::{
        accounts::records::AccountUuid,
        orders::{
            data::{NewOrder, NewOrderItem},
            records::{
                OrderItemRecord, OrderItemUuid, OrderRecord, OrderStatus, OrderUuid,
                PaymentStatus,
            },
        },
        products::records::ProductUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const LOCK_ORDER_BY_NUMBER_SQL: &str = include_str!("sql/lock_order_by_number.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const UPDATE_ORDER_PAYMENT_SQL: &str = include_str!("sql/update_order_payment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert an order header; `None` when `order_number` is already taken.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &str,
        order: &NewOrder,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let shipping = &order.shipping;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order_number)
            .bind(order.account_uuid.map(AccountUuid::into_uuid))
            .bind(&shipping.email)
            .bind(&shipping.first_name)
            .bind(&shipping.last_name)
            .bind(&shipping.phone)
            .bind(&shipping.address_line_1)
            .bind(&shipping.address_line_2)
            .bind(&shipping.city)
            .bind(&shipping.state)
            .bind(&shipping.postal_code)
            .bind(&shipping.country)
            .bind(&shipping.shipping_method)
            .bind(order.subtotal)
            .bind(order.shipping_cost)
            .bind(order.total)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        item: NewOrderItem,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEM_SQL)
            .bind(OrderItemUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(item.product_name)
            .bind(item.product_sku)
            .bind(quantity_param("quantity", item.quantity)?)
            .bind(item.unit_price)
            .bind(item.total_price)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, order).await
    }

    /// Fetch an order with its items, holding a row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, order).await
    }

    pub(crate) async fn lock_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(LOCK_ORDER_BY_NUMBER_SQL)
            .bind(order_number)
            .fetch_optional(&mut **tx)
            .await?;

        match order {
            Some(order) => self.with_items(tx, order).await.map(Some),
            None => Ok(None),
        }
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let mut orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(account.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let mut items: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in self.get_order_items(tx, &uuids).await? {
            items.entry(item.order_uuid).or_default().push(item);
        }

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        let mut updated = query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.uuid.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await?;

        updated.items.clone_from(&order.items);

        Ok(updated)
    }

    pub(crate) async fn update_payment_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        let mut updated = query_as::<Postgres, OrderRecord>(UPDATE_ORDER_PAYMENT_SQL)
            .bind(order.uuid.into_uuid())
            .bind(status.as_str())
            .bind(payment_status.as_str())
            .fetch_one(&mut **tx)
            .await?;

        updated.items.clone_from(&order.items);

        Ok(updated)
    }

    async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[Uuid],
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(orders)
            .fetch_all(&mut **tx)
            .await
    }

    async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, sqlx::Error> {
        order.items = self
            .get_order_items(tx, &[order.uuid.into_uuid()])
            .await?;

        Ok(order)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let payment_status: String = row.try_get("payment_status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            account_uuid: row
                .try_get::<Option<Uuid>, _>("account_uuid")?
                .map(AccountUuid::from_uuid),
            status: decode_column("status", status.parse())?,
            payment_status: decode_column("payment_status", payment_status.parse())?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            phone: row.try_get("phone")?,
            shipping_address_line_1: row.try_get("shipping_address_line_1")?,
            shipping_address_line_2: row.try_get("shipping_address_line_2")?,
            shipping_city: row.try_get("shipping_city")?,
            shipping_state: row.try_get("shipping_state")?,
            shipping_postal_code: row.try_get("shipping_postal_code")?,
            shipping_country: row.try_get("shipping_country")?,
            shipping_method: row.try_get("shipping_method")?,
            subtotal: row.try_get("subtotal")?,
            shipping_cost: row.try_get("shipping_cost")?,
            total: row.try_get("total")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            shipped_at: row
                .try_get::<Option<SqlxTimestamp>, _>("shipped_at")?
                .map(SqlxTimestamp::to_jiff),
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            product_sku: row.try_get("product_sku")?,
            quantity: try_get_quantity(row, "quantity")?,
            unit_price: row.try_get("unit_price")?,
            total_price: row.try_get("total_price")?,
        })
    }
}
