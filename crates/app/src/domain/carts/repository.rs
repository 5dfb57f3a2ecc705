//! Account Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{quantity_param, try_get_quantity},
    domain::{
        accounts::records::AccountUuid,
        carts::models::{Cart, CartItem},
        products::records::ProductUuid,
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("sql/upsert_cart_item.sql");
const DELETE_OTHER_CART_ITEMS_SQL: &str = include_str!("sql/delete_other_cart_items.sql");
const CLEAR_CART_ITEMS_SQL: &str = include_str!("sql/clear_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Cart, sqlx::Error> {
        let items = query_as::<Postgres, CartItem>(GET_CART_ITEMS_SQL)
            .bind(account.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(Cart::from_items(items))
    }

    /// Make the stored rows for `account` match `cart` exactly.
    pub(crate) async fn save_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        cart: &Cart,
    ) -> Result<(), sqlx::Error> {
        let keep: Vec<Uuid> = cart
            .product_uuids()
            .into_iter()
            .map(ProductUuid::into_uuid)
            .collect();

        query(DELETE_OTHER_CART_ITEMS_SQL)
            .bind(account.into_uuid())
            .bind(keep)
            .execute(&mut **tx)
            .await?;

        for item in cart.items() {
            query(UPSERT_CART_ITEM_SQL)
                .bind(account.into_uuid())
                .bind(item.product_uuid.into_uuid())
                .bind(quantity_param("quantity", item.quantity)?)
                .bind(item.price)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    pub(crate) async fn clear_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_ITEMS_SQL)
            .bind(account.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_quantity(row, "quantity")?,
            price: row.try_get("price")?,
        })
    }
}
