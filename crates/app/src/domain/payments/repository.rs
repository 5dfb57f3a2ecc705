//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    database::decode_column,
    domain::{
        orders::records::{OrderUuid, PaymentStatus},
        payments::{
            gateway::GatewayPayment,
            records::{PaymentRecord, PaymentUuid},
        },
    },
};

const LOCK_PAYMENT_SQL: &str = include_str!("sql/lock_payment.sql");
const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const UPDATE_PAYMENT_SQL: &str = include_str!("sql/update_payment.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn lock_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gateway_transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_SQL)
            .bind(gateway_transaction_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a pending payment; `None` if the gateway id is already recorded.
    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment: &GatewayPayment,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(PaymentUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(&payment.id)
            .bind(payment.amount)
            .bind(Json(&payment.raw))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        status: PaymentStatus,
        amount: Decimal,
        response: &Value,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(UPDATE_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .bind(status.as_str())
            .bind(amount)
            .bind(Json(response))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_PAYMENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            gateway_transaction_id: row.try_get("gateway_transaction_id")?,
            amount: row.try_get("amount")?,
            status: decode_column("status", status.parse())?,
            gateway_response: row
                .try_get::<Option<Json<Value>>, _>("gateway_response")?
                .map(|json| json.0),
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
