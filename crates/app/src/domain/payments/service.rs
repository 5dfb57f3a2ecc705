//! Payments service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{
            OrderNotifier,
            records::{OrderStatus, OrderUuid, PaymentStatus},
            repository::PgOrdersRepository,
        },
        payments::{
            errors::PaymentsServiceError,
            gateway::PaymentGateway,
            records::{PaymentRecord, map_gateway_status},
            repository::PgPaymentsRepository,
            webhook::{WebhookOutcome, WebhookPayload},
        },
    },
};

/// Order state after a payment report, or the current state when the report
/// would be a downgrade.
pub fn reconcile(
    status: OrderStatus,
    payment_status: PaymentStatus,
    reported: PaymentStatus,
) -> (OrderStatus, PaymentStatus) {
    if !payment_status.accepts(reported) {
        return (status, payment_status);
    }

    match reported {
        PaymentStatus::Completed => {
            let status = if status.can_transition_to(OrderStatus::Confirmed) {
                OrderStatus::Confirmed
            } else {
                status
            };

            (status, PaymentStatus::Completed)
        }
        PaymentStatus::Processing
        | PaymentStatus::Failed
        | PaymentStatus::Cancelled
        | PaymentStatus::Refunded => (status, reported),
        PaymentStatus::Pending => (status, payment_status),
    }
}

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn OrderNotifier>,
    repository: PgPaymentsRepository,
    orders: PgOrdersRepository,
}

impl fmt::Debug for PgPaymentsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgPaymentsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(
        db: Db,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        Self {
            db,
            gateway,
            notifier,
            repository: PgPaymentsRepository::new(),
            orders: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn handle_webhook(
        &self,
        payload: WebhookPayload,
    ) -> Result<WebhookOutcome, PaymentsServiceError> {
        let Some(payment_id) = payload.payment_id() else {
            debug!(kind = ?payload.kind, "ignoring webhook notification");

            return Ok(WebhookOutcome::Ignored);
        };

        let remote = self.gateway.get_payment(&payment_id).await?;

        let Some(order_number) = remote.external_reference.as_deref() else {
            warn!(%payment_id, "gateway payment has no order reference");

            return Ok(WebhookOutcome::OrderNotFound);
        };

        let reported = map_gateway_status(&remote.status);

        if reported == PaymentStatus::Pending {
            warn!(%payment_id, status = %remote.status, "unrecognised gateway payment status");
        }

        let mut tx = self.db.begin_transaction().await?;

        let Some(order) = self.orders.lock_order_by_number(&mut tx, order_number).await? else {
            warn!(%payment_id, %order_number, "payment for unknown order");

            return Ok(WebhookOutcome::OrderNotFound);
        };

        let payment = match self.repository.lock_payment(&mut tx, &remote.id).await? {
            Some(payment) => payment,
            None => match self
                .repository
                .create_payment(&mut tx, order.uuid, &remote)
                .await?
            {
                Some(payment) => payment,
                None => self
                    .repository
                    .lock_payment(&mut tx, &remote.id)
                    .await?
                    .ok_or(PaymentsServiceError::NotFound)?,
            },
        };

        if payment.order_uuid != order.uuid {
            warn!(
                %payment_id,
                %order_number,
                recorded_order = %payment.order_uuid,
                "payment reference does not match its recorded order"
            );

            return Ok(WebhookOutcome::Ignored);
        }

        let payment_status = if payment.status.accepts(reported) {
            reported
        } else {
            payment.status
        };

        self.repository
            .update_payment(
                &mut tx,
                payment.uuid,
                payment_status,
                remote.amount,
                &remote.raw,
            )
            .await?;

        let (next_status, next_payment_status) =
            reconcile(order.status, order.payment_status, reported);

        let confirmed = next_payment_status == PaymentStatus::Completed
            && order.payment_status != PaymentStatus::Completed;

        let order = if (next_status, next_payment_status) == (order.status, order.payment_status)
        {
            order
        } else {
            self.orders
                .update_payment_state(&mut tx, &order, next_status, next_payment_status)
                .await?
        };

        tx.commit().await?;

        info!(
            %payment_id,
            order_number = %order.order_number,
            payment_status = %payment_status,
            order_status = %order.status,
            "payment webhook processed"
        );

        if confirmed && let Err(error) = self.notifier.order_confirmed(&order).await {
            warn!(order_number = %order.order_number, %error, "order confirmation failed");
        }

        Ok(WebhookOutcome::Processed {
            order: order.uuid,
            payment_status,
            confirmed,
        })
    }

    async fn list_payments(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let payments = self.repository.list_payments(&mut tx, order).await?;

        tx.commit().await?;

        Ok(payments)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Reconcile a gateway notification against our order and payment rows.
    ///
    /// Replays of the same notification leave the same end state and confirm
    /// the order at most once.
    async fn handle_webhook(
        &self,
        payload: WebhookPayload,
    ) -> Result<WebhookOutcome, PaymentsServiceError>;

    /// Payments recorded against an order, oldest first.
    async fn list_payments(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;
}
