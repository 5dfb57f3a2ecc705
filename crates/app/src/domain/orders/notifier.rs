//! Order notifications.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::info;

use crate::domain::orders::records::OrderRecord;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound customer messaging about order events.
#[automock]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Tell the customer their payment cleared and the order is confirmed.
    async fn order_confirmed(&self, order: &OrderRecord) -> Result<(), NotifierError>;
}

/// Notifier that only writes a log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn order_confirmed(&self, order: &OrderRecord) -> Result<(), NotifierError> {
        info!(
            order_number = %order.order_number,
            email = %order.email,
            total = %order.total,
            "order confirmation dispatched"
        );

        Ok(())
    }
}
