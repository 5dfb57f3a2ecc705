//! Payment Webhook Handler
//!
//! The gateway retries any delivery that does not get a 200, so every
//! delivery is acknowledged. Failures are logged and counted instead.

use std::sync::Arc;

use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use storefront_app::domain::payments::{WebhookOutcome, WebhookPayload};

use crate::{extensions::*, observability::observe_payment_webhook, state::State};

/// Webhook Acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookAck {
    pub received: bool,
}

/// Payment Webhook Handler
#[endpoint(
    tags("webhooks"),
    summary = "Payment Notification",
    responses(
        (status_code = StatusCode::OK, description = "Notification acknowledged"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<WebhookAck>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let parsed = match req.payload().await {
        Ok(body) => {
            serde_json::from_slice::<WebhookPayload>(body).map_err(|source| source.to_string())
        }
        Err(source) => Err(source.to_string()),
    };

    let payload = match parsed {
        Ok(payload) => payload,
        Err(reason) => {
            warn!("malformed payment webhook body: {reason}");
            observe_payment_webhook("malformed");

            return Ok(Json(WebhookAck { received: true }));
        }
    };

    let outcome = match state.app.payments.handle_webhook(payload).await {
        Ok(WebhookOutcome::Ignored) => {
            debug!("payment webhook ignored");

            "ignored"
        }
        Ok(WebhookOutcome::OrderNotFound) => {
            warn!("payment webhook references an unknown order");

            "order_not_found"
        }
        Ok(WebhookOutcome::Processed {
            order,
            payment_status,
            confirmed,
        }) => {
            info!(%order, %payment_status, confirmed, "payment webhook processed");

            "processed"
        }
        Err(source) => {
            error!("failed to process payment webhook: {source}");

            "error"
        }
    };

    observe_payment_webhook(outcome);

    Ok(Json(WebhookAck { received: true }))
}
