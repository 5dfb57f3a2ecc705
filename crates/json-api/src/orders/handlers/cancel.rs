//! Cancel Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use storefront_app::domain::orders::records::OrderUuid;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{
        errors::{into_status_error, session_status_error},
        models::OrderResponse,
        session::owns_order,
    },
    state::State,
};

/// Cancel Order Handler
///
/// Pending and confirmed orders can be cancelled; their items go back to stock.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    responses(
        (status_code = StatusCode::OK, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order can no longer be cancelled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_key_or_500()?;
    let order: OrderUuid = order.into_inner().into();

    if !owns_order(state.app.sessions.as_ref(), session, order)
        .await
        .map_err(session_status_error)?
    {
        return Err(StatusError::not_found());
    }

    let record = state
        .app
        .orders
        .cancel_order(order)
        .await
        .map_err(into_status_error)?;

    info!(order = %record.uuid, "order cancelled");

    Ok(Json(record.into()))
}
