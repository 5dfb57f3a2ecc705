//! Checkout Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};
use tracing::{info, warn};

use storefront_app::domain::orders::OrdersServiceError;

use crate::{
    extensions::*,
    observability::observe_checkout,
    orders::{
        errors::into_status_error,
        models::{CheckoutRequest, OrderResponse},
        session::remember_order,
    },
    state::State,
};

/// Checkout Handler
///
/// Turns the visitor's cart into an order. Stock is taken for every line and
/// the cart is emptied once the order is stored.
#[endpoint(
    tags("orders"),
    summary = "Checkout",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Empty cart or invalid details"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.cart_owner_or_500()?;
    let session = depot.session_key_or_500()?;

    let (shipping, shipping_cost) = json.into_inner().into_parts();

    let order = match state
        .app
        .orders
        .create_order_from_cart(&owner, shipping, shipping_cost)
        .await
    {
        Ok(order) => order,
        Err(source) => {
            observe_checkout(checkout_outcome(&source));

            return Err(into_status_error(source));
        }
    };

    observe_checkout("placed");

    if let Err(error) = remember_order(state.app.sessions.as_ref(), session, order.uuid).await {
        warn!(order = %order.uuid, "failed to remember order in session: {error}");
    }

    info!(order = %order.uuid, number = %order.order_number, "order placed");

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}

fn checkout_outcome(error: &OrdersServiceError) -> &'static str {
    match error {
        OrdersServiceError::EmptyCart => "empty_cart",
        OrdersServiceError::InsufficientStock(_) => "insufficient_stock",
        OrdersServiceError::ProductUnavailable(_) => "product_unavailable",
        OrdersServiceError::MissingRequiredData | OrdersServiceError::InvalidData => "invalid",
        _ => "error",
    }
}
