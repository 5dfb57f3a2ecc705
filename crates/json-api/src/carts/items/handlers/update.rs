//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use storefront_app::domain::carts::models::parse_update_quantity;

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartStateResponse, quantity_text},
    },
    extensions::*,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// New quantity; zero or less removes the line, unreadable input counts as one
    #[serde(default)]
    #[salvo(schema(value_type = Option<Object>))]
    pub quantity: Option<Value>,
}

/// Update Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Update Cart Item Quantity",
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartStateResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.cart_owner_or_500()?;

    let request = json.into_inner();
    let quantity = parse_update_quantity(quantity_text(request.quantity.as_ref()).as_deref());

    let cart = state
        .app
        .carts
        .update_quantity(&owner, product.into_inner().into(), quantity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
