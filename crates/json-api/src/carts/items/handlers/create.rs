//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use storefront_app::domain::carts::models::parse_add_quantity;

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartStateResponse, quantity_text},
    },
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub product_uuid: Uuid,

    /// Units to add; anything that is not a positive integer counts as one
    #[serde(default)]
    #[salvo(schema(value_type = Option<Object>))]
    pub quantity: Option<Value>,

    /// Replace the line's quantity instead of adding to it
    #[serde(default, rename = "override")]
    pub override_quantity: bool,
}

/// Add Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    responses(
        (status_code = StatusCode::OK, description = "Item added"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartStateResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.cart_owner_or_500()?;

    let request = json.into_inner();
    let quantity = parse_add_quantity(quantity_text(request.quantity.as_ref()).as_deref());

    let cart = state
        .app
        .carts
        .add_item(
            &owner,
            request.product_uuid.into(),
            quantity,
            request.override_quantity,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
