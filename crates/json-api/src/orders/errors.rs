//! Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::{
    orders::OrdersServiceError, payments::PaymentsServiceError, sessions::SessionError,
};

use crate::carts;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::EmptyCart => StatusError::unprocessable_entity().brief("Cart is empty"),
        OrdersServiceError::InsufficientStock(product) => {
            StatusError::conflict().brief(format!("Insufficient stock for product {product}"))
        }
        OrdersServiceError::ProductUnavailable(product) => {
            StatusError::conflict().brief(format!("Product {product} is no longer available"))
        }
        OrdersServiceError::InvalidTransition { from, to } => {
            StatusError::conflict().brief(format!("Order cannot move from {from} to {to}"))
        }
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::NotFound => StatusError::not_found(),
        OrdersServiceError::InvalidReference => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::MissingRequiredData | OrdersServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid checkout details")
        }
        OrdersServiceError::Cart(source) => carts::errors::into_status_error(source),
        OrdersServiceError::OrderNumberCollision => {
            error!("failed to allocate an order number");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("failed to access order storage: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn payments_status_error(error: PaymentsServiceError) -> StatusError {
    error!("failed to load order payments: {error}");

    StatusError::internal_server_error()
}

pub(crate) fn session_status_error(error: SessionError) -> StatusError {
    error!("failed to read session orders: {error}");

    StatusError::internal_server_error()
}
