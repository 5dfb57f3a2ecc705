//! Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::InsufficientStock(product) => {
            StatusError::conflict().brief(format!("Insufficient stock for product {product}"))
        }
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => StatusError::bad_request().brief("Invalid cart payload"),
        CartsServiceError::Encoding(source) => {
            error!("failed to encode cart: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Session(source) => {
            error!("failed to access session: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Sql(source) => {
            error!("failed to access cart storage: {source}");

            StatusError::internal_server_error()
        }
    }
}
