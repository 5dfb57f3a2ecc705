//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use storefront_app::domain::{carts::models::CartOwner, sessions::SessionKey};
use tracing::error;

const SESSION_KEY_DEPOT_KEY: &str = "session_key";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_session_key(&mut self, session: SessionKey);

    fn session_key_or_500(&self) -> Result<&SessionKey, StatusError>;

    /// The visitor's cart, keyed by their session.
    fn cart_owner_or_500(&self) -> Result<CartOwner, StatusError> {
        self.session_key_or_500()
            .map(|session| CartOwner::Session(session.clone()))
    }
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_session_key(&mut self, session: SessionKey) {
        self.insert(SESSION_KEY_DEPOT_KEY, session);
    }

    fn session_key_or_500(&self) -> Result<&SessionKey, StatusError> {
        self.get::<SessionKey>(SESSION_KEY_DEPOT_KEY).map_err(|_ignored| {
            error!("session key missing from depot");

            StatusError::internal_server_error()
        })
    }
}
