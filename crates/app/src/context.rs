//! App Context

use std::sync::Arc;

use jiff::SignedDuration;
use thiserror::Error;

use crate::{
    database::{self, Db, PoolConfig},
    domain::{
        accounts::{AccountsService, PgAccountsService},
        carts::{CartsService, PgCartsService},
        orders::{LogNotifier, OrdersService, PgOrdersService},
        payments::{
            GatewayConfig, GatewayError, HttpPaymentGateway, PaymentGateway, PaymentsService,
            PgPaymentsService,
        },
        products::{PgProductsService, PgStockLedger, ProductsService, StockLedger},
        sessions::{PgSessionStore, SessionStore},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to build payment gateway client")]
    Gateway(#[source] GatewayError),
}

#[derive(Clone)]
pub struct AppContext {
    pub accounts: Arc<dyn AccountsService>,
    pub products: Arc<dyn ProductsService>,
    pub stock: Arc<dyn StockLedger>,
    pub sessions: Arc<dyn SessionStore>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the
    /// gateway client cannot be built.
    pub async fn from_database_url(
        url: &str,
        pool: PoolConfig,
        session_ttl: SignedDuration,
        gateway: GatewayConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        let gateway = HttpPaymentGateway::new(gateway).map_err(AppInitError::Gateway)?;

        Ok(Self::from_db(Db::new(pool), session_ttl, Arc::new(gateway)))
    }

    /// Wire every service onto one database handle.
    pub fn from_db(
        db: Db,
        session_ttl: SignedDuration,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(PgSessionStore::new(db.clone(), session_ttl));

        let carts: Arc<dyn CartsService> =
            Arc::new(PgCartsService::new(db.clone(), Arc::clone(&sessions)));

        Self {
            accounts: Arc::new(PgAccountsService::new(db.clone())),
            products: Arc::new(PgProductsService::new(db.clone())),
            stock: Arc::new(PgStockLedger::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone(), Arc::clone(&carts))),
            payments: Arc::new(PgPaymentsService::new(db, gateway, Arc::new(LogNotifier))),
            sessions,
            carts,
        }
    }
}
