//! Test context for service-level integration tests.

use std::sync::Arc;

use jiff::SignedDuration;

use crate::{
    database::Db,
    domain::{
        accounts::PgAccountsService, carts::PgCartsService, orders::PgOrdersService,
        products::{PgProductsService, PgStockLedger},
        sessions::PgSessionStore,
    },
};

use super::db::TestDb;

/// Session lifetime used by the test session store.
const SESSION_TTL: SignedDuration = SignedDuration::from_secs(60 * 60);

/// Services wired against a fresh, migrated database.
///
/// Payments are not part of the context because every payments test supplies
/// its own gateway and notifier mocks.
pub struct TestContext {
    pub db: TestDb,
    pub accounts: PgAccountsService,
    pub products: PgProductsService,
    pub stock: PgStockLedger,
    pub sessions: PgSessionStore,
    pub carts: PgCartsService,
    pub orders: PgOrdersService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let sessions = PgSessionStore::new(db.clone(), SESSION_TTL);
        let carts = PgCartsService::new(db.clone(), Arc::new(sessions.clone()));

        Self {
            accounts: PgAccountsService::new(db.clone()),
            products: PgProductsService::new(db.clone()),
            stock: PgStockLedger::new(db.clone()),
            orders: PgOrdersService::new(db, Arc::new(carts.clone())),
            sessions,
            carts,
            db: test_db,
        }
    }

    /// A fresh handle on the test database for wiring extra services.
    pub fn app_db(&self) -> Db {
        Db::new(self.db.pool().clone())
    }
}
