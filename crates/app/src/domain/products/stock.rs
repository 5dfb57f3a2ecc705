//! Stock Ledger

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    database::Db,
    domain::products::{
        errors::ProductsServiceError, records::ProductUuid, repository::PgProductsRepository,
    },
};

/// Guarded per-product stock counter.
///
/// Products with `track_stock` unset always accept reductions and ignore increases.
#[automock]
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Atomically take `quantity` units; `false` when a tracked product lacks them.
    ///
    /// Unknown or deleted products are `NotFound`, never a shortage.
    async fn reduce(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, ProductsServiceError>;

    /// Return `quantity` units to a tracked product.
    async fn increase(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), ProductsServiceError>;
}

#[derive(Debug, Clone)]
pub struct PgStockLedger {
    db: Db,
    repository: PgProductsRepository,
}

impl PgStockLedger {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl StockLedger for PgStockLedger {
    async fn reduce(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let reduced = self
            .repository
            .reduce_stock(&mut tx, product, quantity)
            .await?;

        if !reduced {
            self.repository.get_product(&mut tx, product).await?;

            debug!(%product, quantity, "stock reduction refused");
        }

        tx.commit().await?;

        Ok(reduced)
    }

    async fn increase(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self
            .repository
            .increase_stock(&mut tx, product, quantity)
            .await?;

        if rows_affected == 0 {
            // Untracked products are a no-op, unknown ones are not.
            self.repository.get_product(&mut tx, product).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        domain::products::ProductsService,
        test::{TestContext, helpers::new_product},
    };

    use super::*;

    #[tokio::test]
    async fn reduce_decrements_tracked_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(3.00), 5)).await?;

        assert!(ctx.stock.reduce(product.uuid, 3).await?);

        let product = ctx.products.get_product(product.uuid).await?;

        assert_eq!(product.stock_quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn reduce_refuses_when_stock_is_short() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(3.00), 2)).await?;

        assert!(!ctx.stock.reduce(product.uuid, 3).await?);

        let product = ctx.products.get_product(product.uuid).await?;

        assert_eq!(product.stock_quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn reduce_of_exact_stock_empties_it() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(3.00), 2)).await?;

        assert!(ctx.stock.reduce(product.uuid, 2).await?);
        assert!(!ctx.stock.reduce(product.uuid, 1).await?);

        let product = ctx.products.get_product(product.uuid).await?;

        assert_eq!(product.stock_quantity, 0);

        Ok(())
    }

    #[tokio::test]
    async fn untracked_product_is_never_decremented() -> TestResult {
        let ctx = TestContext::new().await;
        let mut new = new_product(dec!(3.00), 1);
        new.track_stock = false;
        let product = ctx.products.create_product(new).await?;

        assert!(ctx.stock.reduce(product.uuid, 50).await?);
        ctx.stock.increase(product.uuid, 10).await?;

        let product = ctx.products.get_product(product.uuid).await?;

        assert_eq!(product.stock_quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn increase_adds_back_units() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(3.00), 1)).await?;

        ctx.stock.increase(product.uuid, 4).await?;

        let product = ctx.products.get_product(product.uuid).await?;

        assert_eq!(product.stock_quantity, 5);

        Ok(())
    }

    #[tokio::test]
    async fn reduce_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.stock.reduce(ProductUuid::new(), 1).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn reduce_deleted_product_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(3.00), 5)).await?;

        ctx.products.delete_product(product.uuid).await?;

        let result = ctx.stock.reduce(product.uuid, 1).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn increase_past_column_limit_is_out_of_range() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx
            .products
            .create_product(new_product(dec!(3.00), i32::MAX.unsigned_abs()))
            .await?;

        let result = ctx.stock.increase(product.uuid, 1).await;

        assert!(
            matches!(result, Err(ProductsServiceError::StockOutOfRange)),
            "expected StockOutOfRange, got {result:?}"
        );

        let product = ctx.products.get_product(product.uuid).await?;

        assert_eq!(product.stock_quantity, i32::MAX.unsigned_abs());

        Ok(())
    }

    #[tokio::test]
    async fn increase_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.stock.increase(ProductUuid::new(), 1).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
